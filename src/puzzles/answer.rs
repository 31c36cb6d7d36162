/// Canonical comparison form: surrounding whitespace removed, lowercased.
pub fn normalize_answer(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Automatic judgment of a submitted answer. Anything other than an exact
/// normalized match is left for an administrator to review.
pub fn matches_expected(expected: &str, submitted: &str) -> bool {
    normalize_answer(expected) == normalize_answer(submitted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_and_padding_are_ignored() {
        assert!(matches_expected("piano", "  PiAnO "));
        assert!(matches_expected("All of them", "all of them"));
    }

    #[test]
    fn inner_spacing_is_significant() {
        assert!(!matches_expected("all of them", "all  of them"));
        assert!(!matches_expected("o(log n)", "o(logn)"));
    }

    #[test]
    fn different_words_do_not_match() {
        assert!(!matches_expected("clock", "watch"));
    }
}
