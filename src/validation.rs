//! Input checks shared by the participant and admin routes.

pub const MAX_ANSWER_CHARS: usize = 200;
pub const MAX_QUESTION_CHARS: usize = 1000;

/// Display names: 2-50 characters of letters, digits, underscore, hyphen or space.
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    let trimmed = username.trim();
    let char_count = trimmed.chars().count();
    if !(2..=50).contains(&char_count) {
        return Err("Username must be between 2 and 50 characters");
    }
    if !trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == ' ')
    {
        return Err("Username may only contain letters, digits, underscores, hyphens and spaces");
    }
    Ok(())
}

pub fn validate_answer(answer: &str) -> Result<(), &'static str> {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        return Err("Answer must not be empty");
    }
    if trimmed.chars().count() > MAX_ANSWER_CHARS {
        return Err("Answer is too long");
    }
    Ok(())
}

pub fn validate_question(question: &str) -> Result<(), &'static str> {
    let trimmed = question.trim();
    if trimmed.is_empty() {
        return Err("Question must not be empty");
    }
    if trimmed.chars().count() > MAX_QUESTION_CHARS {
        return Err("Question is too long");
    }
    Ok(())
}

/// Week numbers run 1..=53 under the ceiling-of-days rule.
pub fn validate_week_number(week_number: u32) -> Result<(), &'static str> {
    if !(1..=53).contains(&week_number) {
        return Err("Week number must be between 1 and 53");
    }
    Ok(())
}
