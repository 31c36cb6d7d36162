pub fn puzzle_key(puzzle_id: &str) -> String {
    puzzle_id.to_string()
}

/// Attempts are keyed by submission time so a full scan yields them in
/// chronological order.
pub fn attempt_key(timestamp_ms: i64, attempt_id: &str) -> String {
    let ts = timestamp_ms.max(0) as u64;
    format!("{:020}:{}", ts, attempt_id)
}

pub fn attempt_id_index_key(attempt_id: &str) -> String {
    attempt_id.to_string()
}

/// Marker held by the one correct attempt of a user on a puzzle.
pub fn solved_key(user_id: &str, puzzle_id: &str) -> String {
    format!("{}:{}", user_id, puzzle_id)
}

pub fn user_key(user_id: &str) -> String {
    user_id.to_string()
}

pub fn username_index_key(username: &str) -> String {
    format!("name:{}", username.trim().to_lowercase())
}
