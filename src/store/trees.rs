pub const PUZZLES: &str = "puzzles";
pub const ATTEMPTS: &str = "attempts";
pub const USERS: &str = "users";
pub const CONFIG_VERSIONS: &str = "config_versions";

// Secondary index trees
pub const ATTEMPT_IDS: &str = "attempt_ids";
pub const SOLVED: &str = "solved";
