pub mod attempts;
pub mod puzzles;
pub mod users;
