use chrono::{DateTime, Utc};

use rws_backend::puzzles::period::week_period;
use rws_backend::puzzles::types::{Difficulty, Puzzle, PuzzleAttempt, WeekPeriod};
use rws_backend::store::operations::users::User;
use rws_backend::store::Store;

pub fn seed_user(store: &Store, username: &str) -> User {
    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        username: username.to_string(),
        created_at: Utc::now(),
    };
    store.create_user(&user).expect("create seed user");
    user
}

pub fn seed_puzzle_in(
    store: &Store,
    answer: &str,
    difficulty: Difficulty,
    period: WeekPeriod,
) -> Puzzle {
    let puzzle = Puzzle {
        id: uuid::Uuid::new_v4().to_string(),
        question: format!("Seeded question answered by {answer}?"),
        answer: answer.to_string(),
        difficulty,
        is_active: true,
        week_number: period.week_number,
        year: period.year,
        auto_generated: false,
        created_at: Utc::now(),
    };
    store.insert_puzzle(&puzzle).expect("insert seed puzzle");
    puzzle
}

pub fn seed_puzzle(store: &Store, answer: &str, difficulty: Difficulty) -> Puzzle {
    seed_puzzle_in(store, answer, difficulty, week_period(Utc::now()))
}

/// Write an attempt straight to the store, bypassing judgment.
pub fn seed_attempt(
    store: &Store,
    user: &User,
    puzzle: &Puzzle,
    is_correct: Option<bool>,
    submitted_at: DateTime<Utc>,
) -> PuzzleAttempt {
    let attempt = PuzzleAttempt {
        id: uuid::Uuid::new_v4().to_string(),
        puzzle_id: puzzle.id.clone(),
        user_id: user.id.clone(),
        user_answer: "seeded".to_string(),
        is_correct,
        submitted_at,
        score: if is_correct == Some(true) {
            puzzle.difficulty.points()
        } else {
            0
        },
        reviewed_at: None,
        reviewed_by: None,
    };
    store.create_attempt(&attempt).expect("create seed attempt");
    attempt
}
