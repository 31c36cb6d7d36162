use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    SuperHard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
        Difficulty::SuperHard,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::SuperHard => "super_hard",
        }
    }

    /// Points awarded for a confirmed correct answer. The only points table in
    /// the crate: submission and review both go through here.
    pub fn points(self) -> u32 {
        match self {
            Self::Easy => 5,
            Self::Medium => 10,
            Self::Hard => 15,
            Self::SuperHard => 20,
        }
    }

    /// Share of a generated batch targeted at this difficulty, in percent.
    pub fn target_percent(self) -> usize {
        match self {
            Self::Easy => 30,
            Self::Medium => 40,
            Self::Hard => 20,
            Self::SuperHard => 10,
        }
    }
}

/// Static riddle/problem definition compiled into the catalog.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleTemplate {
    pub question: &'static str,
    pub answer: &'static str,
    pub difficulty: Difficulty,
    pub category: &'static str,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub difficulty: Difficulty,
    pub is_active: bool,
    pub week_number: u32,
    pub year: i32,
    pub auto_generated: bool,
    pub created_at: DateTime<Utc>,
}

impl Puzzle {
    pub fn period(&self) -> WeekPeriod {
        WeekPeriod {
            week_number: self.week_number,
            year: self.year,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleAttempt {
    pub id: String,
    pub puzzle_id: String,
    pub user_id: String,
    pub user_answer: String,
    /// `None` while the attempt waits for an administrator's judgment.
    pub is_correct: Option<bool>,
    pub submitted_at: DateTime<Utc>,
    pub score: u32,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reviewed_by: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    SubmittedCorrect,
    SubmittedPending,
    ReviewedCorrect,
    ReviewedIncorrect,
}

impl PuzzleAttempt {
    pub fn status(&self) -> AttemptStatus {
        match (self.is_correct, self.reviewed_at.is_some()) {
            (None, _) => AttemptStatus::SubmittedPending,
            (Some(true), false) => AttemptStatus::SubmittedCorrect,
            (Some(true), true) => AttemptStatus::ReviewedCorrect,
            (Some(false), _) => AttemptStatus::ReviewedIncorrect,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.is_correct.is_none()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct WeekPeriod {
    pub week_number: u32,
    pub year: i32,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleScore {
    pub user_id: String,
    pub user_name: String,
    pub total_score: u32,
    pub weekly_score: u32,
    pub correct_answers: u32,
    pub total_attempts: u32,
    pub last_activity: Option<DateTime<Utc>>,
    /// 1-based; `None` for a user that does not appear on the leaderboard.
    pub rank: Option<u32>,
}
