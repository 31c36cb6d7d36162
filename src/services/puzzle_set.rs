//! Orchestration of the puzzle domain over the store: weekly generation,
//! answer submission, admin review, puzzle authoring and leaderboards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::puzzles::answer::{matches_expected, normalize_answer};
use crate::puzzles::catalog::{available_templates, TEMPLATES};
use crate::puzzles::period::week_period;
use crate::puzzles::sampler;
use crate::puzzles::scoring::{compute_leaderboard, user_totals};
use crate::puzzles::types::{
    AttemptStatus, Difficulty, Puzzle, PuzzleAttempt, PuzzleScore, WeekPeriod,
};
use crate::store::{Store, StoreError};
use crate::validation::{validate_answer, validate_question, validate_week_number};

#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error(transparent)]
    Store(StoreError),
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("puzzle not found: {0}")]
    PuzzleNotFound(String),
    #[error("puzzle is not active: {0}")]
    PuzzleInactive(String),
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error("attempt not found: {0}")]
    AttemptNotFound(String),
    #[error("user {user_id} already solved puzzle {puzzle_id}")]
    AlreadySolved { user_id: String, puzzle_id: String },
    #[error("attempt already reviewed: {0}")]
    AlreadyReviewed(String),
}

impl From<StoreError> for PuzzleError {
    fn from(value: StoreError) -> Self {
        PuzzleError::Store(value)
    }
}

fn invalid(message: &str) -> PuzzleError {
    PuzzleError::Validation(message.to_string())
}

/// Translate the checks the store repeats inside its attempt transactions.
/// They catch what changed between our reads and the commit: a concurrent
/// solve, a concurrent verdict or a puzzle deleted mid-request.
fn attempt_write_error(error: StoreError, attempt: &PuzzleAttempt) -> PuzzleError {
    match error {
        StoreError::Conflict { ref entity, .. } if entity == "solved" => PuzzleError::AlreadySolved {
            user_id: attempt.user_id.clone(),
            puzzle_id: attempt.puzzle_id.clone(),
        },
        StoreError::AlreadyReviewed(id) => PuzzleError::AlreadyReviewed(id),
        StoreError::NotFound { ref entity, .. } if entity == "puzzle" => {
            PuzzleError::PuzzleNotFound(attempt.puzzle_id.clone())
        }
        StoreError::NotFound { .. } => PuzzleError::AttemptNotFound(attempt.id.clone()),
        other => PuzzleError::Store(other),
    }
}

// ── Generation ──

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    pub period: WeekPeriod,
    pub created: Vec<Puzzle>,
    pub retired: usize,
    /// The period already had an auto-generated batch.
    pub skipped: bool,
}

/// Draw a fresh batch for `period` from the unused catalog templates and
/// persist it. An exhausted catalog yields an empty batch and writes nothing.
pub fn generate_batch(
    store: &Store,
    count: usize,
    period: WeekPeriod,
    now: DateTime<Utc>,
) -> Result<Vec<Puzzle>, PuzzleError> {
    let existing = store.list_puzzles()?;
    let batch = sampler::auto_generate_puzzles(&existing, count, period, now);

    if batch.is_empty() {
        tracing::warn!(
            week_number = period.week_number,
            year = period.year,
            existing = existing.len(),
            "Template catalog exhausted, no puzzles generated"
        );
        return Ok(batch);
    }

    store.insert_puzzles(&batch)?;
    tracing::info!(
        week_number = period.week_number,
        year = period.year,
        created = batch.len(),
        "Generated weekly puzzle batch"
    );
    Ok(batch)
}

/// Generate the batch for the week containing `now` unless one exists.
/// With `retire_previous`, auto-generated puzzles of earlier weeks are
/// deactivated once a new batch has gone live.
pub fn ensure_weekly_puzzles(
    store: &Store,
    count: usize,
    retire_previous: bool,
    now: DateTime<Utc>,
) -> Result<GenerationOutcome, PuzzleError> {
    let period = week_period(now);
    let existing = store.list_puzzles()?;

    if existing
        .iter()
        .any(|p| p.auto_generated && p.period() == period)
    {
        tracing::debug!(
            week_number = period.week_number,
            year = period.year,
            "Weekly puzzles already generated"
        );
        return Ok(GenerationOutcome {
            period,
            created: Vec::new(),
            retired: 0,
            skipped: true,
        });
    }

    let created = generate_batch(store, count, period, now)?;

    let mut retired = 0;
    if retire_previous && !created.is_empty() {
        for mut puzzle in existing
            .into_iter()
            .filter(|p| p.auto_generated && p.is_active && p.period() != period)
        {
            puzzle.is_active = false;
            store.update_puzzle(&puzzle)?;
            retired += 1;
        }
        if retired > 0 {
            tracing::info!(retired, "Retired previous weekly puzzles");
        }
    }

    Ok(GenerationOutcome {
        period,
        created,
        retired,
        skipped: false,
    })
}

// ── Submission & review ──

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionOutcome {
    pub attempt: PuzzleAttempt,
    pub status: AttemptStatus,
    pub points_awarded: u32,
}

/// Judge `raw_answer` against the puzzle. A match is recorded as correct
/// with the difficulty's points; anything else waits for admin review.
pub fn submit_attempt(
    store: &Store,
    user_id: &str,
    puzzle_id: &str,
    raw_answer: &str,
    now: DateTime<Utc>,
) -> Result<SubmissionOutcome, PuzzleError> {
    validate_answer(raw_answer).map_err(invalid)?;

    let puzzle = store
        .get_puzzle(puzzle_id)?
        .ok_or_else(|| PuzzleError::PuzzleNotFound(puzzle_id.to_string()))?;
    if !puzzle.is_active {
        return Err(PuzzleError::PuzzleInactive(puzzle_id.to_string()));
    }
    if store.has_solved(user_id, puzzle_id)? {
        return Err(PuzzleError::AlreadySolved {
            user_id: user_id.to_string(),
            puzzle_id: puzzle_id.to_string(),
        });
    }

    let correct = matches_expected(&puzzle.answer, raw_answer);
    let score = if correct { puzzle.difficulty.points() } else { 0 };
    let attempt = PuzzleAttempt {
        id: uuid::Uuid::new_v4().to_string(),
        puzzle_id: puzzle.id.clone(),
        user_id: user_id.to_string(),
        user_answer: raw_answer.to_string(),
        is_correct: correct.then_some(true),
        submitted_at: now,
        score,
        reviewed_at: None,
        reviewed_by: None,
    };

    store
        .create_attempt(&attempt)
        .map_err(|e| attempt_write_error(e, &attempt))?;

    tracing::info!(
        attempt_id = %attempt.id,
        user_id,
        puzzle_id,
        correct,
        score,
        "Attempt submitted"
    );

    Ok(SubmissionOutcome {
        status: attempt.status(),
        points_awarded: score,
        attempt,
    })
}

/// Settle a pending attempt. Approval awards the difficulty's points.
pub fn review_attempt(
    store: &Store,
    attempt_id: &str,
    approve: bool,
    reviewer: &str,
    now: DateTime<Utc>,
) -> Result<PuzzleAttempt, PuzzleError> {
    let mut attempt = store
        .get_attempt(attempt_id)?
        .ok_or_else(|| PuzzleError::AttemptNotFound(attempt_id.to_string()))?;
    if !attempt.is_pending() {
        return Err(PuzzleError::AlreadyReviewed(attempt_id.to_string()));
    }

    let score = if approve {
        let puzzle = store
            .get_puzzle(&attempt.puzzle_id)?
            .ok_or_else(|| PuzzleError::PuzzleNotFound(attempt.puzzle_id.clone()))?;
        puzzle.difficulty.points()
    } else {
        0
    };

    attempt.is_correct = Some(approve);
    attempt.score = score;
    attempt.reviewed_at = Some(now);
    attempt.reviewed_by = Some(reviewer.to_string());

    store
        .save_reviewed_attempt(&attempt)
        .map_err(|e| attempt_write_error(e, &attempt))?;

    tracing::info!(
        attempt_id,
        reviewer,
        approve,
        score,
        "Attempt reviewed"
    );
    Ok(attempt)
}

// ── Leaderboard ──

pub fn leaderboard(
    store: &Store,
    now: DateTime<Utc>,
    limit: Option<usize>,
) -> Result<Vec<PuzzleScore>, PuzzleError> {
    let attempts = store.list_attempts()?;
    let puzzles = store.list_puzzles()?;
    let mut scores = compute_leaderboard(&attempts, &puzzles, store, week_period(now));
    if let Some(limit) = limit {
        scores.truncate(limit);
    }
    Ok(scores)
}

pub fn user_summary(
    store: &Store,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<PuzzleScore, PuzzleError> {
    if store.get_user_by_id(user_id)?.is_none() {
        return Err(PuzzleError::UserNotFound(user_id.to_string()));
    }
    let scores = leaderboard(store, now, None)?;
    Ok(user_totals(&scores, store, user_id))
}

// ── Authoring ──

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleDraft {
    pub question: String,
    pub answer: String,
    pub difficulty: Difficulty,
    pub week_number: Option<u32>,
    pub year: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzlePatch {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub week_number: Option<u32>,
    pub year: Option<i32>,
    pub is_active: Option<bool>,
}

/// Admin-authored puzzle. Defaults to the current week and active.
pub fn create_puzzle(
    store: &Store,
    draft: PuzzleDraft,
    now: DateTime<Utc>,
) -> Result<Puzzle, PuzzleError> {
    validate_question(&draft.question).map_err(invalid)?;
    validate_answer(&draft.answer).map_err(invalid)?;
    let current = week_period(now);
    let week_number = draft.week_number.unwrap_or(current.week_number);
    validate_week_number(week_number).map_err(invalid)?;

    let puzzle = Puzzle {
        id: uuid::Uuid::new_v4().to_string(),
        question: draft.question.trim().to_string(),
        answer: normalize_answer(&draft.answer),
        difficulty: draft.difficulty,
        is_active: draft.is_active.unwrap_or(true),
        week_number,
        year: draft.year.unwrap_or(current.year),
        auto_generated: false,
        created_at: now,
    };
    store.insert_puzzle(&puzzle)?;
    tracing::info!(puzzle_id = %puzzle.id, difficulty = puzzle.difficulty.as_str(), "Puzzle created");
    Ok(puzzle)
}

pub fn update_puzzle(
    store: &Store,
    puzzle_id: &str,
    patch: PuzzlePatch,
) -> Result<Puzzle, PuzzleError> {
    let mut puzzle = store
        .get_puzzle(puzzle_id)?
        .ok_or_else(|| PuzzleError::PuzzleNotFound(puzzle_id.to_string()))?;

    if let Some(question) = patch.question {
        validate_question(&question).map_err(invalid)?;
        puzzle.question = question.trim().to_string();
    }
    if let Some(answer) = patch.answer {
        validate_answer(&answer).map_err(invalid)?;
        puzzle.answer = normalize_answer(&answer);
    }
    if let Some(difficulty) = patch.difficulty {
        puzzle.difficulty = difficulty;
    }
    if let Some(week_number) = patch.week_number {
        validate_week_number(week_number).map_err(invalid)?;
        puzzle.week_number = week_number;
    }
    if let Some(year) = patch.year {
        puzzle.year = year;
    }
    if let Some(is_active) = patch.is_active {
        puzzle.is_active = is_active;
    }

    store.update_puzzle(&puzzle)?;
    tracing::info!(puzzle_id, "Puzzle updated");
    Ok(puzzle)
}

pub fn toggle_puzzle_active(store: &Store, puzzle_id: &str) -> Result<Puzzle, PuzzleError> {
    let mut puzzle = store
        .get_puzzle(puzzle_id)?
        .ok_or_else(|| PuzzleError::PuzzleNotFound(puzzle_id.to_string()))?;
    puzzle.is_active = !puzzle.is_active;
    store.update_puzzle(&puzzle)?;
    tracing::info!(puzzle_id, is_active = puzzle.is_active, "Puzzle active flag toggled");
    Ok(puzzle)
}

/// Hard delete; the puzzle's attempts go with it.
pub fn delete_puzzle(store: &Store, puzzle_id: &str) -> Result<usize, PuzzleError> {
    match store.delete_puzzle_cascade(puzzle_id) {
        Ok(removed_attempts) => {
            tracing::info!(puzzle_id, removed_attempts, "Puzzle deleted");
            Ok(removed_attempts)
        }
        Err(StoreError::NotFound { .. }) => Err(PuzzleError::PuzzleNotFound(puzzle_id.to_string())),
        Err(e) => Err(e.into()),
    }
}

// ── Reporting ──

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyAvailability {
    pub difficulty: Difficulty,
    pub total: usize,
    pub remaining: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogAvailability {
    pub total: usize,
    pub remaining: usize,
    pub by_difficulty: Vec<DifficultyAvailability>,
}

pub fn catalog_availability(store: &Store) -> Result<CatalogAvailability, PuzzleError> {
    let existing = store.list_puzzles()?;
    let unused = available_templates(&existing);

    let by_difficulty = Difficulty::ALL
        .iter()
        .map(|&difficulty| DifficultyAvailability {
            difficulty,
            total: TEMPLATES.iter().filter(|t| t.difficulty == difficulty).count(),
            remaining: unused.iter().filter(|t| t.difficulty == difficulty).count(),
        })
        .collect();

    Ok(CatalogAvailability {
        total: TEMPLATES.len(),
        remaining: unused.len(),
        by_difficulty,
    })
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleStats {
    pub current_period: WeekPeriod,
    pub total_puzzles: usize,
    pub active_puzzles: usize,
    pub current_week_puzzles: usize,
    pub total_attempts: usize,
    pub correct_attempts: usize,
    pub pending_reviews: usize,
    pub total_users: usize,
}

pub fn stats(store: &Store, now: DateTime<Utc>) -> Result<PuzzleStats, PuzzleError> {
    let current_period = week_period(now);
    let puzzles = store.list_puzzles()?;
    let attempts = store.list_attempts()?;

    Ok(PuzzleStats {
        current_period,
        total_puzzles: puzzles.len(),
        active_puzzles: puzzles.iter().filter(|p| p.is_active).count(),
        current_week_puzzles: puzzles
            .iter()
            .filter(|p| p.period() == current_period)
            .count(),
        total_attempts: attempts.len(),
        correct_attempts: attempts
            .iter()
            .filter(|a| a.is_correct == Some(true))
            .count(),
        pending_reviews: attempts.iter().filter(|a| a.is_pending()).count(),
        total_users: store.count_users()?,
    })
}
