use std::collections::HashSet;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Participant;
use crate::extractors::JsonBody;
use crate::puzzles::types::{Difficulty, Puzzle};
use crate::response::{created, ok, AppError};
use crate::services::puzzle_set;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_active))
        .route("/:id", get(get_one))
        .route("/:id/attempts", post(submit))
}

/// Participant-facing puzzle. The answer never leaves the server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleView {
    pub id: String,
    pub question: String,
    pub difficulty: Difficulty,
    pub points: u32,
    pub week_number: u32,
    pub year: i32,
    pub auto_generated: bool,
    pub created_at: DateTime<Utc>,
    /// Present only when the caller identified themselves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solved: Option<bool>,
}

impl PuzzleView {
    fn new(puzzle: &Puzzle, solved: Option<bool>) -> Self {
        Self {
            id: puzzle.id.clone(),
            question: puzzle.question.clone(),
            difficulty: puzzle.difficulty,
            points: puzzle.difficulty.points(),
            week_number: puzzle.week_number,
            year: puzzle.year,
            auto_generated: puzzle.auto_generated,
            created_at: puzzle.created_at,
            solved,
        }
    }
}

fn solved_set(state: &AppState, participant: Option<&Participant>) -> Result<HashSet<String>, AppError> {
    let Some(participant) = participant else {
        return Ok(HashSet::new());
    };
    Ok(state
        .store()
        .list_user_attempts(&participant.user_id)?
        .into_iter()
        .filter(|a| a.is_correct == Some(true))
        .map(|a| a.puzzle_id)
        .collect())
}

async fn list_active(
    participant: Option<Participant>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let solved = solved_set(&state, participant.as_ref())?;
    let identified = participant.is_some();

    let views: Vec<PuzzleView> = state
        .store()
        .list_active_puzzles()?
        .iter()
        .map(|p| PuzzleView::new(p, identified.then(|| solved.contains(&p.id))))
        .collect();
    Ok(ok(views))
}

async fn get_one(
    participant: Option<Participant>,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let puzzle = state
        .store()
        .get_puzzle(&id)?
        .filter(|p| p.is_active)
        .ok_or_else(|| AppError::not_found("Puzzle not found"))?;

    let solved = match &participant {
        Some(p) => Some(state.store().has_solved(&p.user_id, &puzzle.id)?),
        None => None,
    };
    Ok(ok(PuzzleView::new(&puzzle, solved)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitRequest {
    answer: String,
}

async fn submit(
    participant: Participant,
    Path(id): Path<String>,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<SubmitRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome =
        puzzle_set::submit_attempt(state.store(), &participant.user_id, &id, &req.answer, Utc::now())?;
    Ok(created(outcome))
}
