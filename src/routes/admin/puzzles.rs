use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::Deserialize;

use crate::auth::AdminAuth;
use crate::extractors::JsonBody;
use crate::puzzles::period::week_period;
use crate::response::{created, ok, AppError};
use crate::services::puzzle_set::{self, GenerationOutcome, PuzzleDraft, PuzzlePatch};
use crate::state::AppState;

/// Upper bound on a manually requested batch.
const MAX_GENERATE_COUNT: usize = 20;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_puzzles).post(create_puzzle))
        .route("/generate", post(generate))
        .route(
            "/:id",
            get(get_puzzle).put(update_puzzle).delete(delete_puzzle),
        )
        .route("/:id/toggle-active", post(toggle_active))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListPuzzlesQuery {
    active: Option<bool>,
}

async fn list_puzzles(
    _admin: AdminAuth,
    Query(q): Query<ListPuzzlesQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let mut puzzles = state.store().list_puzzles()?;
    if let Some(active) = q.active {
        puzzles.retain(|p| p.is_active == active);
    }
    Ok(ok(puzzles))
}

async fn create_puzzle(
    admin: AdminAuth,
    State(state): State<AppState>,
    JsonBody(draft): JsonBody<PuzzleDraft>,
) -> Result<impl IntoResponse, AppError> {
    let puzzle = puzzle_set::create_puzzle(state.store(), draft, Utc::now())?;
    tracing::info!(admin = %admin.reviewer, puzzle_id = %puzzle.id, action = "create_puzzle", "Admin action");
    Ok(created(puzzle))
}

async fn get_puzzle(
    _admin: AdminAuth,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let puzzle = state
        .store()
        .get_puzzle(&id)?
        .ok_or_else(|| AppError::not_found("Puzzle not found"))?;
    Ok(ok(puzzle))
}

async fn update_puzzle(
    admin: AdminAuth,
    Path(id): Path<String>,
    State(state): State<AppState>,
    JsonBody(patch): JsonBody<PuzzlePatch>,
) -> Result<impl IntoResponse, AppError> {
    let puzzle = puzzle_set::update_puzzle(state.store(), &id, patch)?;
    tracing::info!(admin = %admin.reviewer, puzzle_id = %id, action = "update_puzzle", "Admin action");
    Ok(ok(puzzle))
}

async fn toggle_active(
    admin: AdminAuth,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let puzzle = puzzle_set::toggle_puzzle_active(state.store(), &id)?;
    tracing::info!(
        admin = %admin.reviewer,
        puzzle_id = %id,
        is_active = puzzle.is_active,
        action = "toggle_active",
        "Admin action"
    );
    Ok(ok(puzzle))
}

async fn delete_puzzle(
    admin: AdminAuth,
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let removed_attempts = puzzle_set::delete_puzzle(state.store(), &id)?;
    tracing::info!(admin = %admin.reviewer, puzzle_id = %id, action = "delete_puzzle", "Admin action");
    Ok(ok(serde_json::json!({
        "deleted": true,
        "puzzleId": id,
        "removedAttempts": removed_attempts,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateQuery {
    count: Option<usize>,
    /// Generate even when this week already has an automatic batch.
    #[serde(default)]
    force: bool,
}

async fn generate(
    admin: AdminAuth,
    Query(q): Query<GenerateQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let count = q
        .count
        .unwrap_or(state.config().puzzles.batch_size)
        .clamp(1, MAX_GENERATE_COUNT);
    let lock = state.generation_lock();
    let _guard = lock.lock().await;
    let now = Utc::now();

    let outcome = if q.force {
        let period = week_period(now);
        let created = puzzle_set::generate_batch(state.store(), count, period, now)?;
        GenerationOutcome {
            period,
            created,
            retired: 0,
            skipped: false,
        }
    } else {
        puzzle_set::ensure_weekly_puzzles(
            state.store(),
            count,
            state.config().worker.retire_previous_week,
            now,
        )?
    };

    tracing::info!(
        admin = %admin.reviewer,
        created = outcome.created.len(),
        skipped = outcome.skipped,
        force = q.force,
        action = "generate_puzzles",
        "Admin action"
    );
    Ok(ok(outcome))
}
