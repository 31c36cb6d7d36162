use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::AdminAuth;
use crate::extractors::JsonBody;
use crate::puzzles::scoring::{UserDirectory, UNKNOWN_USER_NAME};
use crate::puzzles::types::PuzzleAttempt;
use crate::response::{ok, AppError};
use crate::services::puzzle_set;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pending", get(list_pending))
        .route("/:id/review", post(review))
}

/// A pending attempt with what a reviewer needs next to it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PendingAttemptView {
    #[serde(flatten)]
    attempt: PuzzleAttempt,
    user_name: String,
    question: Option<String>,
    expected_answer: Option<String>,
}

async fn list_pending(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store();
    let mut views = Vec::new();
    for attempt in store.list_pending_attempts()? {
        let puzzle = store.get_puzzle(&attempt.puzzle_id)?;
        let user_name = store
            .display_name(&attempt.user_id)
            .unwrap_or_else(|| UNKNOWN_USER_NAME.to_string());
        views.push(PendingAttemptView {
            user_name,
            question: puzzle.as_ref().map(|p| p.question.clone()),
            expected_answer: puzzle.map(|p| p.answer),
            attempt,
        });
    }
    Ok(ok(views))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReviewRequest {
    is_correct: bool,
}

async fn review(
    admin: AdminAuth,
    Path(id): Path<String>,
    State(state): State<AppState>,
    JsonBody(req): JsonBody<ReviewRequest>,
) -> Result<impl IntoResponse, AppError> {
    let attempt = puzzle_set::review_attempt(
        state.store(),
        &id,
        req.is_correct,
        &admin.reviewer,
        Utc::now(),
    )?;
    Ok(ok(attempt))
}
