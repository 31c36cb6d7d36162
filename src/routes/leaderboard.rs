use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;

use crate::response::{ok, AppError};
use crate::services::puzzle_set;
use crate::state::AppState;

/// Hard ceiling on `?limit=`.
const MAX_LIMIT: usize = 500;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_leaderboard))
        .route("/users/:id", get(get_user_totals))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeaderboardQuery {
    limit: Option<usize>,
}

async fn get_leaderboard(
    Query(q): Query<LeaderboardQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let limit = q
        .limit
        .unwrap_or(state.config().puzzles.leaderboard_limit)
        .clamp(1, MAX_LIMIT);
    let scores = puzzle_set::leaderboard(state.store(), Utc::now(), Some(limit))?;
    Ok(ok(scores))
}

async fn get_user_totals(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let summary = puzzle_set::user_summary(state.store(), &id, Utc::now())?;
    Ok(ok(summary))
}
