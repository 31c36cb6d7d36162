pub mod puzzles;
pub mod review;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;

use crate::auth::AdminAuth;
use crate::response::{ok, paginated, AppError};
use crate::services::puzzle_set;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u64 = 20;
const MAX_PAGE_SIZE: u64 = 100;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/puzzles", puzzles::router())
        .nest("/attempts", review::router())
        .route("/catalog", get(catalog))
        .route("/stats", get(admin_stats))
        .route("/users", get(list_users))
}

async fn catalog(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(puzzle_set::catalog_availability(state.store())?))
}

async fn admin_stats(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    Ok(ok(puzzle_set::stats(state.store(), Utc::now())?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListUsersQuery {
    page: Option<u64>,
    per_page: Option<u64>,
}

async fn list_users(
    _admin: AdminAuth,
    Query(q): Query<ListUsersQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let page = q.page.unwrap_or(1).max(1);
    let per_page = q.per_page.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = ((page - 1) * per_page) as usize;
    let users = state.store().list_users(per_page as usize, offset)?;
    let total = state.store().count_users()? as u64;
    Ok(paginated(users, total, page, per_page))
}
