use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::Deserialize;

use crate::auth::Participant;
use crate::extractors::JsonBody;
use crate::response::{created, ok, AppError};
use crate::services::puzzle_set;
use crate::state::AppState;
use crate::store::operations::users::User;
use crate::store::StoreError;
use crate::validation::validate_username;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_user))
        .route("/:id", get(get_user))
        .route("/by-name/:username", get(get_user_by_name))
}

/// Routes acting on the caller identified by `x-user-id`.
pub fn me_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_me))
        .route("/attempts", get(my_attempts))
        .route("/score", get(my_score))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserRequest {
    username: String,
}

async fn create_user(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let username = req.username.trim();
    if let Err(msg) = validate_username(username) {
        return Err(AppError::bad_request("USER_INVALID_USERNAME", msg));
    }

    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        username: username.to_string(),
        created_at: Utc::now(),
    };
    match state.store().create_user(&user) {
        Ok(()) => {}
        Err(StoreError::Conflict { .. }) => {
            return Err(AppError::conflict(
                "USERNAME_TAKEN",
                "Username is already taken",
            ))
        }
        Err(e) => return Err(e.into()),
    }

    tracing::info!(user_id = %user.id, "User created");
    Ok(created(user))
}

async fn get_user(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .store()
        .get_user_by_id(&id)?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(ok(user))
}

async fn get_user_by_name(
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .store()
        .get_user_by_username(&username)?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(ok(user))
}

async fn get_me(participant: Participant) -> impl IntoResponse {
    ok(serde_json::json!({
        "id": participant.user_id,
        "username": participant.username,
    }))
}

async fn my_attempts(
    participant: Participant,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = state.store().list_user_attempts(&participant.user_id)?;
    Ok(ok(attempts))
}

async fn my_score(
    participant: Participant,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let summary = puzzle_set::user_summary(state.store(), &participant.user_id, Utc::now())?;
    Ok(ok(summary))
}
