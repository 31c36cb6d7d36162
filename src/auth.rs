use axum::extract::{FromRef, FromRequestParts};
use axum::http::{request::Parts, HeaderMap};
use sha2::{Digest, Sha256};

use crate::response::AppError;
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const ADMIN_NAME_HEADER: &str = "x-admin-name";
const DEFAULT_REVIEWER: &str = "admin";

pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth_header| auth_header.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// A registered user acting on their own behalf, identified by `x-user-id`.
#[derive(Debug, Clone)]
pub struct Participant {
    pub user_id: String,
    pub username: String,
}

/// Holder of the configured admin token. `reviewer` names the person for
/// the review audit trail.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    pub reviewer: String,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Participant
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let user_id = header_str(&parts.headers, USER_ID_HEADER)
            .ok_or_else(|| AppError::unauthorized("Missing user identity"))?;

        let user = app_state
            .store()
            .get_user_by_id(user_id)?
            .ok_or_else(|| AppError::unauthorized("Unknown user"))?;

        Ok(Participant {
            user_id: user.id,
            username: user.username,
        })
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminAuth
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| AppError::unauthorized("Missing bearer token"))?;

        if hash_token(&token) != hash_token(&app_state.config().admin_token) {
            return Err(AppError::unauthorized("Invalid admin token"));
        }

        let reviewer = header_str(&parts.headers, ADMIN_NAME_HEADER)
            .unwrap_or(DEFAULT_REVIEWER)
            .chars()
            .take(50)
            .collect();

        Ok(AdminAuth { reviewer })
    }
}
