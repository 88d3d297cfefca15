use axum::{
    extract::{ FromRequestParts, State },
    http::{ header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode },
    Json,
};
use serde::Serialize;

use crate::db::entity::user;
use crate::error::{ AppError, Result };
use crate::services::auth_service::{ AuthSession, Credentials };

use super::AppState;

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// The signed-in user behind the request's bearer token.
pub struct AuthUser {
    pub user: user::Model,
    pub token: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState
    ) -> std::result::Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?
            .to_string();

        let user = state.auth_service
            .get_current_user(&token).await?
            .ok_or_else(|| AppError::Unauthorized("Session expired or invalid".to_string()))?;

        Ok(Self { user, token })
    }
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>
) -> Result<(StatusCode, Json<AuthSession>)> {
    let session = state.auth_service.sign_up(credentials).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>
) -> Result<Json<AuthSession>> {
    let session = state.auth_service.sign_in(credentials).await?;
    Ok(Json(session))
}

pub async fn sign_out(State(state): State<AppState>, auth: AuthUser) -> Result<StatusCode> {
    state.auth_service.sign_out(&auth.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn current_user(auth: AuthUser) -> Json<user::Model> {
    Json(auth.user)
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub session: Option<SessionInfo>,
}

#[derive(Serialize)]
pub struct SessionInfo {
    pub user_id: uuid::Uuid,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

/// Unlike the other auth routes this never rejects; a missing or stale
/// token yields `{"session": null}`.
pub async fn session(
    State(state): State<AppState>,
    headers: HeaderMap
) -> Result<Json<SessionResponse>> {
    let session = match bearer_token(&headers) {
        Some(token) => state.auth_service.get_session(token).await?,
        None => None,
    };

    Ok(
        Json(SessionResponse {
            session: session.map(|s| SessionInfo {
                user_id: s.user_id,
                expires_at: s.expires_at,
            }),
        })
    )
}
