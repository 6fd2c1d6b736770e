//! Auth handlers: login, refresh, logout, me, sessions, password change.

use axum::Json;
use axum::extract::State;

use ams_auth::TokenPair;

use crate::dto::request::{ChangePasswordRequest, LoginRequest, RefreshRequest};
use crate::dto::response::{LoginResponse, MeResponse, RevokedResponse, SessionResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let result = state
        .session_manager
        .login(&req.email, &req.password)
        .await?;

    Ok(Json(result.into()))
}

/// POST /api/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let tokens = state.session_manager.refresh(&req.refresh_token).await?;
    Ok(Json(tokens))
}

/// POST /api/auth/logout
///
/// Revokes every refresh token of the caller.
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<RevokedResponse>, ApiError> {
    let revoked = state.session_manager.logout(auth.user_id()).await?;
    Ok(Json(RevokedResponse { revoked }))
}

/// GET /api/auth/me
pub async fn me(auth: AuthUser) -> Json<MeResponse> {
    Json(auth.0.into())
}

/// GET /api/auth/sessions
pub async fn sessions(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<SessionResponse>>, ApiError> {
    let records = state
        .session_manager
        .list_active_sessions(auth.user_id())
        .await?;

    Ok(Json(records.into_iter().map(SessionResponse::from).collect()))
}

/// PUT /api/auth/password
///
/// Ends every session of the caller, including the one making the request.
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<ChangePasswordRequest>,
) -> Result<Json<RevokedResponse>, ApiError> {
    let revoked = state
        .session_manager
        .change_password(auth.user_id(), &req.current_password, &req.new_password)
        .await?;

    Ok(Json(RevokedResponse { revoked }))
}
