//! Administrative handlers authenticated by API key.

use axum::Json;
use axum::extract::{Path, State};
use tracing::info;
use uuid::Uuid;

use crate::dto::request::RevokeTokensRequest;
use crate::dto::response::RevokedResponse;
use crate::error::ApiError;
use crate::extractors::{ApiKeyAuth, ValidatedJson};
use crate::state::AppState;

/// POST /api/admin/users/{id}/revoke-tokens
pub async fn revoke_user_tokens(
    State(state): State<AppState>,
    ApiKeyAuth(key): ApiKeyAuth,
    Path(user_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<RevokeTokensRequest>,
) -> Result<Json<RevokedResponse>, ApiError> {
    info!(api_key_id = %key.id, user_id = %user_id, "Administrative token revocation");

    let revoked = state
        .session_manager
        .revoke_all_for_user(user_id, &req.reason)
        .await?;

    Ok(Json(RevokedResponse { revoked }))
}
