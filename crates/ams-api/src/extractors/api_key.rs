//! `ApiKeyAuth` extractor for administrative routes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use ams_auth::AuthError;
use ams_entity::api_key::ApiKey;

use crate::error::ApiError;
use crate::state::AppState;

/// The API key presented in the configured header.
#[derive(Debug, Clone)]
pub struct ApiKeyAuth(pub ApiKey);

impl FromRequestParts<AppState> for ApiKeyAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(state.auth.api_key_header.as_str())
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::InvalidApiKey)?;

        let key = state.api_keys.authenticate(presented).await?;
        Ok(Self(key))
    }
}
