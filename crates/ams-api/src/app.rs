//! Application builder: wires router, middleware and state into an Axum app.

use std::sync::Arc;

use axum::Router;

use ams_auth::{ApiKeyChecker, ApiKeyLookup, RefreshTokenStore, SessionManager, UserDirectory};
use ams_auth::{AuthResult, PasswordScheme, TokenCodec};
use ams_core::config::{AuthConfig, ServerConfig};
use ams_core::traits::Clock;
use ams_database::DatabasePool;

use crate::router::build_router;
use crate::state::AppState;

/// Collaborators the HTTP layer is assembled from.
pub struct Collaborators {
    /// Refresh token persistence.
    pub store: Arc<dyn RefreshTokenStore>,
    /// Active users and their passwords.
    pub users: Arc<dyn UserDirectory>,
    /// Password digests.
    pub passwords: Arc<dyn PasswordScheme>,
    /// API key lookup.
    pub api_keys: Arc<dyn ApiKeyLookup>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
    /// Database pool, if any.
    pub database: Option<DatabasePool>,
}

/// Builds application state from configuration and collaborators.
///
/// Fails when the signing configuration is unusable.
pub fn build_state(
    server: &ServerConfig,
    auth: &AuthConfig,
    parts: Collaborators,
) -> AuthResult<AppState> {
    let token_codec = Arc::new(TokenCodec::new(auth, Arc::clone(&parts.clock))?);
    let session_manager = SessionManager::new(
        Arc::clone(&token_codec),
        parts.store,
        parts.users,
        parts.passwords,
        Arc::clone(&parts.clock),
        auth,
    )?;
    let api_keys = ApiKeyChecker::new(parts.api_keys, parts.clock);

    Ok(AppState {
        server: Arc::new(server.clone()),
        auth: Arc::new(auth.clone()),
        token_codec,
        session_manager: Arc::new(session_manager),
        api_keys: Arc::new(api_keys),
        database: parts.database,
    })
}

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}
