//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use ams_auth::{ApiKeyChecker, SessionManager, TokenCodec};
use ams_core::config::{AuthConfig, ServerConfig};
use ams_database::DatabasePool;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are cheap to clone across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// HTTP server settings.
    pub server: Arc<ServerConfig>,
    /// Authentication settings.
    pub auth: Arc<AuthConfig>,
    /// Access token codec.
    pub token_codec: Arc<TokenCodec>,
    /// Credential session manager.
    pub session_manager: Arc<SessionManager>,
    /// API key checker.
    pub api_keys: Arc<ApiKeyChecker>,
    /// Database pool, absent when running on in-memory stores.
    pub database: Option<DatabasePool>,
}
