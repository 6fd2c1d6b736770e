//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ams_auth::session::LoginResult;
use ams_auth::{Claims, TokenPair};
use ams_entity::refresh_token::RefreshToken;

/// Login response: the token pair plus who logged in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Issued tokens.
    #[serde(flatten)]
    pub tokens: TokenPair,
    /// User email.
    pub email: String,
    /// User role names.
    pub roles: Vec<String>,
}

impl From<LoginResult> for LoginResponse {
    fn from(result: LoginResult) -> Self {
        Self {
            email: result.account.email().to_string(),
            roles: result.account.roles,
            tokens: result.tokens,
        }
    }
}

/// Number of tokens revoked.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokedResponse {
    /// Count revoked by this request.
    pub revoked: u64,
}

/// The caller as described by their access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    /// User ID.
    pub id: Uuid,
    /// Email.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role names.
    pub roles: Vec<String>,
    /// Access token expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<Claims> for MeResponse {
    fn from(claims: Claims) -> Self {
        Self {
            expires_at: claims.expires_at(),
            id: claims.sub,
            email: claims.email,
            name: claims.name,
            roles: claims.roles,
        }
    }
}

/// One active refresh session. The token value is never exposed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Record ID.
    pub id: Uuid,
    /// When the session was opened or last rotated.
    pub issued_at: DateTime<Utc>,
    /// When the refresh token expires.
    pub expires_at: DateTime<Utc>,
}

impl From<RefreshToken> for SessionResponse {
    fn from(record: RefreshToken) -> Self {
        Self {
            id: record.id,
            issued_at: record.issued_at,
            expires_at: record.expires_at,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Database status, when a database is attached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}
