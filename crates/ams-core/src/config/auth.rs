//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Authentication and credential configuration.
///
/// The signing key has no default: a missing key is reported when the
/// token codec is constructed at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for JWT signing (HMAC-SHA256).
    #[serde(default, skip_serializing)]
    pub jwt_secret: Option<String>,
    /// Value of the `iss` claim.
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,
    /// Value of the `aud` claim.
    #[serde(default = "default_audience")]
    pub jwt_audience: String,
    /// Access token TTL in hours.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_hours: u64,
    /// Refresh token TTL in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_days: u64,
    /// Header carrying an API key.
    #[serde(default = "default_api_key_header")]
    pub api_key_header: String,
    /// Minimum length of a new password.
    #[serde(default = "default_password_min_length")]
    pub password_min_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_issuer: default_issuer(),
            jwt_audience: default_audience(),
            access_token_ttl_hours: default_access_ttl(),
            refresh_token_ttl_days: default_refresh_ttl(),
            api_key_header: default_api_key_header(),
            password_min_length: default_password_min_length(),
        }
    }
}

fn default_issuer() -> String {
    "ams-api".to_string()
}

fn default_audience() -> String {
    "ams-clients".to_string()
}

fn default_access_ttl() -> u64 {
    6
}

fn default_refresh_ttl() -> u64 {
    14
}

fn default_api_key_header() -> String {
    "X-Api-Key".to_string()
}

fn default_password_min_length() -> usize {
    8
}
