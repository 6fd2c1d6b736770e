//! API key repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use ams_core::error::{AppError, ErrorKind};
use ams_core::result::AppResult;
use ams_entity::api_key::ApiKey;

/// Repository for API key lookups.
#[derive(Debug, Clone)]
pub struct ApiKeyRepository {
    pool: PgPool,
}

impl ApiKeyRepository {
    /// Create a new API key repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a key that is enabled and not yet expired at `now`.
    pub async fn find_active(&self, key: &str, now: DateTime<Utc>) -> AppResult<Option<ApiKey>> {
        sqlx::query_as::<_, ApiKey>(
            "SELECT * FROM api_keys WHERE key = $1 AND is_active = TRUE AND expires_at > $2",
        )
        .bind(key)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find API key", e))
    }
}
