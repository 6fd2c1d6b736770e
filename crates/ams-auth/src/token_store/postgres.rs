//! PostgreSQL refresh token store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use ams_core::error::{AppError, ErrorKind};
use ams_core::result::AppResult;
use ams_entity::refresh_token::RefreshToken;

use super::store::{RefreshTokenStore, RefreshTokenUnit};

/// PostgreSQL error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Refresh token store backed by the `refresh_tokens` table.
#[derive(Debug, Clone)]
pub struct PgRefreshTokenStore {
    pool: PgPool,
}

impl PgRefreshTokenStore {
    /// Create a new store over `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RefreshTokenStore for PgRefreshTokenStore {
    async fn find_by_token(&self, token: &str) -> AppResult<Option<RefreshToken>> {
        sqlx::query_as::<_, RefreshToken>("SELECT * FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find refresh token", e)
            })
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> AppResult<Vec<RefreshToken>> {
        sqlx::query_as::<_, RefreshToken>(
            "SELECT * FROM refresh_tokens WHERE user_id = $1 ORDER BY issued_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list refresh tokens", e)
        })
    }

    async fn revoke_all_active_for_user(
        &self,
        user_id: Uuid,
        reason: &str,
        at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = $2, reason_revoked = $3 \
             WHERE user_id = $1 AND revoked_at IS NULL",
        )
        .bind(user_id)
        .bind(at)
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to revoke refresh tokens", e)
        })?;

        Ok(result.rows_affected())
    }

    async fn begin(&self) -> AppResult<Box<dyn RefreshTokenUnit>> {
        let tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        Ok(Box::new(PgUnit { tx }))
    }
}

/// Unit of work running inside one database transaction.
///
/// An uncommitted transaction is rolled back when dropped.
struct PgUnit {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl RefreshTokenUnit for PgUnit {
    async fn insert(&mut self, record: &RefreshToken) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO refresh_tokens \
             (id, user_id, token, issued_at, expires_at, revoked_at, replaced_by_token, reason_revoked) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.token)
        .bind(record.issued_at)
        .bind(record.expires_at)
        .bind(record.revoked_at)
        .bind(&record.replaced_by_token)
        .bind(&record.reason_revoked)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            let unique = e
                .as_database_error()
                .and_then(|db| db.code())
                .is_some_and(|code| code == UNIQUE_VIOLATION);
            if unique {
                AppError::with_source(ErrorKind::Conflict, "Refresh token value already exists", e)
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to insert refresh token", e)
            }
        })?;

        Ok(())
    }

    async fn update(&mut self, record: &RefreshToken) -> AppResult<()> {
        if !record.is_revoked() {
            return Err(AppError::validation(
                "Only revocations can be written to an existing refresh token",
            ));
        }

        let result = sqlx::query(
            "UPDATE refresh_tokens \
             SET revoked_at = $2, replaced_by_token = $3, reason_revoked = $4 \
             WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(record.id)
        .bind(record.revoked_at)
        .bind(&record.replaced_by_token)
        .bind(&record.reason_revoked)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to update refresh token", e)
        })?;

        if result.rows_affected() == 0 {
            debug!(token_id = %record.id, "Refresh token update lost to a concurrent writer");
            return Err(AppError::conflict(
                "Refresh token was revoked by a concurrent writer",
            ));
        }

        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })
    }
}
