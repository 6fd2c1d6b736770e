//! Refresh token store contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use ams_core::result::AppResult;
use ams_entity::refresh_token::RefreshToken;

/// Durable storage for refresh token records.
///
/// Writes that must land together go through a [`RefreshTokenUnit`]
/// obtained from [`RefreshTokenStore::begin`].
#[async_trait]
pub trait RefreshTokenStore: Send + Sync + std::fmt::Debug + 'static {
    /// Looks up a record by its exact token value.
    async fn find_by_token(&self, token: &str) -> AppResult<Option<RefreshToken>>;

    /// All records of a user, newest first.
    async fn find_by_user_id(&self, user_id: Uuid) -> AppResult<Vec<RefreshToken>>;

    /// Revokes every non-revoked record of `user_id` with `reason` at `at`.
    ///
    /// Already-revoked records keep their original revocation. Returns the
    /// number of records revoked by this call.
    async fn revoke_all_active_for_user(
        &self,
        user_id: Uuid,
        reason: &str,
        at: DateTime<Utc>,
    ) -> AppResult<u64>;

    /// Starts a unit of work.
    async fn begin(&self) -> AppResult<Box<dyn RefreshTokenUnit>>;
}

/// A set of staged writes that commit atomically.
///
/// Dropping a unit without calling [`RefreshTokenUnit::commit`] discards
/// every staged write.
#[async_trait]
pub trait RefreshTokenUnit: Send {
    /// Stages a new record. Commit fails with a conflict if the token value
    /// already exists.
    async fn insert(&mut self, record: &RefreshToken) -> AppResult<()>;

    /// Stages the revocation fields of an existing record.
    ///
    /// Guarded on the stored record still being unrevoked; if another
    /// writer revoked it first the unit fails with a conflict and nothing
    /// is persisted.
    async fn update(&mut self, record: &RefreshToken) -> AppResult<()>;

    /// Persists all staged writes, or none.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}
