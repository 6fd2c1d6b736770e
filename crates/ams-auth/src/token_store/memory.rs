//! In-memory refresh token store using a Tokio mutex.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use ams_core::error::AppError;
use ams_core::result::AppResult;
use ams_entity::refresh_token::RefreshToken;

use super::store::{RefreshTokenStore, RefreshTokenUnit};

/// Records keyed by token value.
#[derive(Debug, Default)]
struct InnerState {
    tokens: HashMap<String, RefreshToken>,
}

/// In-memory refresh token store.
///
/// Suitable for single-node deployments and tests. Units stage their writes
/// locally and validate-then-apply them under one lock acquisition, so two
/// units racing on the same record cannot both commit.
#[derive(Debug, Clone, Default)]
pub struct MemoryRefreshTokenStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryRefreshTokenStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.state.lock().await.tokens.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn find_by_token(&self, token: &str) -> AppResult<Option<RefreshToken>> {
        let state = self.state.lock().await;
        Ok(state.tokens.get(token).cloned())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> AppResult<Vec<RefreshToken>> {
        let state = self.state.lock().await;
        let mut records: Vec<RefreshToken> = state
            .tokens
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.issued_at.cmp(&a.issued_at));
        Ok(records)
    }

    async fn revoke_all_active_for_user(
        &self,
        user_id: Uuid,
        reason: &str,
        at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let mut revoked = 0;
        for record in state
            .tokens
            .values_mut()
            .filter(|t| t.user_id == user_id && !t.is_revoked())
        {
            record.revoke(reason, at)?;
            revoked += 1;
        }
        Ok(revoked)
    }

    async fn begin(&self) -> AppResult<Box<dyn RefreshTokenUnit>> {
        Ok(Box::new(MemoryUnit {
            state: Arc::clone(&self.state),
            staged: Vec::new(),
        }))
    }
}

#[derive(Debug)]
enum StagedWrite {
    Insert(RefreshToken),
    Update(RefreshToken),
}

/// Unit of work over [`MemoryRefreshTokenStore`].
#[derive(Debug)]
struct MemoryUnit {
    state: Arc<Mutex<InnerState>>,
    staged: Vec<StagedWrite>,
}

impl MemoryUnit {
    fn validate(state: &InnerState, staged: &[StagedWrite]) -> AppResult<()> {
        let mut inserted = HashSet::new();
        for write in staged {
            match write {
                StagedWrite::Insert(record) => {
                    if state.tokens.contains_key(&record.token)
                        || !inserted.insert(record.token.as_str())
                    {
                        return Err(AppError::conflict("Refresh token value already exists"));
                    }
                }
                StagedWrite::Update(record) => match state.tokens.get(&record.token) {
                    None => return Err(AppError::not_found("Refresh token not found")),
                    Some(stored) if stored.id != record.id => {
                        return Err(AppError::conflict("Refresh token identity mismatch"));
                    }
                    Some(stored) if stored.is_revoked() => {
                        return Err(AppError::conflict(
                            "Refresh token was revoked by a concurrent writer",
                        ));
                    }
                    Some(_) => {}
                },
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenUnit for MemoryUnit {
    async fn insert(&mut self, record: &RefreshToken) -> AppResult<()> {
        self.staged.push(StagedWrite::Insert(record.clone()));
        Ok(())
    }

    async fn update(&mut self, record: &RefreshToken) -> AppResult<()> {
        if !record.is_revoked() {
            return Err(AppError::validation(
                "Only revocations can be written to an existing refresh token",
            ));
        }
        self.staged.push(StagedWrite::Update(record.clone()));
        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let Self { state, staged } = *self;
        let mut state = state.lock().await;

        Self::validate(&state, &staged)?;

        let writes = staged.len();
        for write in staged {
            match write {
                StagedWrite::Insert(record) => {
                    state.tokens.insert(record.token.clone(), record);
                }
                StagedWrite::Update(record) => {
                    if let Some(stored) = state.tokens.get_mut(&record.token) {
                        stored.revoked_at = record.revoked_at;
                        stored.replaced_by_token = record.replaced_by_token;
                        stored.reason_revoked = record.reason_revoked;
                    }
                }
            }
        }
        debug!(writes, "Refresh token unit committed");
        Ok(())
    }
}
