//! API key existence check.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use ams_core::result::AppResult;
use ams_core::traits::Clock;
use ams_database::repositories::ApiKeyRepository;
use ams_entity::api_key::ApiKey;

use crate::error::{AuthError, AuthResult};

/// Lookup of usable API keys.
#[async_trait]
pub trait ApiKeyLookup: Send + Sync + 'static {
    /// A key that is enabled and unexpired at `now`.
    async fn find_active(&self, key: &str, now: DateTime<Utc>) -> AppResult<Option<ApiKey>>;
}

#[async_trait]
impl ApiKeyLookup for ApiKeyRepository {
    async fn find_active(&self, key: &str, now: DateTime<Utc>) -> AppResult<Option<ApiKey>> {
        ApiKeyRepository::find_active(self, key, now).await
    }
}

/// Validates API keys presented by callers.
///
/// Only existence is checked; keys carry no roles.
#[derive(Clone)]
pub struct ApiKeyChecker {
    lookup: Arc<dyn ApiKeyLookup>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ApiKeyChecker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyChecker").finish_non_exhaustive()
    }
}

impl ApiKeyChecker {
    /// Creates a checker over `lookup`.
    pub fn new(lookup: Arc<dyn ApiKeyLookup>, clock: Arc<dyn Clock>) -> Self {
        Self { lookup, clock }
    }

    /// Returns the matching key or [`AuthError::InvalidApiKey`].
    pub async fn authenticate(&self, presented: &str) -> AuthResult<ApiKey> {
        let presented = presented.trim();
        if presented.is_empty() {
            return Err(AuthError::InvalidApiKey);
        }

        let now = self.clock.now();
        let key = self
            .lookup
            .find_active(presented, now)
            .await
            .map_err(AuthError::Persistence)?
            .filter(|k| k.is_usable(now));

        match key {
            Some(key) => {
                debug!(api_key_id = %key.id, "API key accepted");
                Ok(key)
            }
            None => {
                warn!("API key rejected");
                Err(AuthError::InvalidApiKey)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::testing::{ManualClock, MemoryApiKeys};

    fn checker() -> (ApiKeyChecker, Arc<MemoryApiKeys>, Arc<ManualClock>) {
        let keys = Arc::new(MemoryApiKeys::default());
        let clock = Arc::new(ManualClock::default());
        (ApiKeyChecker::new(keys.clone(), clock.clone()), keys, clock)
    }

    #[tokio::test]
    async fn test_accepts_active_key() {
        let (checker, keys, clock) = checker();
        keys.add("k-123", clock.now() + Duration::days(1), true);
        assert_eq!(checker.authenticate("k-123").await.unwrap().key, "k-123");
    }

    #[tokio::test]
    async fn test_rejects_blank_unknown_disabled_and_expired() {
        let (checker, keys, clock) = checker();
        keys.add("disabled", clock.now() + Duration::days(1), false);
        keys.add("expiring", clock.now() + Duration::hours(1), true);

        for presented in ["", "   ", "unknown", "disabled"] {
            assert!(matches!(
                checker.authenticate(presented).await,
                Err(AuthError::InvalidApiKey)
            ));
        }

        assert!(checker.authenticate("expiring").await.is_ok());
        clock.advance(Duration::hours(1));
        assert!(matches!(
            checker.authenticate("expiring").await,
            Err(AuthError::InvalidApiKey)
        ));
    }
}
