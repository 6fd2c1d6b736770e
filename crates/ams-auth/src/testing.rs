//! In-memory collaborators for tests.
//!
//! Enabled for this crate's own tests and, through the `test-util`
//! feature, for downstream test suites.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use ams_core::config::AuthConfig;
use ams_core::result::AppResult;
use ams_core::traits::Clock;
use ams_entity::api_key::ApiKey;
use ams_entity::user::{User, UserAccount};

use crate::api_key::ApiKeyLookup;
use crate::jwt::TokenCodec;
use crate::password::PasswordHasher;
use crate::session::{SessionManager, UserDirectory};
use crate::token_store::{MemoryRefreshTokenStore, RefreshTokenStore};

/// Signing secret used by [`Harness`].
pub const TEST_JWT_SECRET: &str = "test-secret-test-secret-test-secret!";

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock pinned at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    /// Pins the clock at `at`.
    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }
}

impl Default for ManualClock {
    /// Starts at 2025-01-01T00:00:00Z.
    fn default() -> Self {
        Self::new(
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
                .single()
                .unwrap_or_else(Utc::now),
        )
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Builds an account with a placeholder password hash.
pub fn account(email: &str, roles: &[&str]) -> UserAccount {
    let now = Utc::now();
    let local = email.split('@').next().unwrap_or(email);
    UserAccount::new(
        User {
            id: Uuid::new_v4(),
            first_name: local.to_string(),
            last_name: "Tester".to_string(),
            email: email.to_string(),
            password_hash: String::new(),
            is_active: true,
            created_at: now,
            updated_at: now,
        },
        roles.iter().map(|r| r.to_string()).collect(),
    )
}

/// User directory held in memory.
#[derive(Debug, Default)]
pub struct MemoryUserDirectory {
    users: RwLock<HashMap<Uuid, UserAccount>>,
}

impl MemoryUserDirectory {
    /// Adds or replaces an account.
    pub fn insert(&self, account: UserAccount) {
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(account.id(), account);
    }

    /// Marks a user inactive.
    pub fn deactivate(&self, user_id: Uuid) {
        if let Some(account) = self
            .users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&user_id)
        {
            account.user.is_active = false;
        }
    }

    /// Deletes a user.
    pub fn remove(&self, user_id: Uuid) {
        self.users
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&user_id);
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_active_by_email(&self, email: &str) -> AppResult<Option<UserAccount>> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        Ok(users
            .values()
            .find(|a| a.user.is_active && a.email().eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_active_by_id(&self, user_id: Uuid) -> AppResult<Option<UserAccount>> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        Ok(users.get(&user_id).filter(|a| a.user.is_active).cloned())
    }

    async fn update_password_hash(&self, user_id: Uuid, digest: &str) -> AppResult<bool> {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);
        match users.get_mut(&user_id).filter(|a| a.user.is_active) {
            Some(account) => {
                account.user.password_hash = digest.to_string();
                account.user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// API keys held in memory.
#[derive(Debug, Default)]
pub struct MemoryApiKeys {
    keys: RwLock<Vec<ApiKey>>,
}

impl MemoryApiKeys {
    /// Registers a key.
    pub fn add(&self, key: &str, expires_at: DateTime<Utc>, is_active: bool) -> Uuid {
        let id = Uuid::new_v4();
        self.keys
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ApiKey {
                id,
                key: key.to_string(),
                description: "test key".to_string(),
                is_active,
                expires_at,
                location_id: None,
            });
        id
    }
}

#[async_trait]
impl ApiKeyLookup for MemoryApiKeys {
    async fn find_active(&self, key: &str, now: DateTime<Utc>) -> AppResult<Option<ApiKey>> {
        let keys = self.keys.read().unwrap_or_else(PoisonError::into_inner);
        Ok(keys
            .iter()
            .find(|k| k.key == key && k.is_usable(now))
            .cloned())
    }
}

/// A session manager wired to in-memory collaborators.
#[derive(Debug)]
pub struct Harness {
    /// Shared clock.
    pub clock: Arc<ManualClock>,
    /// User directory.
    pub users: Arc<MemoryUserDirectory>,
    /// Refresh token store.
    pub store: Arc<MemoryRefreshTokenStore>,
    /// Token codec.
    pub codec: Arc<TokenCodec>,
    /// Cheap Argon2id hasher.
    pub hasher: PasswordHasher,
    /// Configuration the harness was built with.
    pub config: AuthConfig,
    /// Manager over all of the above.
    pub manager: SessionManager,
}

impl Harness {
    /// Builds a harness with default lifetimes and a test signing secret.
    pub fn new() -> Self {
        Self::with_config(AuthConfig {
            jwt_secret: Some(TEST_JWT_SECRET.to_string()),
            ..AuthConfig::default()
        })
    }

    /// Builds a harness from `config`.
    ///
    /// # Panics
    ///
    /// Panics if `config` cannot produce a codec or manager.
    pub fn with_config(config: AuthConfig) -> Self {
        let clock = Arc::new(ManualClock::default());
        let users = Arc::new(MemoryUserDirectory::default());
        let store = Arc::new(MemoryRefreshTokenStore::new());
        let codec = Arc::new(
            TokenCodec::new(&config, clock.clone()).expect("test codec configuration"),
        );
        let hasher = PasswordHasher::with_params(8, 1, 1).expect("test hasher parameters");
        let manager = SessionManager::new(
            codec.clone(),
            store.clone(),
            users.clone(),
            Arc::new(hasher.clone()),
            clock.clone(),
            &config,
        )
        .expect("test session manager configuration");

        Self {
            clock,
            users,
            store,
            codec,
            hasher,
            config,
            manager,
        }
    }

    /// Registers an active user with `password` and returns its ID.
    ///
    /// # Panics
    ///
    /// Panics if hashing fails.
    pub fn add_user(&self, email: &str, password: &str, roles: &[&str]) -> Uuid {
        let mut account = account(email, roles);
        account.user.password_hash = self
            .hasher
            .hash_password(password)
            .expect("test password hashing");
        let id = account.id();
        self.users.insert(account);
        id
    }

    /// A manager sharing this harness's collaborators but using `store`.
    ///
    /// # Panics
    ///
    /// Panics if the harness configuration is invalid.
    pub fn manager_with_store(&self, store: Arc<dyn RefreshTokenStore>) -> SessionManager {
        SessionManager::new(
            self.codec.clone(),
            store,
            self.users.clone(),
            Arc::new(self.hasher.clone()),
            self.clock.clone(),
            &self.config,
        )
        .expect("test session manager configuration")
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
