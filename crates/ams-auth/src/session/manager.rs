//! Session lifecycle manager: login, refresh rotation, revocation, password
//! changes.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use ams_core::config::AuthConfig;
use ams_core::error::AppError;
use ams_core::traits::Clock;
use ams_entity::refresh_token::RefreshToken;
use ams_entity::user::UserAccount;

use crate::error::{AuthError, AuthResult};
use crate::jwt::TokenCodec;
use crate::password::{DECOY_DIGEST, PasswordPolicy, PasswordScheme};
use crate::token_store::RefreshTokenStore;

use super::directory::UserDirectory;

/// Revocation reason recorded by [`SessionManager::logout`].
pub const REASON_LOGOUT: &str = "User logout";

/// Revocation reason recorded by [`SessionManager::change_password`].
pub const REASON_PASSWORD_CHANGED: &str = "Password changed";

/// Access and refresh token pair returned by login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    /// Short-lived signed access token.
    pub access_token: String,
    /// Opaque refresh secret.
    pub refresh_token: String,
    /// When the access token expires.
    pub access_token_expiry: DateTime<Utc>,
    /// When the refresh token expires.
    pub refresh_token_expiry: DateTime<Utc>,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    /// Issued token pair.
    pub tokens: TokenPair,
    /// The authenticated user.
    pub account: UserAccount,
}

/// Manages credential sessions.
///
/// Holds no mutable state of its own; every decision is made against the
/// refresh token store, so concurrent calls are serialized by the store's
/// unit-of-work guarantees.
#[derive(Clone)]
pub struct SessionManager {
    /// Access token codec.
    codec: Arc<TokenCodec>,
    /// Refresh token persistence.
    store: Arc<dyn RefreshTokenStore>,
    /// Active users and their password digests.
    users: Arc<dyn UserDirectory>,
    /// Password digest scheme.
    passwords: Arc<dyn PasswordScheme>,
    /// Rules for replacement passwords.
    policy: PasswordPolicy,
    /// Time source.
    clock: Arc<dyn Clock>,
    /// Refresh token lifetime.
    refresh_ttl: Duration,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("codec", &self.codec)
            .field("store", &self.store)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish()
    }
}

impl SessionManager {
    /// Creates a session manager.
    ///
    /// Fails when the configured refresh token lifetime is zero or too large
    /// to add to the current time.
    pub fn new(
        codec: Arc<TokenCodec>,
        store: Arc<dyn RefreshTokenStore>,
        users: Arc<dyn UserDirectory>,
        passwords: Arc<dyn PasswordScheme>,
        clock: Arc<dyn Clock>,
        config: &AuthConfig,
    ) -> AuthResult<Self> {
        let days = config.refresh_token_ttl_days;
        let refresh_ttl = i64::try_from(days)
            .ok()
            .filter(|d| *d > 0)
            .and_then(Duration::try_days)
            .filter(|ttl| clock.now().checked_add_signed(*ttl).is_some())
            .ok_or_else(|| {
                AuthError::Configuration(format!(
                    "Refresh token lifetime of {days} days is out of range"
                ))
            })?;

        Ok(Self {
            codec,
            store,
            users,
            passwords,
            policy: PasswordPolicy::new(config),
            clock,
            refresh_ttl,
        })
    }

    /// The access token codec.
    pub fn codec(&self) -> &Arc<TokenCodec> {
        &self.codec
    }

    /// Authenticates by email and password and opens a new session.
    ///
    /// Unknown email, inactive user and wrong password all fail with
    /// [`AuthError::InvalidCredentials`].
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<LoginResult> {
        let account = self
            .users
            .find_active_by_email(email)
            .await
            .map_err(AuthError::Persistence)?;

        let Some(account) = account else {
            // A miss costs one digest check, like a wrong password.
            let _ = self.passwords.verify(password, DECOY_DIGEST).await;
            debug!("Login rejected: no active user for email");
            return Err(AuthError::InvalidCredentials);
        };

        let verified = match self
            .passwords
            .verify(password, &account.user.password_hash)
            .await
        {
            Ok(verified) => verified,
            Err(e) => {
                error!(user_id = %account.id(), error = %e, "Password digest could not be checked");
                false
            }
        };

        if !verified {
            warn!(user_id = %account.id(), "Login rejected: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let now = self.clock.now();
        let (tokens, record) = self.issue_pair(&account, now)?;

        let mut unit = self.store.begin().await.map_err(Self::persistence)?;
        unit.insert(&record).await.map_err(Self::persistence)?;
        unit.commit().await.map_err(Self::persistence)?;

        info!(user_id = %account.id(), token_id = %record.id, "User logged in");
        Ok(LoginResult { tokens, account })
    }

    /// Exchanges a refresh token for a new pair, revoking the presented one.
    ///
    /// Each refresh token is consumed at most once. Unknown, expired,
    /// revoked, and concurrently consumed tokens all fail with
    /// [`AuthError::InvalidRefreshToken`].
    pub async fn refresh(&self, presented: &str) -> AuthResult<TokenPair> {
        let now = self.clock.now();

        let current = self
            .store
            .find_by_token(presented)
            .await
            .map_err(Self::persistence)?;

        let mut current = match current {
            Some(record) if record.is_active(now) => record,
            _ => {
                warn!("Refresh rejected: token unknown or inactive");
                return Err(AuthError::InvalidRefreshToken);
            }
        };

        let account = self
            .users
            .find_active_by_id(current.user_id)
            .await
            .map_err(AuthError::Persistence)?
            .ok_or_else(|| {
                warn!(user_id = %current.user_id, "Refresh rejected: user missing or inactive");
                AuthError::UserNotFound
            })?;

        let (tokens, replacement) = self.issue_pair(&account, now)?;

        current.rotate(&replacement, now).map_err(|e| {
            warn!(token_id = %current.id, error = %e, "Refresh rejected: token cannot be rotated");
            AuthError::InvalidRefreshToken
        })?;

        let mut unit = self.store.begin().await.map_err(Self::persistence)?;
        unit.update(&current).await.map_err(Self::rotation_failure)?;
        unit.insert(&replacement).await.map_err(Self::rotation_failure)?;
        unit.commit().await.map_err(Self::rotation_failure)?;

        info!(
            user_id = %account.id(),
            revoked_token_id = %current.id,
            token_id = %replacement.id,
            "Refresh token rotated"
        );
        Ok(tokens)
    }

    /// Revokes every active refresh token of `user_id`.
    ///
    /// Returns the number revoked; a second call returns 0.
    pub async fn revoke_all_for_user(&self, user_id: Uuid, reason: &str) -> AuthResult<u64> {
        let count = self
            .store
            .revoke_all_active_for_user(user_id, reason, self.clock.now())
            .await
            .map_err(Self::persistence)?;

        info!(user_id = %user_id, count, reason, "Refresh tokens revoked");
        Ok(count)
    }

    /// Ends every session of `user_id`.
    pub async fn logout(&self, user_id: Uuid) -> AuthResult<u64> {
        self.revoke_all_for_user(user_id, REASON_LOGOUT).await
    }

    /// Replaces the password of `user_id` and ends all of its sessions.
    ///
    /// The current password must verify and the new one must satisfy the
    /// [`PasswordPolicy`]. Returns the number of refresh tokens revoked.
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current: &str,
        new: &str,
    ) -> AuthResult<u64> {
        let account = self
            .users
            .find_active_by_id(user_id)
            .await
            .map_err(AuthError::Persistence)?
            .ok_or(AuthError::UserNotFound)?;

        let verified = self
            .passwords
            .verify(current, &account.user.password_hash)
            .await
            .unwrap_or_else(|e| {
                error!(user_id = %user_id, error = %e, "Password digest could not be checked");
                false
            });
        if !verified {
            warn!(user_id = %user_id, "Password change rejected: current password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        self.policy.validate(current, new)?;

        let digest = self.passwords.digest(new).await.map_err(|e| {
            error!(user_id = %user_id, error = %e, "Password digest could not be produced");
            AuthError::Hashing(e)
        })?;

        let updated = self
            .users
            .update_password_hash(user_id, &digest)
            .await
            .map_err(AuthError::Persistence)?;
        if !updated {
            return Err(AuthError::UserNotFound);
        }

        info!(user_id = %user_id, "Password changed");
        self.revoke_all_for_user(user_id, REASON_PASSWORD_CHANGED).await
    }

    /// Active refresh token records of `user_id`, newest first.
    pub async fn list_active_sessions(&self, user_id: Uuid) -> AuthResult<Vec<RefreshToken>> {
        let now = self.clock.now();
        let records = self
            .store
            .find_by_user_id(user_id)
            .await
            .map_err(Self::persistence)?;

        Ok(records.into_iter().filter(|r| r.is_active(now)).collect())
    }

    /// Mints an access token and a new refresh record for `account`.
    fn issue_pair(
        &self,
        account: &UserAccount,
        now: DateTime<Utc>,
    ) -> AuthResult<(TokenPair, RefreshToken)> {
        let access = self.codec.mint(account)?;
        let record = RefreshToken::issue(
            account.id(),
            self.codec.mint_refresh_secret(),
            now,
            self.refresh_ttl,
        )
        .map_err(|e| AuthError::Configuration(e.message))?;

        let tokens = TokenPair {
            access_token: access.token,
            refresh_token: record.token.clone(),
            access_token_expiry: access.expires_at,
            refresh_token_expiry: record.expires_at,
        };
        Ok((tokens, record))
    }

    fn persistence(err: AppError) -> AuthError {
        error!(error = %err, "Refresh token store failure");
        AuthError::Persistence(err)
    }

    fn rotation_failure(err: AppError) -> AuthError {
        if err.is_conflict() {
            warn!(error = %err, "Refresh rejected: token consumed concurrently");
            AuthError::InvalidRefreshToken
        } else {
            Self::persistence(err)
        }
    }
}
