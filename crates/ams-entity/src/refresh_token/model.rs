//! Refresh token entity model and its state transitions.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use ams_core::error::AppError;
use ams_core::result::AppResult;

/// Revocation reason recorded when a token is consumed by rotation.
pub const REASON_REPLACED: &str = "Replaced by new token";

/// A persisted, long-lived refresh token.
///
/// Lifecycle: Active → Revoked (replaced or explicit). Expiry is derived
/// from `expires_at` and never stored. Identity fields (`id`, `user_id`,
/// `token`, `issued_at`, `expires_at`) are fixed at issuance; only the
/// revocation fields change, and only through [`RefreshToken::revoke`] and
/// [`RefreshToken::rotate`]. Once `revoked_at` is set it is never cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RefreshToken {
    /// Unique record identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Opaque bearer secret, unique across all tokens.
    #[serde(skip_serializing)]
    pub token: String,
    /// When the token was issued.
    pub issued_at: DateTime<Utc>,
    /// When the token stops being accepted.
    pub expires_at: DateTime<Utc>,
    /// When the token was revoked, if it was.
    pub revoked_at: Option<DateTime<Utc>>,
    /// Token value that superseded this one during rotation.
    #[serde(skip_serializing)]
    pub replaced_by_token: Option<String>,
    /// Why the token was revoked.
    pub reason_revoked: Option<String>,
}

impl RefreshToken {
    /// Issues a new active token for `user_id`.
    ///
    /// Fails if `ttl` is not strictly positive or the expiry overflows.
    pub fn issue(
        user_id: Uuid,
        token: impl Into<String>,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> AppResult<Self> {
        if ttl <= Duration::zero() {
            return Err(AppError::validation(
                "Refresh token lifetime must be positive",
            ));
        }

        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| AppError::validation("Refresh token expiry is out of range"))?;

        Ok(Self {
            id: Uuid::new_v4(),
            user_id,
            token: token.into(),
            issued_at,
            expires_at,
            revoked_at: None,
            replaced_by_token: None,
            reason_revoked: None,
        })
    }

    /// `now >= expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether a revocation has been recorded.
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Neither revoked nor expired.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked() && !self.is_expired(now)
    }

    /// Revokes the token explicitly.
    pub fn revoke(&mut self, reason: &str, at: DateTime<Utc>) -> AppResult<()> {
        if self.is_revoked() {
            return Err(AppError::conflict("Refresh token is already revoked"));
        }

        self.revoked_at = Some(at);
        self.reason_revoked = Some(reason.to_string());
        Ok(())
    }

    /// Revokes the token as consumed by rotation, pointing at `replacement`.
    ///
    /// The replacement must belong to the same user and carry a different
    /// value; an expired or revoked token cannot be rotated.
    pub fn rotate(&mut self, replacement: &RefreshToken, at: DateTime<Utc>) -> AppResult<()> {
        if replacement.user_id != self.user_id {
            return Err(AppError::validation(
                "Replacement token belongs to a different user",
            ));
        }
        if replacement.token == self.token {
            return Err(AppError::validation(
                "Replacement token must differ from the rotated token",
            ));
        }
        if self.is_expired(at) {
            return Err(AppError::conflict("Refresh token has expired"));
        }

        self.revoke(REASON_REPLACED, at)?;
        self.replaced_by_token = Some(replacement.token.clone());
        Ok(())
    }
}
