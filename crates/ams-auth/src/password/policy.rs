//! Strength rules for new passwords.

use ams_core::config::AuthConfig;

use crate::error::{AuthError, AuthResult};

/// Checks a replacement password before it is digested.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    min_length: usize,
}

impl PasswordPolicy {
    /// Creates a policy from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Validates `new` and that it differs from `current`.
    ///
    /// Reports the first rule that fails.
    pub fn validate(&self, current: &str, new: &str) -> AuthResult<()> {
        if new.chars().count() < self.min_length {
            return Err(weak(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }
        if !new.chars().any(char::is_uppercase) {
            return Err(weak("Password must contain at least one uppercase letter"));
        }
        if !new.chars().any(char::is_lowercase) {
            return Err(weak("Password must contain at least one lowercase letter"));
        }
        if !new.chars().any(|c| c.is_ascii_digit()) {
            return Err(weak("Password must contain at least one digit"));
        }
        if new.chars().all(char::is_alphanumeric) {
            return Err(weak("Password must contain at least one special character"));
        }
        if new == current {
            return Err(weak(
                "New password must be different from the current password",
            ));
        }
        Ok(())
    }
}

fn weak(message: impl Into<String>) -> AuthError {
    AuthError::WeakPassword(message.into())
}
