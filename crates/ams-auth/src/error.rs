//! Error taxonomy of the credential session core.

use thiserror::Error;

use ams_core::error::{AppError, ErrorKind};

/// Failures reported by login, refresh, revocation and token verification.
///
/// Credential and refresh-token failures deliberately collapse distinct
/// causes into one variant so callers cannot tell them apart.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email, inactive user, or wrong password.
    #[error("Invalid email or password")]
    InvalidCredentials,
    /// Refresh token unknown, expired, revoked, or consumed by a concurrent refresh.
    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,
    /// The refresh token is valid but its owner no longer exists or is inactive.
    #[error("User not found or inactive")]
    UserNotFound,
    /// Access token failed signature, issuer, audience, or expiry checks.
    #[error("Invalid or expired access token")]
    InvalidToken,
    /// API key missing, unknown, disabled, or expired.
    #[error("Invalid or expired API key")]
    InvalidApiKey,
    /// A new password breaks a strength rule.
    #[error("{0}")]
    WeakPassword(String),
    /// Signing configuration is missing or unusable.
    #[error("Authentication is misconfigured: {0}")]
    Configuration(String),
    /// The backing store failed.
    #[error("Persistence failure: {0}")]
    Persistence(#[source] AppError),
    /// A password digest could not be produced.
    #[error("Password hashing failure: {0}")]
    Hashing(#[source] AppError),
}

impl AuthError {
    /// Stable machine-readable code for transports.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "auth.invalid_credentials",
            Self::InvalidRefreshToken => "auth.invalid_refresh_token",
            Self::UserNotFound => "auth.user_not_found",
            Self::InvalidToken => "auth.invalid_token",
            Self::InvalidApiKey => "auth.invalid_api_key",
            Self::WeakPassword(_) => "auth.weak_password",
            Self::Configuration(_) => "auth.configuration",
            Self::Persistence(_) => "auth.persistence",
            Self::Hashing(_) => "auth.hashing",
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let code = err.code();
        let kind = match &err {
            AuthError::InvalidCredentials
            | AuthError::InvalidRefreshToken
            | AuthError::UserNotFound
            | AuthError::InvalidToken
            | AuthError::InvalidApiKey => ErrorKind::Authentication,
            AuthError::WeakPassword(_) => ErrorKind::Validation,
            AuthError::Configuration(_) => ErrorKind::Configuration,
            AuthError::Persistence(_) => ErrorKind::Database,
            AuthError::Hashing(_) => ErrorKind::Internal,
        };
        match err {
            AuthError::Persistence(source) => {
                AppError::with_source(kind, "Persistence failure", source).with_code(code)
            }
            AuthError::Hashing(source) => {
                AppError::with_source(kind, "Password hashing failure", source).with_code(code)
            }
            other => AppError::new(kind, other.to_string()).with_code(code),
        }
    }
}

/// Result alias for the session core.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_failures_map_to_authentication() {
        let err: AppError = AuthError::InvalidRefreshToken.into();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert_eq!(err.code(), "auth.invalid_refresh_token");

        let err: AppError = AuthError::UserNotFound.into();
        assert_eq!(err.code(), "auth.user_not_found");
    }

    #[test]
    fn test_weak_password_is_validation() {
        let err: AppError = AuthError::WeakPassword("too short".to_string()).into();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(err.code(), "auth.weak_password");
        assert_eq!(err.message, "too short");
    }

    #[test]
    fn test_persistence_keeps_source() {
        let err: AppError = AuthError::Persistence(AppError::database("commit failed")).into();
        assert_eq!(err.kind, ErrorKind::Database);
        assert_eq!(err.code(), "auth.persistence");
        assert!(std::error::Error::source(&err).is_some());
    }
}
