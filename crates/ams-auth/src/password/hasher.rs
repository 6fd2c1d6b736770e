//! Argon2id password hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier as ArgonVerifier,
        SaltString, rand_core::OsRng,
    },
};
use async_trait::async_trait;

use ams_core::error::{AppError, ErrorKind};
use ams_core::result::AppResult;

use super::scheme::PasswordScheme;

/// Handles password hashing and verification using Argon2id.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Creates a hasher with the library's default Argon2id cost.
    pub fn new() -> Self {
        Self {
            params: Params::default(),
        }
    }

    /// Creates a hasher with explicit cost parameters.
    ///
    /// `memory_kib` must be at least `8 * parallelism`.
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> AppResult<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AppError::configuration(format!("Invalid Argon2 parameters: {e}")))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes a plaintext password with a random salt into a PHC string.
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored PHC hash.
    ///
    /// Cost parameters are read from the hash itself.
    pub fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        match self.argon2().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PasswordScheme for PasswordHasher {
    async fn verify(&self, password: &str, digest: &str) -> AppResult<bool> {
        let hasher = self.clone();
        let password = password.to_string();
        let digest = digest.to_string();

        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &digest))
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Internal,
                    "Password verification task failed",
                    e,
                )
            })?
    }

    async fn digest(&self, password: &str) -> AppResult<String> {
        let hasher = self.clone();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Password hashing task failed", e)
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::DECOY_DIGEST;

    fn cheap() -> PasswordHasher {
        PasswordHasher::with_params(8, 1, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = cheap();
        let hash = hasher.hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("correct horse", &hash).unwrap());
        assert!(!hasher.verify_password("battery staple", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let hasher = cheap();
        let a = hasher.hash_password("same").unwrap();
        let b = hasher.hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_digest_is_error() {
        assert!(cheap().verify_password("x", "not-a-phc-string").is_err());
    }

    #[test]
    fn test_invalid_params_rejected() {
        assert!(PasswordHasher::with_params(1, 1, 1).is_err());
    }

    #[tokio::test]
    async fn test_async_scheme() {
        let hasher = cheap();
        let hash = PasswordScheme::digest(&hasher, "pw").await.unwrap();
        assert!(PasswordScheme::verify(&hasher, "pw", &hash).await.unwrap());
        assert!(!PasswordScheme::verify(&hasher, "nope", &hash).await.unwrap());
    }

    #[test]
    fn test_decoy_digest_is_well_formed_and_matches_nothing() {
        let parsed = PasswordHash::new(DECOY_DIGEST).unwrap();
        let params = Params::try_from(&parsed).unwrap();
        let defaults = Params::default();
        assert_eq!(parsed.algorithm.as_str(), "argon2id");
        assert_eq!(
            (params.m_cost(), params.t_cost(), params.p_cost()),
            (defaults.m_cost(), defaults.t_cost(), defaults.p_cost())
        );
        assert!(!cheap().verify_password("", DECOY_DIGEST).unwrap());
        assert!(!cheap().verify_password("password", DECOY_DIGEST).unwrap());
    }
}
