//! # ams-auth
//!
//! Credential session management for the AMS backend.
//!
//! ## Modules
//!
//! - `jwt`: access token minting and verification, refresh secret generation
//! - `password`: Argon2id password hashing, verification and strength rules
//! - `token_store`: refresh token persistence (in-memory and PostgreSQL)
//! - `session`: login, refresh-token rotation, and revocation
//! - `api_key`: API key existence check

pub mod api_key;
pub mod error;
pub mod jwt;
pub mod password;
pub mod session;
pub mod token_store;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use api_key::{ApiKeyChecker, ApiKeyLookup};
pub use error::{AuthError, AuthResult};
pub use jwt::{Claims, TokenCodec};
pub use password::{PasswordHasher, PasswordPolicy, PasswordScheme};
pub use session::{SessionManager, TokenPair, UserDirectory};
pub use token_store::{
    MemoryRefreshTokenStore, PgRefreshTokenStore, RefreshTokenStore, RefreshTokenUnit,
};
