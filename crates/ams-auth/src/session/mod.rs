//! Credential sessions: login, refresh-token rotation, revocation and
//! password changes.

pub mod directory;
pub mod manager;

pub use directory::UserDirectory;
pub use manager::{
    LoginResult, REASON_LOGOUT, REASON_PASSWORD_CHANGED, SessionManager, TokenPair,
};
