//! Repository implementations for the entities the auth core reads.

pub mod api_key;
pub mod user;

pub use api_key::ApiKeyRepository;
pub use user::UserRepository;
