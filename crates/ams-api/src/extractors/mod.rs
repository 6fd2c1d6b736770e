//! Custom Axum extractors.

pub mod api_key;
pub mod auth;
pub mod json;

pub use api_key::ApiKeyAuth;
pub use auth::AuthUser;
pub use json::ValidatedJson;
