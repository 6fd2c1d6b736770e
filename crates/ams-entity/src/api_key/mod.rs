//! API key entity.

pub mod model;

pub use model::ApiKey;
