//! API key authentication for administrative callers.

pub mod checker;

pub use checker::{ApiKeyChecker, ApiKeyLookup};
