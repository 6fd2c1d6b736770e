//! Refresh token entity.

pub mod model;

pub use model::{REASON_REPLACED, RefreshToken};
