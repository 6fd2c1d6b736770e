//! # ams-core
//!
//! Core crate for the AMS backend. Contains configuration schemas,
//! the injectable clock, and the unified error system.
//!
//! This crate has **no** internal dependencies on other AMS crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
