//! # ams-database
//!
//! PostgreSQL connection management and the repositories the
//! authentication core reads users and API keys through.

pub mod connection;
pub mod repositories;

pub use connection::{DatabasePool, MIGRATOR};
