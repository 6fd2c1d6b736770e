//! # ams-entity
//!
//! Domain entity models for the AMS backend. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow`.

pub mod api_key;
pub mod refresh_token;
pub mod user;
