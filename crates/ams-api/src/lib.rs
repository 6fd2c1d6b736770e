//! # ams-api
//!
//! HTTP API layer for AMS built on Axum.
//!
//! Provides the authentication and administrative endpoints, extractors for
//! bearer access tokens and API keys, request validation, DTOs, and the
//! mapping from domain errors to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{Collaborators, build_app, build_state};
pub use error::ApiError;
pub use state::AppState;
