//! Route definitions for the AMS HTTP API.
//!
//! All routes are mounted under `/api` and receive `AppState` through
//! Axum's `State` extractor.

use std::time::Duration;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post, put},
};
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
///
/// Requests running longer than `server.request_timeout_seconds` are
/// answered with 408 and their handler future is dropped.
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.server.request_timeout_seconds);

    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(admin_routes())
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .layer(TimeoutLayer::new(timeout))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors::build_cors_layer(&state.server.cors))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Auth endpoints: login, refresh, logout, me, sessions
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
        .route("/auth/sessions", get(handlers::auth::sessions))
        .route("/auth/password", put(handlers::auth::change_password))
}

/// Administrative endpoints (API key)
fn admin_routes() -> Router<AppState> {
    Router::new().route(
        "/admin/users/{id}/revoke-tokens",
        post(handlers::admin::revoke_user_tokens),
    )
}

/// Health endpoints
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
