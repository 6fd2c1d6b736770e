//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::HealthResponse;
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match &state.database {
        Some(pool) => Some(match pool.health_check().await {
            Ok(()) => "connected".to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed");
                "unavailable".to_string()
            }
        }),
        None => None,
    };

    let status = match database.as_deref() {
        Some("unavailable") => "degraded",
        _ => "ok",
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
    })
}
