//! Maps domain errors to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use ams_auth::AuthError;
use ams_core::error::{AppError, ErrorKind};

/// Message returned in place of internal failure details.
const GENERIC_SERVER_ERROR: &str = "An unexpected error occurred";

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Error returned by handlers and extractors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self(err.into())
    }
}

impl ApiError {
    /// HTTP status for an error kind.
    pub fn status(&self) -> StatusCode {
        match self.0.kind {
            ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
            ErrorKind::Validation | ErrorKind::Serialization => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Configuration | ErrorKind::Database | ErrorKind::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let err = self.0;

        let message = if status.is_server_error() {
            tracing::error!(
                kind = %err.kind,
                code = err.code(),
                error = %err,
                source = ?std::error::Error::source(&err),
                "Request failed"
            );
            GENERIC_SERVER_ERROR.to_string()
        } else {
            err.message.clone()
        };

        let body = ApiErrorResponse {
            error: err.code().to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
