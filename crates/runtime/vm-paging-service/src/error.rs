//! Service error types and their HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use vm_paging::PagingError;

/// Errors surfaced by the HTTP service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Rejected or failed simulation
    #[error(transparent)]
    Paging(#[from] PagingError),

    /// Body is not valid JSON or does not match either request shape
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Blocking simulation task panicked or was cancelled
    #[error("Simulation task failed: {0}")]
    Task(String),

    /// Configuration file could not be parsed
    #[error("Failed to load configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Paging(err) if err.is_user_error() => StatusCode::BAD_REQUEST,
            ServiceError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("simulation request failed: {}", self);
        } else {
            tracing::warn!("simulation request rejected: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Result type alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
