use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::OrderStatus;

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP status category (e.g. "Not Found", "Conflict")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

/// Typed failures surfaced by the services. Callers get exactly one of
/// these per invocation; nothing is retried and nothing is half-applied.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed input: non-positive quantity, missing required field.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Dangling or inactive foreign key: unknown unit/supplier/product,
    /// product owned by a different supplier, inactive product.
    #[error("Invalid reference: {0}")]
    ReferenceError(String),

    /// Delete blocked by dependents, or a duplicate unique value.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("status {status} does not permit {operation}")]
    InvalidStateTransition {
        status: OrderStatus,
        operation: &'static str,
    },
}

impl ServiceError {
    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) | Self::ReferenceError(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) | Self::InvalidStateTransition { .. } => StatusCode::CONFLICT,
        }
    }

    /// Message suitable for HTTP responses. Database details stay in the
    /// logs, never in the body.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        }

        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        (status, Json(body)).into_response()
    }
}
