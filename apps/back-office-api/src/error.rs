//! Error types for the back office API.
//!
//! ## Status Mapping
//! ```text
//! ValidationError / JSON rejection        → 400 VALIDATION_ERROR
//! CoreError::InsufficientStock            → 400 INSUFFICIENT_STOCK
//! CoreError::DuplicateReading             → 400 DUPLICATE_READING
//! Other CoreError, FK / UNIQUE violation  → 400 VALIDATION_ERROR
//! DbError::NotFound                       → 404 NOT_FOUND
//! Everything else                         → 500 INTERNAL
//! ```

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fuelbook_core::{CoreError, ValidationError};
use fuelbook_db::DbError;
use serde::Serialize;
use tracing::error;

/// Machine-readable error class sent to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NotFound,
    InsufficientStock,
    DuplicateReading,
    Internal,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::ValidationError
            | ErrorCode::InsufficientStock
            | ErrorCode::DuplicateReading => StatusCode::BAD_REQUEST,
        }
    }
}

/// What the client sees when a request fails.
#[derive(Debug, Clone, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Hides the cause from the client; the cause is logged instead.
    fn internal(cause: impl std::fmt::Display) -> Self {
        error!(error = %cause, "Request failed");
        ApiError::new(ErrorCode::Internal, "Internal server error")
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::DuplicateReading { .. } => ErrorCode::DuplicateReading,
            CoreError::Validation(inner) => return ApiError::validation(inner.to_string()),
            CoreError::FuelTypeMismatch { .. }
            | CoreError::TankNotFound { .. }
            | CoreError::EmptyBatch => ErrorCode::ValidationError,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Core(core) => core.into(),
            DbError::NotFound { .. } => ApiError::new(ErrorCode::NotFound, err.to_string()),
            DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. } => {
                ApiError::validation(err.to_string())
            }
            // Conflict here means the retries ran out.
            other => ApiError::internal(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
