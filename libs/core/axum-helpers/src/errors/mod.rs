pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// Standard error body for infrastructure-level failures.
///
/// ```json
/// {
///   "code": 2003,
///   "error": "DATABASE_ERROR",
///   "message": "Database error occurred"
/// }
/// ```
#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Integer error code for logging and monitoring
    pub code: i32,
    /// Machine-readable error identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            error: code.as_str().to_string(),
            message: message.into(),
        }
    }
}

/// Application error type that renders as an [`ErrorResponse`].
///
/// Domain crates convert their own server-side failures into this so that
/// every 5xx has the same shape.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl AppError {
    fn code(&self) -> ErrorCode {
        match self {
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::InternalServerError(_) => ErrorCode::InternalError,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();

        // Details stay in the logs; clients get the default message.
        tracing::error!(error_code = code.code(), "{}", self);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new(code, code.default_message())),
        )
            .into_response()
    }
}
