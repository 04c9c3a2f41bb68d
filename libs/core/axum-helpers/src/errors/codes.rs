//! Error codes carried in [`ErrorResponse`](super::ErrorResponse) bodies.
//!
//! Each code has a client-facing string, an integer for logs and metrics, and a
//! default message.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::NotFound;
//! assert_eq!(code.as_str(), "NOT_FOUND");
//! assert_eq!(code.code(), 1004);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No route matched the request
    NotFound,

    /// An unexpected internal server error occurred
    InternalError,

    // Database errors (2000-2999)
    /// Document store rejected or failed an operation
    DatabaseError,
}

impl ErrorCode {
    /// SCREAMING_SNAKE_CASE identifier for clients
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::InternalError => "INTERNAL_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
        }
    }

    /// Integer code for structured logs.
    ///
    /// Ranges: 1000s request and server errors, 2000s database.
    pub fn code(&self) -> i32 {
        match self {
            Self::NotFound => 1004,
            Self::InternalError => 1005,
            Self::DatabaseError => 2003,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::NotFound => "The requested resource was not found",
            Self::InternalError => "An internal server error occurred",
            Self::DatabaseError => "Database error occurred",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_integer_codes() {
        assert_eq!(ErrorCode::NotFound.code(), 1004);
        assert_eq!(ErrorCode::InternalError.code(), 1005);
        assert_eq!(ErrorCode::DatabaseError.code(), 2003);
    }

    #[test]
    fn test_error_code_display_matches_serde() {
        let code = ErrorCode::DatabaseError;
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, format!("\"{}\"", code));
    }
}
