use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_helpers::AppError;
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

pub const USER_NOT_FOUND: &str = "User with that ID does not exist!";
pub const MISSING_CREATE_FIELDS: &str =
    "Missing one or more required parameters - name, email and password";
pub const MISSING_UPDATE_FIELDS: &str =
    "At least one parameter among name, password,email required.";
pub const NAME_TAKEN: &str = "User with that username already exists!";
pub const EMAIL_TAKEN: &str = "User with that email already exists!";
pub const NAME_AND_EMAIL_TAKEN: &str = "Both email and username already in use!";

/// Which unique attributes of a new user are already in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    Name,
    Email,
    Both,
}

impl ConflictKind {
    /// `None` when neither the name nor the email is taken.
    pub fn from_flags(name_taken: bool, email_taken: bool) -> Option<Self> {
        match (name_taken, email_taken) {
            (true, true) => Some(Self::Both),
            (true, false) => Some(Self::Name),
            (false, true) => Some(Self::Email),
            (false, false) => None,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Name => NAME_TAKEN,
            Self::Email => EMAIL_TAKEN,
            Self::Both => NAME_AND_EMAIL_TAKEN,
        }
    }
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User with that ID does not exist!")]
    NotFound,

    #[error("{0}")]
    Validation(&'static str),

    #[error("{}", .0.message())]
    Conflict(ConflictKind),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Database error: {0}")]
    Database(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<mongodb::error::Error> for UserError {
    fn from(err: mongodb::error::Error) -> Self {
        UserError::Database(err.to_string())
    }
}

/// Client error body: `{"error": "<message>"}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    #[schema(example = "User with that ID does not exist!")]
    pub error: String,
}

impl ErrorBody {
    fn response(status: StatusCode, message: &str) -> Response {
        (
            status,
            Json(ErrorBody {
                error: message.to_string(),
            }),
        )
            .into_response()
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        match self {
            UserError::NotFound => ErrorBody::response(StatusCode::NOT_FOUND, USER_NOT_FOUND),
            UserError::Validation(msg) => ErrorBody::response(StatusCode::BAD_REQUEST, msg),
            UserError::Conflict(kind) => ErrorBody::response(StatusCode::CONFLICT, kind.message()),
            UserError::PasswordHash(msg) => AppError::InternalServerError(msg).into_response(),
            UserError::Database(msg) => AppError::Database(msg).into_response(),
        }
    }
}
