//! Error types shared by every service
//!
//! `DatabaseError` covers pool start-up and migrations. `AppError` is the
//! single request-level taxonomy: every handler returns it and the
//! `IntoResponse` impl below is the only place errors become HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error;
use tracing::error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database query execution
    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(String),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Machine-readable tag sent with every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    DuplicateUsername,
    DuplicateEmail,
    InvalidCredentials,
    NotFound,
    Unauthorized,
    TooManyRequests,
    ConversionFailure,
    ServerError,
}

/// Request-level error
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    #[error("Username already taken")]
    DuplicateUsername,

    #[error("Email already registered")]
    DuplicateEmail,

    /// Same message for unknown email and wrong password
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Too many attempts, try again later")]
    TooManyRequests,

    /// External converter failed; the detail is logged, never returned
    #[error("Conversion failed: {0}")]
    Conversion(String),

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::DuplicateUsername => ErrorKind::DuplicateUsername,
            AppError::DuplicateEmail => ErrorKind::DuplicateEmail,
            AppError::InvalidCredentials => ErrorKind::InvalidCredentials,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Unauthorized => ErrorKind::Unauthorized,
            AppError::TooManyRequests => ErrorKind::TooManyRequests,
            AppError::Conversion(_) => ErrorKind::ConversionFailure,
            AppError::Database(_) | AppError::Internal(_) => ErrorKind::ServerError,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation
            | ErrorKind::DuplicateUsername
            | ErrorKind::DuplicateEmail
            | ErrorKind::InvalidCredentials => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorKind::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::ConversionFailure | ErrorKind::ServerError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to the caller
    pub fn public_message(&self) -> String {
        match self {
            AppError::Conversion(_) => "Conversion failed".to_string(),
            AppError::Database(_) | AppError::Internal(_) => "Server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// JSON body of every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = ErrorBody {
            kind: self.kind(),
            message: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for handler results
pub type AppResult<T> = Result<T, AppError>;
