//! Client error type

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The session token has expired; the user must log in again
    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    /// The typed name did not match the document being deleted
    #[error("Document name does not match")]
    ConfirmationMismatch,

    /// Non-2xx response from a service
    #[error("{message} ({status})")]
    Api {
        status: u16,
        kind: String,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ClientError {
    /// Server-side rejection of the bearer token
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::SessionExpired | ClientError::Api { status: 401, .. })
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
