//! Error types for the dataset client
//!
//! Only transport-level faults are errors. Failures reported by the server
//! (validation, not-found, duplicate names) come back as
//! [`ApiResponse::Failure`](crate::ApiResponse::Failure) instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a success status but the body could not be
    /// decoded as a result envelope
    #[error("Malformed response (status {status}): {message}")]
    MalformedResponse { status: u16, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if the request timed out
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Network(e) if e.is_timeout())
    }

    /// Check if the connection to the server could not be established
    pub fn is_connect(&self) -> bool {
        matches!(self, Error::Network(e) if e.is_connect())
    }
}
