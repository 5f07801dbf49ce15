//! Result envelope returned by every dataset operation
//!
//! The server wraps each payload as `{"code": 200, "message": "...", "data": ...}`.
//! A `code` of 200 on a 2xx status is a success; anything else is reported as
//! an [`ApiFailure`] rather than an error, so callers can tell "the server said
//! no" apart from "the server could not be reached".

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::error::{Error, Result};

/// Envelope code the server uses for success
pub const SUCCESS_CODE: i64 = 200;

/// Outcome of a request the server answered
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse<T> {
    Success {
        code: i64,
        message: String,
        data: T,
    },
    Failure(ApiFailure),
}

/// Application-level failure reported by the server
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("API failure (status {status}, code {code}): {message}")]
pub struct ApiFailure {
    /// HTTP status of the response
    pub status: u16,
    /// Envelope code, or the HTTP status when the body carried none
    pub code: i64,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    /// Borrow the payload of a successful response
    pub fn data(&self) -> Option<&T> {
        match self {
            ApiResponse::Success { data, .. } => Some(data),
            ApiResponse::Failure(_) => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            ApiResponse::Success { data, .. } => Some(data),
            ApiResponse::Failure(_) => None,
        }
    }

    /// Borrow the failure details of an unsuccessful response
    pub fn failure(&self) -> Option<&ApiFailure> {
        match self {
            ApiResponse::Success { .. } => None,
            ApiResponse::Failure(failure) => Some(failure),
        }
    }

    /// Convert into a standard `Result`, so callers can use `?`
    pub fn into_result(self) -> std::result::Result<T, ApiFailure> {
        match self {
            ApiResponse::Success { data, .. } => Ok(data),
            ApiResponse::Failure(failure) => Err(failure),
        }
    }

    /// Transform the payload of a successful response
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        match self {
            ApiResponse::Success {
                code,
                message,
                data,
            } => ApiResponse::Success {
                code,
                message,
                data: f(data),
            },
            ApiResponse::Failure(failure) => ApiResponse::Failure(failure),
        }
    }
}

impl ApiFailure {
    /// Build a failure from a response whose body was not an envelope
    pub(crate) fn from_status(status: StatusCode, body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body).trim().to_string();
        let message = if text.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        } else {
            text
        };

        Self {
            status: status.as_u16(),
            code: i64::from(status.as_u16()),
            message,
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Value,
}

/// Extract the failure carried by a response, if it is one
///
/// Any non-2xx status is a failure, with or without an envelope. A 2xx status
/// is a failure only when its body is an envelope with a non-success code.
pub(crate) fn failure(status: StatusCode, body: &[u8]) -> Option<ApiFailure> {
    match serde_json::from_slice::<Envelope>(body) {
        Ok(envelope) if !status.is_success() || envelope.code != SUCCESS_CODE => Some(ApiFailure {
            status: status.as_u16(),
            code: envelope.code,
            message: envelope.message.unwrap_or_default(),
        }),
        Ok(_) => None,
        Err(_) if status.is_success() => None,
        Err(_) => Some(ApiFailure::from_status(status, body)),
    }
}

/// Decode a JSON response body into an [`ApiResponse`]
pub(crate) fn decode<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<ApiResponse<T>> {
    if let Some(failure) = failure(status, body) {
        return Ok(ApiResponse::Failure(failure));
    }

    let envelope: Envelope = serde_json::from_slice(body).map_err(|e| Error::MalformedResponse {
        status: status.as_u16(),
        message: e.to_string(),
    })?;

    let data = serde_json::from_value(envelope.data).map_err(|e| Error::MalformedResponse {
        status: status.as_u16(),
        message: format!("unexpected payload: {}", e),
    })?;

    Ok(ApiResponse::Success {
        code: envelope.code,
        message: envelope.message.unwrap_or_default(),
        data,
    })
}
