//! Error types for the API client boundary.
//!
//! # Design
//! Callers need to tell three situations apart: the request never left the
//! process because it violated the contract, the server could not be reached,
//! and the server answered with something unexpected. Each gets its own
//! variant family so page loaders can branch without string matching.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors returned by `ApiClient`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A path placeholder or required query parameter was not supplied.
    #[error("{operation}: missing required parameter `{name}`")]
    MissingParameter {
        operation: &'static str,
        name: String,
    },

    /// The operation requires a request body and none was given.
    #[error("{operation}: missing required request body")]
    MissingBody { operation: &'static str },

    /// Parameters or body could not be encoded.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// DNS, connect, timeout or an unusable target URL.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server returned a non-2xx status.
    #[error("HTTP {status}")]
    Status { status: u16, body: Option<String> },

    /// A 2xx body did not match the declared response shape.
    #[error("response from HTTP {status} did not match the contract: {message}")]
    Decode { status: u16, message: String },
}

impl ApiError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } | ApiError::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status: 404, .. })
    }

    /// True for errors raised before any I/O was attempted.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            ApiError::MissingParameter { .. } | ApiError::MissingBody { .. } | ApiError::Serialization(_)
        )
    }

    /// Decode a non-2xx response body as the contract's problem type.
    pub fn problem<T: DeserializeOwned>(&self) -> Option<T> {
        match self {
            ApiError::Status { body: Some(body), .. } => serde_json::from_str(body).ok(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}
