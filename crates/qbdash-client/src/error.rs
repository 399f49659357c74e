//! # Design
//!
//! - Keep error messages constant while carrying context fields for debugging.
//! - Transport, status and decode failures stay distinct so callers can tell a
//!   down daemon from a rejected request.

use qbdash_core::CoreError;
use thiserror::Error;

/// Result alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors raised while talking to the backend.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP client could not be constructed.
    #[error("failed to build http client")]
    Build {
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// The request id contained characters not allowed in a header.
    #[error("invalid request id header")]
    RequestId {
        /// Offending value.
        value: String,
    },
    /// An endpoint could not be joined onto the base URL.
    #[error("invalid endpoint url")]
    Url {
        /// Endpoint path relative to the base.
        endpoint: String,
        /// Underlying parse error.
        source: url::ParseError,
    },
    /// The request never produced a response (connection, timeout, body read).
    #[error("request failed")]
    Transport {
        /// Endpoint path relative to the base.
        endpoint: String,
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
    /// The backend answered with a non-success status.
    #[error("unexpected response status")]
    Status {
        /// Endpoint path relative to the base.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Trimmed response body, possibly empty.
        body: String,
    },
    /// The response body did not match the expected shape.
    #[error("failed to decode response")]
    Decode {
        /// Endpoint path relative to the base.
        endpoint: String,
        /// Underlying serde error.
        source: serde_json::Error,
    },
    /// Input was rejected before any request was sent.
    #[error("request rejected before sending")]
    Validation {
        /// Operation identifier.
        operation: &'static str,
        /// Validation failure.
        source: CoreError,
    },
}

impl ClientError {
    pub(crate) const fn validation(operation: &'static str, source: CoreError) -> Self {
        Self::Validation { operation, source }
    }

    /// HTTP status when the backend answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
