//! Error types for dashboard state helpers.

use thiserror::Error;

/// Result alias for core helpers.
pub type CoreResult<T> = Result<T, CoreError>;

/// Input rejected before anything is sent to the daemon.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// `Mixed` is derived for directories and cannot be applied to files.
    #[error("mixed priority cannot be applied")]
    MixedPriority,
    /// The speed limit did not fit the wire type.
    #[error("invalid speed limit")]
    InvalidSpeedLimit {
        /// Raw user input.
        value: String,
    },
    /// The add-torrents form is missing required input.
    #[error("add torrents form is incomplete")]
    IncompleteAddForm {
        /// Machine-readable reason for the failure.
        reason: &'static str,
    },
}
