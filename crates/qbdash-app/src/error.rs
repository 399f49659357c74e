//! # Design
//!
//! - Centralize errors that abort startup.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use std::io;

use thiserror::Error;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: qbdash_config::ConfigError,
    },
    /// Logging could not be installed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source telemetry error.
        source: qbdash_telemetry::TelemetryError,
    },
    /// The backend client could not be constructed.
    #[error("client operation failed")]
    Client {
        /// Operation identifier.
        operation: &'static str,
        /// Source client error.
        source: qbdash_client::ClientError,
    },
    /// Terminal output or signal handling failed.
    #[error("io operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Source IO error.
        source: io::Error,
    },
}

impl AppError {
    pub(crate) const fn config(
        operation: &'static str,
        source: qbdash_config::ConfigError,
    ) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn telemetry(
        operation: &'static str,
        source: qbdash_telemetry::TelemetryError,
    ) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn client(
        operation: &'static str,
        source: qbdash_client::ClientError,
    ) -> Self {
        Self::Client { operation, source }
    }

    pub(crate) const fn io(operation: &'static str, source: io::Error) -> Self {
        Self::Io { operation, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qbdash_config::DashboardConfig;

    #[test]
    fn helpers_build_variants() {
        let Err(config) = DashboardConfig::from_lookup(|key| {
            (key == "QBDASH_TORRENTS_POLL_MS").then(|| "0".to_string())
        }) else {
            panic!("zero period should be rejected");
        };
        let err = AppError::config("config.load", config);
        assert!(matches!(
            err,
            AppError::Config {
                operation: "config.load",
                ..
            }
        ));
        assert_eq!(err.to_string(), "configuration operation failed");

        let io = AppError::io("stdout.write", io::Error::other("closed"));
        assert!(matches!(io, AppError::Io { .. }));
        assert!(std::error::Error::source(&io).is_some());
    }
}
