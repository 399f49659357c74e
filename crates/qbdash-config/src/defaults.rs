//! Default values for dashboard settings.

/// Backend origin used when `QBDASH_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
/// Path under which the backend mounts the daemon API.
pub const DEFAULT_BASE_PATH: &str = "/api/qbittorrent/";
/// Torrent list refresh period.
pub const DEFAULT_TORRENTS_POLL_MS: u64 = 400;
/// File list refresh period for an expanded torrent.
pub const DEFAULT_FILES_POLL_MS: u64 = 1_100;
/// Log level used when neither `RUST_LOG` nor `QBDASH_LOG_LEVEL` is set.
pub const DEFAULT_LOG_LEVEL: &str = "info";
/// Upper bound for any configured period, one hour.
pub const MAX_PERIOD_MS: u64 = 3_600_000;

/// Environment variable names.
pub mod env {
    /// Backend origin.
    pub const API_URL: &str = "QBDASH_API_URL";
    /// Backend mount path.
    pub const BASE_PATH: &str = "QBDASH_BASE_PATH";
    /// Torrent list poll period in milliseconds.
    pub const TORRENTS_POLL_MS: &str = "QBDASH_TORRENTS_POLL_MS";
    /// File list poll period in milliseconds.
    pub const FILES_POLL_MS: &str = "QBDASH_FILES_POLL_MS";
    /// Optional request timeout in milliseconds.
    pub const HTTP_TIMEOUT_MS: &str = "QBDASH_HTTP_TIMEOUT_MS";
    /// Log level.
    pub const LOG_LEVEL: &str = "QBDASH_LOG_LEVEL";
    /// Log output format.
    pub const LOG_FORMAT: &str = "QBDASH_LOG_FORMAT";
    /// Comma-separated hashes expanded at startup.
    pub const EXPAND: &str = "QBDASH_EXPAND";
    /// Whitespace-separated magnet or HTTP links added at startup.
    pub const ADD_LINKS: &str = "QBDASH_ADD_LINKS";
    /// Category for links added at startup; setting it enables automatic
    /// save-path management.
    pub const ADD_CATEGORY: &str = "QBDASH_ADD_CATEGORY";
}
