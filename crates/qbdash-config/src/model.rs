//! Typed dashboard settings.

use std::time::Duration;

use url::Url;

use crate::defaults::{
    DEFAULT_BASE_PATH, DEFAULT_FILES_POLL_MS, DEFAULT_LOG_LEVEL, DEFAULT_TORRENTS_POLL_MS,
};

/// Log output selected through configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    /// Structured JSON lines.
    Json,
    /// Human-readable lines.
    Pretty,
}

/// Validated dashboard settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Backend origin, e.g. `http://127.0.0.1:3000`.
    pub api_url: Url,
    /// Mount path of the daemon API with leading and trailing `/`.
    pub base_path: String,
    /// Torrent list refresh period.
    pub torrents_poll: Duration,
    /// File list refresh period for expanded torrents.
    pub files_poll: Duration,
    /// Request timeout; `None` leaves requests unbounded.
    pub http_timeout: Option<Duration>,
    /// Log level passed to the subscriber when `RUST_LOG` is unset.
    pub log_level: String,
    /// Log output; `None` lets the build profile decide.
    pub log_output: Option<LogOutput>,
    /// Torrents whose files are polled from startup, as typed; matched
    /// against listed hashes without regard to case.
    pub expand: Vec<String>,
    /// Links submitted once the preferences are known.
    pub add_links: Vec<String>,
    /// Category for `add_links`; `Some` lets the daemon pick the save path.
    pub add_category: Option<String>,
}

impl DashboardConfig {
    /// Settings with every default applied for the given origin.
    #[must_use]
    pub fn with_api_url(api_url: Url) -> Self {
        Self {
            api_url,
            base_path: DEFAULT_BASE_PATH.to_string(),
            torrents_poll: Duration::from_millis(DEFAULT_TORRENTS_POLL_MS),
            files_poll: Duration::from_millis(DEFAULT_FILES_POLL_MS),
            http_timeout: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            log_output: None,
            expand: Vec::new(),
            add_links: Vec::new(),
            add_category: None,
        }
    }

    /// Absolute URL every endpoint path is joined onto.
    ///
    /// The origin's own path is replaced by `base_path`.
    #[must_use]
    pub fn endpoint_base(&self) -> Url {
        let mut base = self.api_url.clone();
        base.set_path(&self.base_path);
        base.set_query(None);
        base.set_fragment(None);
        base
    }
}
