//! Environment-backed configuration loading.
//!
//! # Design
//! - Every value comes from a key lookup so tests never touch process env.
//! - Unset keys fall back to defaults; set-but-invalid keys are errors.

use tracing::debug;

use crate::defaults::{DEFAULT_API_URL, env};
use crate::error::ConfigResult;
use crate::model::DashboardConfig;
use crate::validate::{
    normalize_base_path, parse_api_url, parse_hash_list, parse_link_list, parse_log_level,
    parse_log_output, parse_period,
};

impl DashboardConfig {
    /// Load settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first variable that fails validation.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first variable that fails validation.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|raw| !raw.trim().is_empty());

        let api_url = parse_api_url(
            env::API_URL,
            value(env::API_URL).as_deref().unwrap_or(DEFAULT_API_URL),
        )?;
        let mut config = Self::with_api_url(api_url);

        if let Some(raw) = value(env::BASE_PATH) {
            config.base_path = normalize_base_path(env::BASE_PATH, &raw)?;
        }
        if let Some(raw) = value(env::TORRENTS_POLL_MS) {
            config.torrents_poll = parse_period(env::TORRENTS_POLL_MS, &raw)?;
        }
        if let Some(raw) = value(env::FILES_POLL_MS) {
            config.files_poll = parse_period(env::FILES_POLL_MS, &raw)?;
        }
        if let Some(raw) = value(env::HTTP_TIMEOUT_MS) {
            config.http_timeout = Some(parse_period(env::HTTP_TIMEOUT_MS, &raw)?);
        }
        if let Some(raw) = value(env::LOG_LEVEL) {
            config.log_level = parse_log_level(env::LOG_LEVEL, &raw)?;
        }
        if let Some(raw) = value(env::LOG_FORMAT) {
            config.log_output = Some(parse_log_output(env::LOG_FORMAT, &raw)?);
        }
        if let Some(raw) = value(env::EXPAND) {
            config.expand = parse_hash_list(&raw);
        }
        if let Some(raw) = value(env::ADD_LINKS) {
            config.add_links = parse_link_list(env::ADD_LINKS, &raw)?;
        }
        config.add_category = value(env::ADD_CATEGORY).map(|raw| raw.trim().to_string());

        debug!(
            api_url = %config.api_url,
            base_path = %config.base_path,
            torrents_poll = ?config.torrents_poll,
            files_poll = ?config.files_poll,
            "dashboard configuration loaded"
        );
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use crate::model::LogOutput;
    use std::collections::HashMap;
    use std::time::Duration;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = DashboardConfig::from_lookup(lookup(&[])).expect("defaults are valid");
        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:3000/");
        assert_eq!(config.base_path, "/api/qbittorrent/");
        assert_eq!(config.torrents_poll, Duration::from_millis(400));
        assert_eq!(config.files_poll, Duration::from_millis(1_100));
        assert_eq!(config.http_timeout, None);
        assert_eq!(config.log_output, None);
        assert_eq!(
            config.endpoint_base().as_str(),
            "http://127.0.0.1:3000/api/qbittorrent/"
        );
    }

    #[test]
    fn overrides_are_validated() {
        let config = DashboardConfig::from_lookup(lookup(&[
            ("QBDASH_API_URL", "https://nas.local:8443/ignored?x=1"),
            ("QBDASH_BASE_PATH", "qb"),
            ("QBDASH_TORRENTS_POLL_MS", "1000"),
            ("QBDASH_HTTP_TIMEOUT_MS", "5000"),
            ("QBDASH_LOG_FORMAT", "json"),
            ("QBDASH_EXPAND", "abc,DEF"),
            ("QBDASH_ADD_LINKS", "magnet:?xt=urn:btih:abc"),
            ("QBDASH_ADD_CATEGORY", " linux "),
        ]))
        .expect("overrides are valid");

        assert_eq!(config.endpoint_base().as_str(), "https://nas.local:8443/qb/");
        assert_eq!(config.torrents_poll, Duration::from_secs(1));
        assert_eq!(config.http_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.log_output, Some(LogOutput::Json));
        assert_eq!(config.expand, vec!["abc", "DEF"]);
        assert_eq!(config.add_links, vec!["magnet:?xt=urn:btih:abc"]);
        assert_eq!(config.add_category.as_deref(), Some("linux"));
    }

    #[test]
    fn invalid_values_name_the_variable() {
        let err = DashboardConfig::from_lookup(lookup(&[("QBDASH_FILES_POLL_MS", "-5")]))
            .expect_err("negative period rejected");
        assert_eq!(
            err,
            ConfigError::InvalidField {
                field: "QBDASH_FILES_POLL_MS",
                value: Some("-5".to_string()),
                reason: "must be an integer",
            }
        );
    }
}
