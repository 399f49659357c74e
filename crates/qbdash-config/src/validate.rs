//! Parsing helpers for individual settings.

use std::time::Duration;

use url::Url;

use crate::defaults::MAX_PERIOD_MS;
use crate::error::{ConfigError, ConfigResult};
use crate::model::LogOutput;

pub(crate) fn parse_api_url(field: &'static str, raw: &str) -> ConfigResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|_| ConfigError::invalid(field, raw, "not a url"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(field, raw, "scheme must be http or https"));
    }
    if url.cannot_be_a_base() {
        return Err(ConfigError::invalid(field, raw, "url cannot be a base"));
    }
    Ok(url)
}

/// Ensure a single leading and trailing `/`.
pub(crate) fn normalize_base_path(field: &'static str, raw: &str) -> ConfigResult<String> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.contains(['?', '#']) {
        return Err(ConfigError::invalid(field, raw, "must be a plain path"));
    }
    if trimmed.is_empty() {
        return Ok("/".to_string());
    }
    Ok(format!("/{trimmed}/"))
}

pub(crate) fn parse_period(field: &'static str, raw: &str) -> ConfigResult<Duration> {
    let millis: u64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(field, raw, "must be an integer"))?;
    if millis == 0 || millis > MAX_PERIOD_MS {
        return Err(ConfigError::invalid(
            field,
            raw,
            "must be between 1 and 3600000",
        ));
    }
    Ok(Duration::from_millis(millis))
}

pub(crate) fn parse_log_level(field: &'static str, raw: &str) -> ConfigResult<String> {
    let level = raw.trim().to_ascii_lowercase();
    if matches!(
        level.as_str(),
        "trace" | "debug" | "info" | "warn" | "error" | "off"
    ) {
        Ok(level)
    } else {
        Err(ConfigError::invalid(field, raw, "unknown log level"))
    }
}

pub(crate) fn parse_log_output(field: &'static str, raw: &str) -> ConfigResult<LogOutput> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "json" => Ok(LogOutput::Json),
        "pretty" => Ok(LogOutput::Pretty),
        _ => Err(ConfigError::invalid(field, raw, "must be json or pretty")),
    }
}

pub(crate) fn parse_hash_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|hash| !hash.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn parse_link_list(field: &'static str, raw: &str) -> ConfigResult<Vec<String>> {
    raw.split_whitespace()
        .map(|link| {
            let scheme = link.split_once(':').map_or("", |(scheme, _)| scheme);
            if matches!(scheme.to_ascii_lowercase().as_str(), "magnet" | "http" | "https") {
                Ok(link.to_string())
            } else {
                Err(ConfigError::invalid(field, raw, "links must be magnet, http or https"))
            }
        })
        .collect()
}
