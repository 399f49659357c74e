//! Application-wide snapshots: preferences and categories.

use serde::{Deserialize, Serialize};

/// Daemon preferences the dashboard reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    /// Default save path, normally ending with a path separator.
    pub save_path: String,
    /// Whether new torrents start paused.
    pub start_paused_enabled: bool,
    /// Whether multi-file torrents get their own subfolder.
    pub create_subfolder_enabled: bool,
}

/// A torrent category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Category {
    /// Category name.
    pub name: String,
    /// Explicit save path; empty means "derived from the default save path".
    pub save_path: String,
}
