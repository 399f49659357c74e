//! Request bodies for the mutating endpoints.

use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};

use crate::FilePriority;

/// Body for `torrent/{hash}/delete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRequest {
    /// Remove downloaded data alongside the torrent.
    pub delete_files: bool,
}

/// Body for `torrent/{hash}/setSavePath`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePathRequest {
    /// New save path.
    pub save_path: String,
}

/// Body for `torrent/{hash}/setName`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameRequest {
    /// New display name.
    pub name: String,
}

/// Body for `setDownloadLimit` and `setUploadLimit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitRequest {
    /// Cap in bytes per second; `<= 0` removes the cap.
    pub limit: i64,
}

/// Body for `addTags` and `removeTags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagsRequest {
    /// Tags to add or remove.
    pub tags: Vec<String>,
}

/// Body for `setCategory`; an empty string clears the category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRequest {
    /// Category name.
    pub category: String,
}

/// Body for `setFilesPriority`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesPriorityRequest {
    /// Indices into the torrent's file list.
    pub ids: Vec<usize>,
    /// Priority to apply.
    pub priority: FilePriority,
}

/// Body for `renameFile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenameFileRequest {
    /// Index into the torrent's file list.
    pub id: usize,
    /// New relative path.
    pub name: String,
}

/// A `.torrent` file picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentUpload {
    /// File name shown to the user.
    pub name: String,
    /// Raw metainfo bytes.
    pub contents: Vec<u8>,
}

impl TorrentUpload {
    /// `[name, base64]` pair as carried by `torrents/add`.
    #[must_use]
    pub fn encoded(&self) -> (String, String) {
        (
            self.name.clone(),
            general_purpose::STANDARD.encode(&self.contents),
        )
    }
}

/// Body for `torrents/add`.
///
/// Optional keys are omitted rather than sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTorrentsRequest {
    /// Uploaded metainfo files as `[name, base64]` pairs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<(String, String)>>,
    /// Magnet or HTTP links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<String>>,
    /// Cookie forwarded when fetching HTTP links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_cookie: Option<String>,
    /// Category assigned to the new torrents.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Manual save path, present only when not auto-managed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub save_path: Option<String>,
    /// Name override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub torrent_name: Option<String>,
    /// Download cap in bytes per second.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_limit: Option<i64>,
    /// Upload cap in bytes per second.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_limit: Option<i64>,
    /// Let the daemon pick the save path from the category.
    pub auto_manage: bool,
    /// Start immediately instead of paused.
    pub start_torrent: bool,
    /// Skip verifying existing data.
    pub skip_hash_check: bool,
    /// Create a subfolder for multi-file torrents.
    pub create_subfolder: bool,
    /// Download pieces in order.
    pub download_seq_order: bool,
    /// Fetch first and last pieces early.
    pub download_edge_first: bool,
}
