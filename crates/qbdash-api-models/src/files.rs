//! Per-torrent file entries.

use serde::{Deserialize, Serialize};

/// Download priority of a file, encoded on the wire as an integer.
///
/// `Mixed` never comes from the daemon; it is derived for directories whose
/// children disagree and must not be sent back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub enum FilePriority {
    /// The file is excluded from the download.
    SkipDownload,
    /// Default priority.
    #[default]
    Normal,
    /// Children of a directory disagree.
    Mixed,
    /// Preferred over normal files.
    High,
    /// Highest priority.
    Maximum,
}

impl FilePriority {
    /// Priorities a user may pick from the context menu.
    pub const SELECTABLE: [Self; 4] = [Self::SkipDownload, Self::Normal, Self::High, Self::Maximum];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SkipDownload => "Skip Download",
            Self::Normal => "Normal",
            Self::Mixed => "Mixed",
            Self::High => "High",
            Self::Maximum => "Maximum",
        }
    }
}

impl From<i64> for FilePriority {
    fn from(value: i64) -> Self {
        match value {
            0 => Self::SkipDownload,
            3 => Self::Mixed,
            6 => Self::High,
            7 => Self::Maximum,
            _ => Self::Normal,
        }
    }
}

impl From<FilePriority> for u8 {
    fn from(value: FilePriority) -> Self {
        match value {
            FilePriority::SkipDownload => 0,
            FilePriority::Normal => 1,
            FilePriority::Mixed => 3,
            FilePriority::High => 6,
            FilePriority::Maximum => 7,
        }
    }
}

/// A file inside a torrent. `name` is a relative path using `/` or `\`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TorrentFile {
    /// Relative path of the file inside the torrent.
    pub name: String,
    /// Download priority.
    pub priority: FilePriority,
    /// Completion ratio in `0.0..=1.0`.
    pub progress: f64,
    /// Size in bytes.
    pub size: u64,
    /// Share of the file available in the swarm; negative when unknown.
    pub availability: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn file_priority_uses_daemon_numbers() {
        let file: TorrentFile = serde_json::from_value(json!({
            "name": "dir/file.bin",
            "priority": 6,
            "progress": 0.25,
            "size": 10,
            "availability": -1.0
        }))
        .expect("file decodes");
        assert_eq!(file.priority, FilePriority::High);
        assert!(file.availability < 0.0);

        assert_eq!(
            serde_json::to_value(FilePriority::Maximum).expect("priority encodes"),
            json!(7)
        );
        assert_eq!(FilePriority::from(4), FilePriority::Normal);
    }

    #[test]
    fn out_of_range_priorities_decode_as_normal() {
        let files: Vec<TorrentFile> = serde_json::from_value(json!([
            {"name": "a", "priority": 7},
            {"name": "b", "priority": -1},
            {"name": "c", "priority": 1024}
        ]))
        .expect("list decodes");

        let priorities: Vec<FilePriority> = files.iter().map(|file| file.priority).collect();
        assert_eq!(
            priorities,
            vec![FilePriority::Maximum, FilePriority::Normal, FilePriority::Normal]
        );
    }
}
