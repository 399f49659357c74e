//! Torrent snapshot as reported by the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Lifecycle state reported by the daemon, encoded on the wire as an integer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub enum TorrentState {
    /// The daemon hit an unrecoverable error for this torrent.
    Error,
    /// Every piece has been downloaded and the torrent is stopped.
    Completed,
    /// Stopped by the user.
    Paused,
    /// Waiting for a queue slot.
    Queued,
    /// Uploading to peers.
    Seeding,
    /// Active but no data is flowing.
    Stalled,
    /// Verifying existing data.
    Checking,
    /// Receiving data from peers.
    Downloading,
    /// Resolving metadata for a magnet link.
    FetchingMetadata,
    /// Reserving disk space.
    Allocating,
    /// Relocating data to a new save path.
    Moving,
    /// Any value the dashboard does not recognise.
    #[default]
    Unknown,
    /// Data files disappeared from disk.
    MissingFiles,
}

impl TorrentState {
    /// Human-readable label, e.g. `Fetching Metadata`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Completed => "Completed",
            Self::Paused => "Paused",
            Self::Queued => "Queued",
            Self::Seeding => "Seeding",
            Self::Stalled => "Stalled",
            Self::Checking => "Checking",
            Self::Downloading => "Downloading",
            Self::FetchingMetadata => "Fetching Metadata",
            Self::Allocating => "Allocating",
            Self::Moving => "Moving",
            Self::Unknown => "Unknown",
            Self::MissingFiles => "Missing Files",
        }
    }

    /// Paused-like states toggle to *resume* rather than *pause*.
    #[must_use]
    pub const fn is_paused_like(self) -> bool {
        matches!(self, Self::Paused | Self::Completed)
    }

    /// Mutating actions are unavailable while the torrent is broken.
    #[must_use]
    pub const fn actions_disabled(self) -> bool {
        matches!(self, Self::Error | Self::MissingFiles)
    }

    /// States highlighted as problematic in the torrent list.
    #[must_use]
    pub const fn is_errored_display(self) -> bool {
        matches!(
            self,
            Self::Error | Self::MissingFiles | Self::Paused | Self::Unknown
        )
    }
}

impl From<i64> for TorrentState {
    fn from(value: i64) -> Self {
        match value {
            0 => Self::Error,
            1 => Self::Completed,
            2 => Self::Paused,
            3 => Self::Queued,
            4 => Self::Seeding,
            5 => Self::Stalled,
            6 => Self::Checking,
            7 => Self::Downloading,
            8 => Self::FetchingMetadata,
            9 => Self::Allocating,
            10 => Self::Moving,
            12 => Self::MissingFiles,
            _ => Self::Unknown,
        }
    }
}

impl From<TorrentState> for u8 {
    fn from(value: TorrentState) -> Self {
        match value {
            TorrentState::Error => 0,
            TorrentState::Completed => 1,
            TorrentState::Paused => 2,
            TorrentState::Queued => 3,
            TorrentState::Seeding => 4,
            TorrentState::Stalled => 5,
            TorrentState::Checking => 6,
            TorrentState::Downloading => 7,
            TorrentState::FetchingMetadata => 8,
            TorrentState::Allocating => 9,
            TorrentState::Moving => 10,
            TorrentState::Unknown => 11,
            TorrentState::MissingFiles => 12,
        }
    }
}

/// Snapshot of a single torrent. The daemon owns the lifecycle; the dashboard
/// only mirrors whatever the latest poll returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Torrent {
    /// Info hash, unique per torrent.
    pub hash: String,
    /// Display name.
    pub name: String,
    /// Lifecycle state.
    pub state: TorrentState,
    /// Total payload size in bytes.
    pub size: u64,
    /// Bytes downloaded over the torrent's lifetime.
    pub bytes_downloaded: u64,
    /// Bytes downloaded in the current daemon session.
    pub bytes_downloaded_session: u64,
    /// Bytes uploaded over the torrent's lifetime.
    pub bytes_uploaded: u64,
    /// Bytes uploaded in the current daemon session.
    pub bytes_uploaded_session: u64,
    /// Completion ratio in `0.0..=1.0`.
    pub progress: f64,
    /// Queue position; `0` means the torrent is not queued. The daemon's
    /// negative "queueing disabled" marker decodes as `0`.
    #[serde(deserialize_with = "queue_position")]
    pub priority: u32,
    /// Directory the payload is stored in.
    pub save_path: String,
    /// Assigned category, empty when none.
    pub category: String,
    /// Assigned tags.
    pub tags: Vec<String>,
    /// Download cap in bytes per second; `<= 0` is unlimited.
    pub download_limit: i64,
    /// Upload cap in bytes per second; `<= 0` is unlimited.
    pub upload_limit: i64,
    /// Estimated seconds until completion.
    pub eta: i64,
    /// Whether the torrent bypasses the queue.
    pub force_start: bool,
    /// Magnet link for the torrent.
    pub magnet_uri: String,
    /// Current download rate in bytes per second.
    pub download_speed: u64,
    /// Average download rate in bytes per second.
    pub download_speed_avg: u64,
    /// Current upload rate in bytes per second.
    pub upload_speed: u64,
    /// Average upload rate in bytes per second.
    pub upload_speed_avg: u64,
    /// Seconds the torrent has been active.
    pub time_active: u64,
    /// When the torrent was added to the daemon.
    pub add_date: Option<DateTime<Utc>>,
    /// When the download finished.
    pub completion_date: Option<DateTime<Utc>>,
    /// Creation timestamp embedded in the metainfo.
    pub creation_date: Option<DateTime<Utc>>,
    /// Comment embedded in the metainfo.
    pub creator_comment: String,
    /// Tool that produced the metainfo.
    pub created_by: String,
    /// Open connections.
    pub connections: u32,
    /// Connection cap.
    pub connections_limit: i64,
    /// Connected peers.
    pub peers: u32,
    /// Peers known to the swarm.
    pub total_peers: u32,
    /// Connected seeds.
    pub seeds: u32,
    /// Seeds known to the swarm.
    pub total_seeds: u32,
    /// Pieces already verified.
    pub pieces_downloaded: u64,
    /// Pieces in the torrent; `0` until metadata is known.
    pub total_pieces: u64,
    /// Piece length in bytes.
    pub piece_size: u64,
}

impl Torrent {
    /// A torrent counts as completed once its state says so or once every byte
    /// of a known-size payload is on disk.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.state == TorrentState::Completed
            || (self.total_pieces > 0 && self.bytes_downloaded >= self.size)
    }

    /// Tags with empty entries removed.
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags
            .iter()
            .map(String::as_str)
            .filter(|tag| !tag.is_empty())
    }
}

fn queue_position<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = i64::deserialize(deserializer)?;
    Ok(u32::try_from(raw).unwrap_or(0))
}
