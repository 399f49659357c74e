#![forbid(unsafe_code)]
#![deny(
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Wire DTOs for the dashboard backend mounted under `/api/qbittorrent/`.
//!
//! Every payload uses camelCase keys. Numeric enums (`TorrentState`,
//! `FilePriority`) travel as plain integers and are decoded leniently so an
//! unexpected value from a newer daemon never fails a whole snapshot.
//!
//! Layout:
//! - `torrent.rs`: torrent snapshot and lifecycle state
//! - `files.rs`: per-torrent file entries and download priorities
//! - `app.rs`: preferences and categories
//! - `requests.rs`: bodies for mutating POST endpoints

mod app;
mod files;
mod requests;
mod torrent;

pub use app::{Category, Preferences};
pub use files::{FilePriority, TorrentFile};
pub use requests::{
    AddTorrentsRequest, CategoryRequest, DeleteRequest, FilesPriorityRequest, LimitRequest,
    NameRequest, RenameFileRequest, SavePathRequest, TagsRequest, TorrentUpload,
};
pub use torrent::{Torrent, TorrentState};
