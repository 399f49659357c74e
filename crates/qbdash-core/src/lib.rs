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

//! Pure dashboard state: everything here is synchronous and testable without
//! a daemon.
//!
//! Layout:
//! - `contents.rs`: contents tree built from a torrent's flat file list
//! - `selection.rs`: tri-state file selection and context-menu targets
//! - `list.rs`: torrent list ordering
//! - `store.rs`: sequenced view-state store
//! - `logic.rs`: helpers turning user input into request parameters
//! - `add.rs`: add-torrents form
//! - `format.rs` / `render.rs`: text output
//! - `error.rs`: validation errors

pub mod add;
pub mod contents;
pub mod error;
pub mod format;
pub mod list;
pub mod logic;
pub mod render;
pub mod selection;
pub mod store;

pub use add::AddTorrentsForm;
pub use contents::{ContentsNode, ContentsTree, DirectoryNode, FileNode, ItemPath};
pub use error::{CoreError, CoreResult};
pub use selection::{ContextMenu, FileSelection, SelectionMap, SelectionView, action_targets};
pub use store::{ApplyOutcome, DashboardStore, Sequence, SequenceCounter, Sequenced};
