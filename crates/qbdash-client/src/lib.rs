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
#![allow(clippy::module_name_repetitions)]

//! Everything that talks to the backend: the HTTP client, the action
//! dispatchers and the pollers that keep the store fresh.
//!
//! Layout:
//! - `api.rs`: query and command traits plus the reqwest implementation
//! - `actions.rs`: user intents mapped to commands and UI events
//! - `poll.rs`: sequenced refresh loops and per-torrent file watchers
//! - `error.rs`: client error taxonomy

pub mod actions;
pub mod api;
pub mod error;
pub mod poll;

pub use actions::{ActionDispatcher, ActionOutcome, QueueMove};
pub use api::{ApiClient, DashboardCommands, DashboardQueries, LimitDirection, TorrentCommand};
pub use error::{ClientError, ClientResult};
pub use poll::{FileWatchers, PollHandle, Poller, SharedStore};
