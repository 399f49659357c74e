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

//! Dashboard configuration loaded from `QBDASH_*` environment variables.
//!
//! Layout: `defaults.rs` (constants and variable names), `model.rs` (typed
//! settings), `loader.rs` (environment loading), `validate.rs` (per-field
//! parsing), `error.rs` (error type).

pub mod defaults;
pub mod error;
mod loader;
pub mod model;
mod validate;

pub use error::{ConfigError, ConfigResult};
pub use model::{DashboardConfig, LogOutput};
