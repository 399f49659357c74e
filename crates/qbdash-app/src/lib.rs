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

//! Dashboard bootstrap wiring.
//!
//! Layout: `bootstrap.rs` (config, logging, pollers and the render loop),
//! `view.rs` (frame composition), `error.rs` (bootstrap errors).

/// Application bootstrap and environment loading.
pub mod bootstrap;
/// Bootstrap error type.
pub mod error;
/// Frame composition for the terminal output.
pub mod view;

pub use bootstrap::run_app;
pub use error::{AppError, AppResult};
