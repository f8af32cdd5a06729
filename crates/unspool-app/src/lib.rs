#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls
)]
#![warn(
    missing_docs,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

//! unspool application wiring.
//!
//! Layout: `monitor.rs` (live folder watching), `batch.rs` (one-shot runs over
//! the folder's current contents), `bootstrap.rs` (daemon boot sequence).

/// One-shot batch runs.
pub mod batch;
/// Daemon bootstrap and environment loading.
pub mod bootstrap;
/// Application error type.
pub mod error;
/// Live folder monitoring.
pub mod monitor;

pub use batch::BatchJob;
pub use bootstrap::run_app;
pub use error::{AppError, AppResult};
pub use monitor::{Monitor, MonitorHandle};
