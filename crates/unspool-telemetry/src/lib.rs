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

//! Logging primitives shared across the unspool workspace.
//!
//! Layout: `init.rs` (subscriber installation and formats), `context.rs`
//! (process-level span guard).

pub mod context;
pub mod init;

pub use context::GlobalContextGuard;
pub use init::{
    DEFAULT_LOG_LEVEL, LOG_FORMAT_ENV, LogFormat, LoggingConfig, build_sha, init_logging,
    log_format_from_env,
};
