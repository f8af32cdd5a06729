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

//! Typed configuration for the unspool ingestion pipeline.
//!
//! Layout: `model.rs` (typed config models), `validate.rs` (parsing and
//! validation helpers), `loader.rs` (the persisted `key=value` settings file),
//! `defaults.rs` (timing and naming defaults).

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    ConfigDocument, parse_config_document, read_config_file, render_config_document,
    resolve_config_path, write_config_file,
};
pub use model::{CopyPolicy, ExtensionSet, IngestConfig, PriorityGroups, StabilitySettings};
