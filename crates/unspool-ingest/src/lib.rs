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

//! Archive ingestion and selective-copy pipeline.
//!
//! Archives sighted in a monitored folder are gated on download stability,
//! extracted next to themselves without ever overwriting, and routed into a
//! destination folder by extension filter, priority groups, or as a whole
//! folder. Long-running work observes a [`CancellationToken`].

pub mod cancel;
pub mod codec;
pub mod copy;
pub mod dispatcher;
pub mod error;
pub mod extract;
pub mod layout;
pub mod naming;
pub mod sink;
pub mod stability;

pub use cancel::CancellationToken;
pub use codec::{ArchiveCodec, ArchiveFormat, CodecRegistry, RarCodec, ZipCodec};
pub use copy::{CopyEngine, CopyOutcome, CopyReport};
pub use dispatcher::{
    ArchiveFile, ArchiveOutcome, ArchiveReport, BatchSummary, Dispatcher, WatchEvent,
};
pub use error::{IngestError, IngestResult};
pub use extract::{ExtractionResult, Extractor};
pub use layout::{ArchiveLayout, analyze};
pub use naming::unique_path;
pub use sink::{LogSink, MemorySink, SharedSink, TracingSink};
pub use stability::{Clock, StabilityDetector, SystemClock};
