//! Ingestion dispatcher.
//!
//! # Design
//! - Live events and batch enumeration share [`Dispatcher::process_archive`].
//! - The dispatcher exclusively owns its processed set; it is never shared
//!   between workers, so each worker holds its own dispatcher.
//! - Phases run strictly in order: stabilise, extract, copy, clean up.
//!   Cancellation is checked between phases and inside the copy loops.

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};
use unspool_config::IngestConfig;

use crate::cancel::CancellationToken;
use crate::codec::{ArchiveFormat, CodecRegistry};
use crate::copy::{CopyEngine, CopyOutcome};
use crate::error::{IngestError, IngestResult, display_name};
use crate::extract::{ExtractionResult, Extractor};
use crate::sink::SharedSink;
use crate::stability::{Clock, StabilityDetector, SystemClock};

/// An archive sighted in the monitored folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveFile {
    /// Location on disk.
    pub path: PathBuf,
    /// Format detected from the extension.
    pub format: ArchiveFormat,
    /// When the archive was first seen.
    pub discovered_at: DateTime<Utc>,
}

impl ArchiveFile {
    /// Describe `path` if its extension is a supported archive format.
    #[must_use]
    pub fn detect(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let format = ArchiveFormat::from_path(&path)?;
        Some(Self {
            path,
            format,
            discovered_at: Utc::now(),
        })
    }

    /// Final path component, for progress lines.
    #[must_use]
    pub fn name(&self) -> String {
        display_name(&self.path)
    }
}

/// Filesystem notification relevant to ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A file appeared.
    Created(PathBuf),
    /// A file was renamed; only the destination matters.
    Renamed {
        /// Previous name when the event source reports it.
        from: Option<PathBuf>,
        /// New name.
        to: PathBuf,
    },
}

impl WatchEvent {
    /// Path the dispatcher should consider.
    #[must_use]
    pub fn target(&self) -> &Path {
        match self {
            Self::Created(path) | Self::Renamed { to: path, .. } => path,
        }
    }
}

/// What happened to one archive.
#[derive(Debug)]
pub enum ArchiveOutcome {
    /// Extracted and routed.
    Processed(ArchiveReport),
    /// Not an archive, a directory, or already handled.
    Ignored,
    /// Still growing when the stability window closed.
    Unstable,
    /// Gone before it could be opened.
    Vanished,
    /// Stopped by cancellation.
    Cancelled,
    /// Aborted by an archive-level error.
    Failed(IngestError),
}

/// Details of a processed archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Archive that was processed.
    pub archive: PathBuf,
    /// Where its content was extracted.
    pub extraction: ExtractionResult,
    /// Result of the copy phase.
    pub copy: CopyOutcome,
    /// The archive file was removed afterwards.
    pub archive_deleted: bool,
}

/// Totals for one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Archives found at the start of the run.
    pub found: usize,
    /// Archives extracted successfully.
    pub processed: usize,
    /// Archives aborted by an error.
    pub failed: usize,
    /// Archives skipped as vanished or already processed.
    pub skipped: usize,
    /// The run ended early on cancellation.
    pub cancelled: bool,
}

/// Drives archives through stabilisation, extraction, and copying.
pub struct Dispatcher {
    config: IngestConfig,
    extractor: Extractor,
    copier: CopyEngine,
    stability: StabilityDetector,
    clock: Arc<dyn Clock>,
    sink: SharedSink,
    processed: HashSet<PathBuf>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("monitor_folder", &self.config.monitor_folder)
            .field("destination_folder", &self.config.destination_folder)
            .field("processed", &self.processed.len())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Dispatcher for `config` with the default codecs and system clock.
    ///
    /// # Errors
    ///
    /// Returns an error when the destination folder cannot be created.
    pub fn new(config: IngestConfig, sink: SharedSink) -> IngestResult<Self> {
        fs::create_dir_all(&config.destination_folder).map_err(|source_err| {
            IngestError::io(
                "dispatcher.create_destination",
                &config.destination_folder,
                source_err,
            )
        })?;
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Ok(Self {
            extractor: Extractor::default(),
            copier: CopyEngine::new(&config.destination_folder, Arc::clone(&sink)),
            stability: StabilityDetector::new(Arc::clone(&clock), config.stability.interval),
            clock,
            sink,
            config,
            processed: HashSet::new(),
        })
    }

    /// Replace the codec registry.
    #[must_use]
    pub fn with_codecs(mut self, codecs: CodecRegistry) -> Self {
        self.extractor = Extractor::new(codecs);
        self
    }

    /// Replace the clock driving the stability gate and settle delay.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.stability = StabilityDetector::new(Arc::clone(&clock), self.config.stability.interval);
        self.clock = clock;
        self
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Whether `path` was already handled by this dispatcher.
    #[must_use]
    pub fn is_processed(&self, path: &Path) -> bool {
        self.processed.contains(path)
    }

    /// Number of archives handled so far.
    #[must_use]
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// React to a live filesystem event.
    ///
    /// Qualifying archives are gated on size stability and the settle delay,
    /// then processed synchronously on the calling thread.
    pub fn handle_event(&mut self, event: &WatchEvent) -> ArchiveOutcome {
        let path = event.target();
        if path.is_dir() || self.is_processed(path) {
            return ArchiveOutcome::Ignored;
        }
        let Some(archive) = ArchiveFile::detect(path) else {
            return ArchiveOutcome::Ignored;
        };
        debug!(archive = %archive.path.display(), event = ?event, "archive event");

        let stability = self.config.stability;
        if !self.stability.await_stable(&archive.path, stability.timeout) {
            if !archive.path.exists() {
                return ArchiveOutcome::Vanished;
            }
            self.sink.write_line(&format!(
                "{} is still changing after {}s; skipped.",
                archive.name(),
                stability.timeout.as_secs()
            ));
            return ArchiveOutcome::Unstable;
        }
        self.clock.sleep(stability.settle_delay);
        self.process_archive(&archive, &CancellationToken::new())
    }

    /// Extract one archive, route its files, and apply cleanup.
    #[instrument(
        name = "dispatcher.process_archive",
        skip(self, archive, token),
        fields(archive = %archive.path.display(), format = %archive.format)
    )]
    pub fn process_archive(
        &mut self,
        archive: &ArchiveFile,
        token: &CancellationToken,
    ) -> ArchiveOutcome {
        if token.is_cancelled() {
            return ArchiveOutcome::Cancelled;
        }
        if !archive.path.exists() {
            debug!("archive vanished before processing");
            return ArchiveOutcome::Vanished;
        }
        self.sink.write_line(&format!(
            "Found new {} file: {}",
            archive.format,
            archive.name()
        ));

        let monitor_folder = self.config.monitor_folder.clone();
        let extraction = match self.extractor.extract(&archive.path, &monitor_folder) {
            Ok(extraction) => extraction,
            Err(IngestError::SourceVanished { .. }) => return ArchiveOutcome::Vanished,
            Err(err) => {
                warn!(error = %err, "archive aborted");
                self.sink.write_line(&err.log_line());
                return ArchiveOutcome::Failed(err);
            }
        };
        let location = if extraction.was_monitored_folder {
            "monitored folder: "
        } else {
            ""
        };
        self.sink.write_line(&format!(
            "Successfully extracted to {location}{}",
            extraction.destination_folder.display()
        ));

        if token.is_cancelled() {
            self.sink
                .write_line(&format!("Stopped before copying {}.", archive.name()));
            return ArchiveOutcome::Cancelled;
        }
        let copy = self
            .copier
            .apply(&extraction.destination_folder, &self.config.policy, token);
        if copy.cancelled {
            return ArchiveOutcome::Cancelled;
        }

        self.processed.insert(archive.path.clone());
        let archive_deleted =
            self.config.policy.delete_archive_after_extract && self.delete_archive(archive);
        info!(
            destination = %extraction.destination_folder.display(),
            copied = copy.copied_any,
            cleaned_up = copy.cleaned_up,
            "archive processed"
        );

        ArchiveOutcome::Processed(ArchiveReport {
            archive: archive.path.clone(),
            extraction,
            copy,
            archive_deleted,
        })
    }

    /// Archives currently at the top level of the monitored folder, in
    /// directory-listing order.
    ///
    /// # Errors
    ///
    /// Returns an error when the monitored folder cannot be read.
    pub fn enumerate_archives(&self) -> IngestResult<Vec<ArchiveFile>> {
        let folder = &self.config.monitor_folder;
        let entries = fs::read_dir(folder)
            .map_err(|source_err| IngestError::io("dispatcher.enumerate", folder, source_err))?;
        let mut archives = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source_err| {
                IngestError::io("dispatcher.enumerate", folder, source_err)
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if let Some(archive) = ArchiveFile::detect(path) {
                archives.push(archive);
            }
        }
        Ok(archives)
    }

    /// Process every archive currently in the monitored folder.
    ///
    /// Archives are not gated on stability. The token is checked before each
    /// archive and between its phases.
    pub fn run_batch(&mut self, token: &CancellationToken) -> BatchSummary {
        let mut summary = BatchSummary::default();
        let archives = match self.enumerate_archives() {
            Ok(archives) => archives,
            Err(err) => {
                self.sink.write_line(&err.log_line());
                return summary;
            }
        };
        summary.found = archives.len();
        if archives.is_empty() {
            self.sink.write_line("No ZIP or RAR files found to extract.");
            return summary;
        }
        self.sink
            .write_line(&format!("Extracting {} archive(s)...", archives.len()));

        for archive in &archives {
            if token.is_cancelled() {
                summary.cancelled = true;
                break;
            }
            if self.is_processed(&archive.path) {
                summary.skipped += 1;
                continue;
            }
            match self.process_archive(archive, token) {
                ArchiveOutcome::Processed(_) => summary.processed += 1,
                ArchiveOutcome::Failed(_) => summary.failed += 1,
                ArchiveOutcome::Cancelled => {
                    summary.cancelled = true;
                    break;
                }
                ArchiveOutcome::Ignored
                | ArchiveOutcome::Unstable
                | ArchiveOutcome::Vanished => summary.skipped += 1,
            }
        }

        if summary.cancelled {
            self.sink.write_line("Extraction stopped by user.");
        } else {
            self.sink.write_line("Extraction of all archives complete.");
        }
        summary
    }

    fn delete_archive(&self, archive: &ArchiveFile) -> bool {
        if !archive.path.exists() {
            return false;
        }
        match fs::remove_file(&archive.path) {
            Ok(()) => {
                self.sink.write_line(&format!(
                    "Deleted {} file: {}",
                    archive.format,
                    archive.path.display()
                ));
                true
            }
            Err(source) => {
                let err = IngestError::DeleteFailure {
                    path: archive.path.clone(),
                    source,
                };
                self.sink.write_line(&err.log_line());
                false
            }
        }
    }
}
