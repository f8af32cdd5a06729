//! # Design
//!
//! - Centralize application-level errors for bootstrap, monitoring, and batch runs.
//! - Keep error messages constant while carrying context fields for debugging.
//! - Preserve source errors without re-logging at call sites.

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use unspool_config::ConfigError;
use unspool_ingest::IngestError;

/// Result alias for application operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration operations failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: ConfigError,
    },
    /// The ingestion pipeline could not be set up.
    #[error("ingestion operation failed")]
    Ingest {
        /// Operation identifier.
        operation: &'static str,
        /// Source ingestion error.
        source: IngestError,
    },
    /// The filesystem watcher could not be created or attached.
    #[error("filesystem watch failed")]
    Watch {
        /// Operation identifier.
        operation: &'static str,
        /// Folder being watched.
        path: PathBuf,
        /// Source watcher error.
        source: notify::Error,
    },
    /// Telemetry operations failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Rendered failure detail.
        detail: String,
    },
    /// IO operations failed.
    #[error("io operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Optional path involved in the failure.
        path: Option<PathBuf>,
        /// Source IO error.
        source: io::Error,
    },
    /// A background worker panicked before returning its result.
    #[error("worker thread panicked")]
    WorkerPanicked {
        /// Name of the worker.
        worker: &'static str,
    },
}

impl AppError {
    pub(crate) const fn config(operation: &'static str, source: ConfigError) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn ingest(operation: &'static str, source: IngestError) -> Self {
        Self::Ingest { operation, source }
    }

    pub(crate) fn watch(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: notify::Error,
    ) -> Self {
        Self::Watch {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn telemetry(operation: &'static str, detail: impl Into<String>) -> Self {
        Self::Telemetry {
            operation,
            detail: detail.into(),
        }
    }

    pub(crate) const fn io(
        operation: &'static str,
        path: Option<PathBuf>,
        source: io::Error,
    ) -> Self {
        Self::Io {
            operation,
            path,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn app_error_helpers_build_variants() {
        let config = AppError::config(
            "config.read",
            ConfigError::MissingField {
                field: "monitor_folder",
            },
        );
        assert!(matches!(
            config,
            AppError::Config {
                operation: "config.read",
                ..
            }
        ));
        assert!(config.source().is_some());

        let ingest = AppError::ingest(
            "monitor.dispatcher",
            IngestError::SourceVanished {
                path: PathBuf::from("gone.zip"),
            },
        );
        assert!(matches!(ingest, AppError::Ingest { .. }));

        let watch = AppError::watch(
            "monitor.watch",
            "/missing",
            notify::Error::path_not_found(),
        );
        assert!(matches!(watch, AppError::Watch { ref path, .. } if path.ends_with("missing")));

        let telemetry = AppError::telemetry("telemetry.init", "already installed");
        assert_eq!(telemetry.to_string(), "telemetry operation failed");

        let io_err = AppError::io("signal.ctrl_c", None, io::Error::other("boom"));
        assert!(matches!(io_err, AppError::Io { path: None, .. }));
    }
}
