//! # Design
//!
//! - Provide structured, constant-message errors for the ingestion pipeline.
//! - Capture operation context (paths, entries, tools) so failures are reproducible in tests.
//! - Render the human-readable log line separately from the error message.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type for ingestion operations.
pub type IngestResult<T> = Result<T, IngestError>;

/// Errors produced while ingesting archives.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The archive could not be decoded.
    #[error("archive is corrupt or unreadable")]
    CorruptArchive {
        /// Archive that failed to decode.
        path: PathBuf,
        /// Decoder or tool diagnostic.
        detail: String,
    },
    /// The operating system refused access.
    #[error("permission denied")]
    PermissionDenied {
        /// Operation that was refused.
        operation: &'static str,
        /// Path involved in the refusal.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// The file extension does not map to a known archive codec.
    #[error("unsupported archive format")]
    UnsupportedFormat {
        /// Offending file.
        path: PathBuf,
        /// Lower-cased extension when present.
        extension: Option<String>,
    },
    /// The external unpack tool needed for a format is not installed.
    #[error("archive tool missing")]
    ToolMissing {
        /// Tool that could not be resolved.
        tool: &'static str,
        /// Installation guidance for the user.
        hint: &'static str,
    },
    /// A multi-volume archive is missing one of its volumes.
    #[error("multi-volume archive is incomplete")]
    IncompleteArchive {
        /// Volume that was handed to the codec.
        path: PathBuf,
        /// Tool diagnostic.
        detail: String,
    },
    /// The archive disappeared between discovery and processing.
    #[error("archive vanished before processing")]
    SourceVanished {
        /// Archive that is gone.
        path: PathBuf,
    },
    /// Copying a single file failed.
    #[error("file copy failed")]
    CopyFailure {
        /// File being copied.
        source_path: PathBuf,
        /// Intended destination.
        destination: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Removing a file or folder failed.
    #[error("delete failed")]
    DeleteFailure {
        /// Path that could not be removed.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// IO failures while interacting with the filesystem.
    #[error("ingest io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Walkdir traversal failures.
    #[error("ingest walkdir failure")]
    Walkdir {
        /// Operation that triggered the walkdir failure.
        operation: &'static str,
        /// Path involved in the walkdir failure.
        path: PathBuf,
        /// Underlying walkdir error.
        source: walkdir::Error,
    },
    /// An archive entry would escape the extraction root.
    #[error("unsafe archive entry")]
    UnsafeEntry {
        /// Archive containing the entry.
        path: PathBuf,
        /// Entry name as stored in the archive.
        entry: String,
        /// Static reason for the rejection.
        reason: &'static str,
    },
}

impl IngestError {
    /// Build an IO error, promoting permission failures to [`IngestError::PermissionDenied`].
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::PermissionDenied {
            return Self::PermissionDenied {
                operation,
                path,
                source,
            };
        }
        Self::Io {
            operation,
            path,
            source,
        }
    }

    pub(crate) fn walkdir(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: walkdir::Error,
    ) -> Self {
        Self::Walkdir {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn zip(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: zip::result::ZipError,
    ) -> Self {
        let path = path.into();
        match source {
            zip::result::ZipError::Io(io_err) => Self::io(operation, path, io_err),
            other => Self::CorruptArchive {
                path,
                detail: other.to_string(),
            },
        }
    }

    /// One human-readable line describing the failure.
    #[must_use]
    pub fn log_line(&self) -> String {
        match self {
            Self::CorruptArchive { path, detail } => format!(
                "Error: {} is not a valid archive or is corrupted ({detail})",
                display_name(path)
            ),
            Self::PermissionDenied {
                operation, path, ..
            } => format!(
                "Error: Permission denied accessing {} ({operation})",
                path.display()
            ),
            Self::UnsupportedFormat { path, extension } => format!(
                "Error: {} is not a supported archive ({})",
                display_name(path),
                extension.as_deref().unwrap_or("no extension")
            ),
            Self::ToolMissing { tool, hint } => {
                format!("Error: No working {tool} tool found. {hint}")
            }
            Self::IncompleteArchive { path, .. } => format!(
                "Error: {} is a multi-part archive with missing volumes. Please provide all parts.",
                display_name(path)
            ),
            Self::SourceVanished { path } => {
                format!("{} disappeared before it could be processed", display_name(path))
            }
            Self::CopyFailure {
                source_path,
                source,
                ..
            } => format!("Failed to copy {}: {source}", source_path.display()),
            Self::DeleteFailure { path, source } => {
                format!("Failed to delete {} ({source})", path.display())
            }
            Self::Io {
                operation,
                path,
                source,
            } => format!("Error: {operation} failed for {}: {source}", path.display()),
            Self::Walkdir { path, source, .. } => {
                format!("Error: could not traverse {}: {source}", path.display())
            }
            Self::UnsafeEntry {
                path,
                entry,
                reason,
            } => format!(
                "Error: {} contains unsafe entry '{entry}' ({reason})",
                display_name(path)
            ),
        }
    }
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::error::Error;

    #[test]
    fn io_helper_promotes_permission_errors() {
        let denied = IngestError::io(
            "open",
            "archive.zip",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        assert!(matches!(denied, IngestError::PermissionDenied { .. }));
        assert!(denied.source().is_some());

        let other = IngestError::io("open", "archive.zip", io::Error::other("boom"));
        assert!(matches!(other, IngestError::Io { .. }));
    }

    #[test]
    fn zip_helper_classifies_decode_errors() {
        let corrupt = IngestError::zip(
            "decode",
            "bad.zip",
            zip::result::ZipError::InvalidArchive("Invalid zip header"),
        );
        assert!(matches!(corrupt, IngestError::CorruptArchive { .. }));

        let io_err = IngestError::zip(
            "decode",
            "bad.zip",
            zip::result::ZipError::Io(io::Error::other("disk")),
        );
        assert!(matches!(io_err, IngestError::Io { .. }));
    }

    #[test]
    fn walkdir_helper_preserves_source() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let missing = temp.path().join("missing");
        let walk_error = walkdir::WalkDir::new(&missing)
            .into_iter()
            .next()
            .and_then(Result::err)
            .ok_or_else(|| anyhow::anyhow!("expected walkdir error"))?;
        let err = IngestError::walkdir("walk", &missing, walk_error);
        assert!(matches!(err, IngestError::Walkdir { .. }));
        assert!(err.source().is_some());
        Ok(())
    }

    #[test]
    fn log_line_names_the_archive() {
        let err = IngestError::IncompleteArchive {
            path: PathBuf::from("/downloads/set.part2.rar"),
            detail: String::new(),
        };
        assert!(err.log_line().contains("set.part2.rar"));
        assert!(err.log_line().contains("missing volumes"));
    }
}
