//! Error types for configuration operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required field was absent from the settings document.
    #[error("missing configuration field")]
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// File system operation failed.
    #[error("configuration io failure")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
}

impl ConfigError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(
        field: &'static str,
        reason: &'static str,
        value: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            field,
            reason,
            value: Some(value.into()),
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn config_error_helpers_build_variants() {
        let io_err = ConfigError::io("read", "unspool.conf", io::Error::other("io"));
        assert!(matches!(io_err, ConfigError::Io { .. }));
        assert!(io_err.source().is_some());

        let invalid = ConfigError::invalid("monitor_folder", "not_a_directory", "/tmp/x");
        assert!(matches!(
            invalid,
            ConfigError::InvalidField {
                field: "monitor_folder",
                reason: "not_a_directory",
                value: Some(_),
            }
        ));
        assert_eq!(invalid.to_string(), "invalid configuration field");
    }
}
