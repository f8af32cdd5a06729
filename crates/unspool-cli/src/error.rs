//! CLI error classification.

use unspool_config::ConfigError;

pub(crate) type CliResult<T> = Result<T, CliError>;

/// Errors surfaced to the terminal; validation problems exit with 2, runtime
/// failures with 3.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(error: ConfigError) -> Self {
        match error {
            ConfigError::MissingField { field } => {
                Self::validation(format!("settings are missing `{field}`"))
            }
            ConfigError::InvalidField {
                field,
                reason,
                value: Some(value),
            } => Self::validation(format!("invalid `{field}` ({reason}): {value}")),
            ConfigError::InvalidField {
                field,
                reason,
                value: None,
            } => Self::validation(format!("invalid `{field}` ({reason})")),
            other @ ConfigError::Io { .. } => Self::failure(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;

    #[test]
    fn exit_codes_follow_classification() {
        assert_eq!(CliError::validation("bad").exit_code(), 2);
        assert_eq!(
            CliError::failure(anyhow::anyhow!("boom")).exit_code(),
            3
        );
    }

    #[test]
    fn failure_messages_include_the_cause_chain() {
        let error = CliError::failure(
            anyhow::Error::new(io::Error::other("disk full")).context("write settings"),
        );
        assert_eq!(error.display_message(), "write settings: disk full");
    }

    #[test]
    fn config_errors_map_to_exit_classes() {
        let missing = CliError::from(ConfigError::MissingField {
            field: "dest_folder",
        });
        assert_eq!(missing.exit_code(), 2);
        assert_eq!(missing.display_message(), "settings are missing `dest_folder`");

        let invalid = CliError::from(ConfigError::InvalidField {
            field: "monitor_folder",
            reason: "not_found",
            value: Some("/nope".to_string()),
        });
        assert_eq!(
            invalid.display_message(),
            "invalid `monitor_folder` (not_found): /nope"
        );

        let io_error = CliError::from(ConfigError::Io {
            operation: "read_config_file",
            path: PathBuf::from("unspool.conf"),
            source: io::Error::other("denied"),
        });
        assert_eq!(io_error.exit_code(), 3);
    }
}
