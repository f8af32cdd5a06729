//! Validation helpers and parsing utilities for configuration documents.

use std::path::Path;

use crate::error::{ConfigError, ConfigResult};

/// Normalise a user-supplied extension: trimmed, leading dots stripped,
/// lower-cased. Returns `None` when nothing remains.
#[must_use]
pub fn normalize_extension(raw: &str) -> Option<String> {
    let cleaned = raw.trim().trim_start_matches('.').trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_lowercase())
    }
}

/// Lower-cased extension of the final path component, without the dot.
#[must_use]
pub fn path_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(str::to_lowercase)
}

/// Interpret a persisted boolean. Only `true` (any case) is truthy.
#[must_use]
pub fn parse_bool(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

pub(crate) fn require_non_empty(field: &'static str, path: &Path) -> ConfigResult<()> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::MissingField { field });
    }
    Ok(())
}

pub(crate) fn require_directory(field: &'static str, path: &Path) -> ConfigResult<()> {
    require_non_empty(field, path)?;
    if !path.exists() {
        return Err(ConfigError::invalid(
            field,
            "does_not_exist",
            path.display().to_string(),
        ));
    }
    if !path.is_dir() {
        return Err(ConfigError::invalid(
            field,
            "not_a_directory",
            path.display().to_string(),
        ));
    }
    Ok(())
}
