//! Persisted settings document.
//!
//! # Design
//! - The on-disk format is plain UTF-8 `key=value` lines, one setting each.
//! - Unknown keys are ignored and lines without `=` are skipped so older and
//!   newer documents stay readable.
//! - Validation of folder paths is left to [`IngestConfig::validate`]; loading
//!   only checks that required keys are present.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::defaults::{CONFIG_FILE_NAME, CONFIG_PATH_ENV};
use crate::error::{ConfigError, ConfigResult};
use crate::model::{CopyPolicy, ExtensionSet, IngestConfig, PriorityGroups, StabilitySettings};
use crate::validate::parse_bool;

const KEY_MONITOR_FOLDER: &str = "monitor_folder";
const KEY_DEST_FOLDER: &str = "dest_folder";
const KEY_DELETE_AFTER_ZIP: &str = "delete_after_zip";
const KEY_DELETE_AFTER_EXTRACTED: &str = "delete_after_extracted";
const KEY_FILE_EXTS: &str = "file_exts";
const KEY_LOGIC_INPUT: &str = "logic_input";
const KEY_COPY_ENABLED: &str = "copy_enabled";
const KEY_LOGIC_ENABLED: &str = "logic_enabled";
const KEY_COPY_WHOLE_FOLDER: &str = "copy_whole_folder";

/// Raw key/value pairs read from a settings document.
pub type ConfigDocument = BTreeMap<String, String>;

/// Split a settings document into key/value pairs.
#[must_use]
pub fn parse_config_document(text: &str) -> ConfigDocument {
    text.lines()
        .filter_map(|line| line.trim().split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .collect()
}

/// Render a configuration as a settings document.
#[must_use]
pub fn render_config_document(config: &IngestConfig) -> String {
    let policy = &config.policy;
    let extensions = policy
        .extension_filter
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_default();
    let pairs = [
        (KEY_MONITOR_FOLDER, config.monitor_folder.display().to_string()),
        (KEY_DEST_FOLDER, config.destination_folder.display().to_string()),
        (
            KEY_DELETE_AFTER_ZIP,
            policy.delete_archive_after_extract.to_string(),
        ),
        (
            KEY_DELETE_AFTER_EXTRACTED,
            policy.delete_extracted_after_copy.to_string(),
        ),
        (KEY_FILE_EXTS, extensions),
        (KEY_LOGIC_INPUT, policy.priority_groups.to_string()),
        (KEY_COPY_ENABLED, policy.extension_filter_enabled.to_string()),
        (KEY_LOGIC_ENABLED, policy.priority_enabled.to_string()),
        (KEY_COPY_WHOLE_FOLDER, policy.whole_folder_copy.to_string()),
    ];

    let mut rendered = String::new();
    for (key, value) in pairs {
        let _ = writeln!(rendered, "{key}={value}");
    }
    rendered
}

impl IngestConfig {
    /// Build a configuration from a parsed settings document.
    ///
    /// Missing optional keys fall back to [`CopyPolicy::default`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when either folder is absent or blank.
    pub fn from_document(document: &ConfigDocument) -> ConfigResult<Self> {
        let folder = |key: &'static str| -> ConfigResult<PathBuf> {
            document
                .get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(PathBuf::from)
                .ok_or(ConfigError::MissingField { field: key })
        };
        let flag = |key: &str, default: bool| document.get(key).map_or(default, |v| parse_bool(v));

        let defaults = CopyPolicy::default();
        let extension_filter = document
            .get(KEY_FILE_EXTS)
            .map(|value| ExtensionSet::parse(value))
            .filter(|set| !set.is_empty());
        let priority_groups = document
            .get(KEY_LOGIC_INPUT)
            .map(|value| PriorityGroups::parse(value))
            .unwrap_or_default();

        let policy = CopyPolicy {
            extension_filter,
            extension_filter_enabled: flag(KEY_COPY_ENABLED, defaults.extension_filter_enabled),
            priority_groups,
            priority_enabled: flag(KEY_LOGIC_ENABLED, defaults.priority_enabled),
            whole_folder_copy: flag(KEY_COPY_WHOLE_FOLDER, defaults.whole_folder_copy),
            delete_archive_after_extract: flag(
                KEY_DELETE_AFTER_ZIP,
                defaults.delete_archive_after_extract,
            ),
            delete_extracted_after_copy: flag(
                KEY_DELETE_AFTER_EXTRACTED,
                defaults.delete_extracted_after_copy,
            ),
        };

        Ok(Self {
            monitor_folder: folder(KEY_MONITOR_FOLDER)?,
            destination_folder: folder(KEY_DEST_FOLDER)?,
            policy,
            stability: StabilitySettings::default(),
        })
    }
}

/// Load a configuration from the settings document at `path`.
///
/// # Errors
///
/// Returns an IO error if the file cannot be read, or a field error when a
/// required key is missing.
pub fn read_config_file(path: &Path) -> ConfigResult<IngestConfig> {
    let text = fs::read_to_string(path)
        .map_err(|source| ConfigError::io("read_config_file", path, source))?;
    let document = parse_config_document(&text);
    debug!(path = %path.display(), keys = document.len(), "settings document loaded");
    IngestConfig::from_document(&document)
}

/// Persist `config` to `path`, creating parent directories when needed.
///
/// # Errors
///
/// Returns an IO error if the directory or file cannot be written.
pub fn write_config_file(path: &Path, config: &IngestConfig) -> ConfigResult<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|source| ConfigError::io("write_config_file.create_parent", parent, source))?;
    }
    fs::write(path, render_config_document(config))
        .map_err(|source| ConfigError::io("write_config_file", path, source))?;
    debug!(path = %path.display(), "settings document written");
    Ok(())
}

/// Location of the settings document: `UNSPOOL_CONFIG` when set, otherwise
/// `unspool.conf` next to the running executable.
#[must_use]
pub fn resolve_config_path() -> PathBuf {
    resolve_config_path_with(std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from))
}

fn resolve_config_path_with(env_override: Option<PathBuf>) -> PathBuf {
    if let Some(path) = env_override.filter(|path| !path.as_os_str().is_empty()) {
        return path;
    }
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(CONFIG_FILE_NAME)))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}
