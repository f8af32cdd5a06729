//! Typed configuration models.
//!
//! # Design
//! - Pure data carriers; nothing here touches the filesystem except `validate`.
//! - Extensions are normalised once at construction so comparisons stay cheap.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::defaults::{SETTLE_DELAY, STABILITY_INTERVAL, STABILITY_TIMEOUT};
use crate::error::{ConfigError, ConfigResult};
use crate::validate::{normalize_extension, path_extension, require_directory};

/// Case-insensitive set of file extensions stored without leading dots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtensionSet(BTreeSet<String>);

impl ExtensionSet {
    /// Parse a `,`-separated extension list such as `".jpg, PNG,,tif"`.
    #[must_use]
    pub fn parse(list: &str) -> Self {
        list.split(',').collect()
    }

    /// Whether `extension` (any case, optional leading dot) is in the set.
    #[must_use]
    pub fn contains(&self, extension: &str) -> bool {
        normalize_extension(extension).is_some_and(|ext| self.0.contains(&ext))
    }

    /// Whether the extension of `path`'s final component is in the set.
    #[must_use]
    pub fn matches_path(&self, path: &Path) -> bool {
        path_extension(path).is_some_and(|ext| self.0.contains(&ext))
    }

    /// Number of distinct extensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set holds no extensions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the normalised extensions in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for ExtensionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .filter_map(|raw| normalize_extension(raw.as_ref()))
                .collect(),
        )
    }
}

impl fmt::Display for ExtensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self.iter().collect::<Vec<_>>().join(",");
        f.write_str(&joined)
    }
}

/// Ordered extension groups; the lowest index is the highest priority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriorityGroups(Vec<ExtensionSet>);

impl PriorityGroups {
    /// Parse `label-ext,ext; label-ext` style input.
    ///
    /// Groups are split on `;`. Anything before the first `-` of a group is a
    /// label and is discarded unchecked. Groups that end up without any
    /// extension are dropped, so the result may be empty.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let groups = input
            .split(';')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.split_once('-')
                    .map_or(part, |(_label, extensions)| extensions)
            })
            .map(ExtensionSet::parse)
            .filter(|group| !group.is_empty())
            .collect();
        Self(groups)
    }

    /// Groups in priority order.
    #[must_use]
    pub fn groups(&self) -> &[ExtensionSet] {
        &self.0
    }

    /// Number of groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no usable group was configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PriorityGroups {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .0
            .iter()
            .enumerate()
            .map(|(index, group)| format!("{}-{group}", index + 1))
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&rendered)
    }
}

/// How extracted files are routed to the destination folder.
///
/// Never mutated while a run is in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyPolicy {
    /// Extensions copied by the extension filter; `None` copies everything.
    pub extension_filter: Option<ExtensionSet>,
    /// Whether the extension-filter copy runs at all.
    pub extension_filter_enabled: bool,
    /// Ordered priority groups for the exclusive priority copy.
    pub priority_groups: PriorityGroups,
    /// Whether the priority copy runs at all.
    pub priority_enabled: bool,
    /// Copy the extracted tree as one unit instead of selecting files.
    pub whole_folder_copy: bool,
    /// Remove the archive once it has been extracted.
    pub delete_archive_after_extract: bool,
    /// Remove the extracted folder once something was copied out of it.
    pub delete_extracted_after_copy: bool,
}

impl CopyPolicy {
    /// The extension filter, treating an empty set as unset.
    #[must_use]
    pub fn extension_filter(&self) -> Option<&ExtensionSet> {
        self.extension_filter.as_ref().filter(|set| !set.is_empty())
    }

    /// Whether the priority copy is enabled and has at least one group.
    #[must_use]
    pub fn priority_active(&self) -> bool {
        self.priority_enabled && !self.priority_groups.is_empty()
    }

    /// Whether any selective (non whole-folder) copy mode will run.
    #[must_use]
    pub fn selective_copy_active(&self) -> bool {
        self.extension_filter_enabled || self.priority_active()
    }
}

impl Default for CopyPolicy {
    fn default() -> Self {
        Self {
            extension_filter: None,
            extension_filter_enabled: true,
            priority_groups: PriorityGroups::default(),
            priority_enabled: false,
            whole_folder_copy: false,
            delete_archive_after_extract: false,
            delete_extracted_after_copy: false,
        }
    }
}

/// Timing of the download stability gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StabilitySettings {
    /// Delay between two size samples.
    pub interval: Duration,
    /// Give up waiting after this long.
    pub timeout: Duration,
    /// Extra pause after the size settled, before the archive is opened.
    pub settle_delay: Duration,
}

impl Default for StabilitySettings {
    fn default() -> Self {
        Self {
            interval: STABILITY_INTERVAL,
            timeout: STABILITY_TIMEOUT,
            settle_delay: SETTLE_DELAY,
        }
    }
}

/// Fully-formed configuration handed to the ingestion core at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Folder watched for incoming archives; extraction happens here.
    pub monitor_folder: PathBuf,
    /// Folder that receives copied files.
    pub destination_folder: PathBuf,
    /// Copy and cleanup policy.
    pub policy: CopyPolicy,
    /// Stability gate timing.
    pub stability: StabilitySettings,
}

impl IngestConfig {
    /// Configuration with default policy and timings.
    #[must_use]
    pub fn new(
        monitor_folder: impl Into<PathBuf>,
        destination_folder: impl Into<PathBuf>,
    ) -> Self {
        Self {
            monitor_folder: monitor_folder.into(),
            destination_folder: destination_folder.into(),
            policy: CopyPolicy::default(),
            stability: StabilitySettings::default(),
        }
    }

    /// Replace the copy policy.
    #[must_use]
    pub fn with_policy(mut self, policy: CopyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the stability timings.
    #[must_use]
    pub fn with_stability(mut self, stability: StabilitySettings) -> Self {
        self.stability = stability;
        self
    }

    /// Check that both folders exist, are directories, and differ.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] for empty paths and
    /// [`ConfigError::InvalidField`] for anything else that fails.
    pub fn validate(&self) -> ConfigResult<()> {
        require_directory("monitor_folder", &self.monitor_folder)?;
        require_directory("dest_folder", &self.destination_folder)?;
        let monitor = self
            .monitor_folder
            .canonicalize()
            .unwrap_or_else(|_| self.monitor_folder.clone());
        let destination = self
            .destination_folder
            .canonicalize()
            .unwrap_or_else(|_| self.destination_folder.clone());
        if monitor == destination {
            return Err(ConfigError::invalid(
                "dest_folder",
                "same_as_monitor_folder",
                self.destination_folder.display().to_string(),
            ));
        }
        Ok(())
    }
}
