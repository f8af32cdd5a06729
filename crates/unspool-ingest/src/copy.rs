//! Copy policy engine.
//!
//! # Design
//! - Selective modes flatten matching files into the destination folder;
//!   whole-folder mode copies the tree as one unit.
//! - Every write target is freshly computed with [`unique_path`], so nothing
//!   in the destination is ever overwritten.
//! - Per-file failures are logged and skipped. Cancellation stops between
//!   files, never mid-file.
//! - The extracted folder is only removed after a clean copy that moved at
//!   least one file.

use std::fs::{self, File, FileTimes, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use unspool_config::{CopyPolicy, ExtensionSet, PriorityGroups};
use walkdir::WalkDir;

use crate::cancel::CancellationToken;
use crate::error::{IngestError, IngestResult};
use crate::naming::unique_path;
use crate::sink::SharedSink;

/// Result of one selective copy pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    /// Destination paths written, in copy order.
    pub copied: Vec<PathBuf>,
    /// Files that could not be copied.
    pub failures: usize,
    /// The pass stopped early on cancellation.
    pub cancelled: bool,
    /// Zero-based index of the winning priority group, for priority passes.
    pub matched_group: Option<usize>,
}

impl CopyReport {
    /// Whether at least one file reached the destination.
    #[must_use]
    pub fn copied_any(&self) -> bool {
        !self.copied.is_empty()
    }

    /// Whether a priority group matched.
    #[must_use]
    pub const fn matched_any_group(&self) -> bool {
        self.matched_group.is_some()
    }
}

/// Combined result of applying a [`CopyPolicy`] to one extracted folder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyOutcome {
    /// Files (or the whole folder) reached the destination.
    pub copied_any: bool,
    /// At least one file failed to copy.
    pub had_failures: bool,
    /// Copying stopped early on cancellation.
    pub cancelled: bool,
    /// The extracted folder was removed afterwards.
    pub cleaned_up: bool,
}

impl CopyOutcome {
    fn absorb(&mut self, report: &CopyReport) {
        self.copied_any |= report.copied_any();
        self.had_failures |= report.failures > 0;
        self.cancelled |= report.cancelled;
    }
}

/// Routes extracted files into the destination folder.
#[derive(Clone)]
pub struct CopyEngine {
    destination: PathBuf,
    sink: SharedSink,
}

impl std::fmt::Debug for CopyEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CopyEngine")
            .field("destination", &self.destination)
            .finish_non_exhaustive()
    }
}

impl CopyEngine {
    /// Engine writing into `destination` and reporting to `sink`.
    #[must_use]
    pub fn new(destination: impl Into<PathBuf>, sink: SharedSink) -> Self {
        Self {
            destination: destination.into(),
            sink,
        }
    }

    /// Run the modes selected by `policy` over `folder`, then clean up.
    pub fn apply(
        &self,
        folder: &Path,
        policy: &CopyPolicy,
        token: &CancellationToken,
    ) -> CopyOutcome {
        let mut outcome = CopyOutcome::default();

        if policy.whole_folder_copy {
            self.sink
                .write_line("Copying entire extracted folder to destination...");
            match self.copy_whole_folder(folder) {
                Ok(copied_to) => {
                    self.sink.write_line(&format!(
                        "Copied entire folder: {} -> {}",
                        folder.display(),
                        copied_to.display()
                    ));
                    outcome.copied_any = true;
                }
                Err(err) => {
                    outcome.had_failures = true;
                    self.sink.write_line(&format!(
                        "Failed to copy entire folder {}. {}",
                        folder.display(),
                        err.log_line()
                    ));
                }
            }
        } else {
            if policy.priority_enabled && policy.priority_groups.is_empty() {
                self.sink.write_line("No valid priority groups configured.");
            }
            if policy.priority_active() {
                let report = self.copy_by_priority(folder, &policy.priority_groups, token);
                outcome.absorb(&report);
            }
            if policy.extension_filter_enabled && !outcome.cancelled {
                let report = self.copy_by_extension(folder, policy.extension_filter(), token);
                outcome.absorb(&report);
            }
            if !policy.selective_copy_active() {
                self.sink.write_line("Copying skipped (no copy mode selected).");
            }
        }

        if policy.delete_extracted_after_copy {
            if outcome.cancelled || outcome.had_failures || !outcome.copied_any {
                self.sink.write_line(&format!(
                    "Keeping extracted folder {}; nothing was fully copied.",
                    folder.display()
                ));
            } else {
                outcome.cleaned_up = self.cleanup(folder);
            }
        }
        outcome
    }

    /// Copy every file under `folder` whose extension is in `filter` (or
    /// every file when `filter` is `None`) flat into the destination.
    pub fn copy_by_extension(
        &self,
        folder: &Path,
        filter: Option<&ExtensionSet>,
        token: &CancellationToken,
    ) -> CopyReport {
        let mut report = CopyReport::default();
        for file in self.collect_files(folder) {
            if token.is_cancelled() {
                self.sink.write_line("Copying stopped by user.");
                report.cancelled = true;
                break;
            }
            if filter.is_none_or(|set| set.matches_path(&file)) {
                self.copy_flat(&file, &mut report);
            }
        }
        report
    }

    /// Copy the files of the first group in `groups` that matches anything
    /// under `folder`. Lower groups are never evaluated once one matches.
    pub fn copy_by_priority(
        &self,
        folder: &Path,
        groups: &PriorityGroups,
        token: &CancellationToken,
    ) -> CopyReport {
        let mut report = CopyReport::default();
        self.sink.write_line(&format!("Priority groups: {groups}"));
        let files = self.collect_files(folder);

        for (index, group) in groups.groups().iter().enumerate() {
            let level = index + 1;
            if token.is_cancelled() {
                self.sink.write_line("Copying stopped by user.");
                report.cancelled = true;
                return report;
            }

            let matches: Vec<&PathBuf> = files
                .iter()
                .filter(|file| group.matches_path(file))
                .collect();
            if matches.is_empty() {
                self.sink.write_line(&format!(
                    "Priority {level}: no files found for extensions {group}."
                ));
                continue;
            }

            report.matched_group = Some(index);
            self.sink.write_line(&format!(
                "Priority {level}: found {} file(s) with extensions {group}",
                matches.len()
            ));
            for file in matches {
                if token.is_cancelled() {
                    self.sink.write_line("Copying stopped by user.");
                    report.cancelled = true;
                    return report;
                }
                self.copy_flat(file, &mut report);
            }
            self.sink.write_line(&format!(
                "Stopped at priority {level}; lower priorities are not checked."
            ));
            return report;
        }

        self.sink
            .write_line("No files matched any priority group. Nothing copied.");
        report
    }

    /// Copy `folder` as a whole to `destination/<folder name>`, suffixing
    /// only the top-level name on collision. Returns the new folder.
    ///
    /// # Errors
    ///
    /// Returns an error when the tree cannot be walked or any file fails.
    pub fn copy_whole_folder(&self, folder: &Path) -> IngestResult<PathBuf> {
        let name = folder.file_name().ok_or_else(|| IngestError::Io {
            operation: "copy_whole_folder.name",
            path: folder.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "folder has no name"),
        })?;
        let target = unique_path(&self.destination.join(name));
        copy_tree(folder, &target)?;
        Ok(target)
    }

    /// Remove the extracted `folder`. Returns whether it is gone.
    pub fn cleanup(&self, folder: &Path) -> bool {
        if !folder.exists() {
            return true;
        }
        match fs::remove_dir_all(folder) {
            Ok(()) => {
                self.sink.write_line(&format!(
                    "Deleted extracted folder after copying: {}",
                    folder.display()
                ));
                true
            }
            Err(source) => {
                let err = IngestError::DeleteFailure {
                    path: folder.to_path_buf(),
                    source,
                };
                self.sink.write_line(&err.log_line());
                false
            }
        }
    }

    fn collect_files(&self, folder: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in WalkDir::new(folder).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
                Ok(_) => {}
                Err(source_err) => {
                    let err = IngestError::walkdir("copy.walk", folder, source_err);
                    self.sink.write_line(&err.log_line());
                }
            }
        }
        files
    }

    fn copy_flat(&self, source: &Path, report: &mut CopyReport) {
        let Some(name) = source.file_name() else {
            return;
        };
        let target = unique_path(&self.destination.join(name));
        match copy_file_preserving(source, &target) {
            Ok(()) => {
                self.sink.write_line(&format!(
                    "Copied: {} -> {}",
                    source.display(),
                    target.display()
                ));
                report.copied.push(target);
            }
            Err(source_err) => {
                let err = IngestError::CopyFailure {
                    source_path: source.to_path_buf(),
                    destination: target,
                    source: source_err,
                };
                self.sink.write_line(&err.log_line());
                report.failures += 1;
            }
        }
    }
}

fn copy_tree(source: &Path, destination: &Path) -> IngestResult<()> {
    fs::create_dir_all(destination)
        .map_err(|source_err| IngestError::io("copy_tree.create_dir", destination, source_err))?;

    for entry in WalkDir::new(source) {
        let entry = entry
            .map_err(|source_err| IngestError::walkdir("copy_tree.walk", source, source_err))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|_| IngestError::Io {
                operation: "copy_tree.strip_prefix",
                path: entry.path().to_path_buf(),
                source: io::Error::new(io::ErrorKind::InvalidInput, "entry outside source"),
            })?;
        let target_path = destination.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target_path).map_err(|source_err| {
                IngestError::io("copy_tree.create_dir", &target_path, source_err)
            })?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target_path.parent() {
                fs::create_dir_all(parent).map_err(|source_err| {
                    IngestError::io("copy_tree.create_parent", parent, source_err)
                })?;
            }
            copy_file_preserving(entry.path(), &target_path).map_err(|source_err| {
                IngestError::CopyFailure {
                    source_path: entry.path().to_path_buf(),
                    destination: target_path.clone(),
                    source: source_err,
                }
            })?;
        } else {
            debug!(path = %entry.path().display(), "skipping special file");
        }
    }
    Ok(())
}

/// Copy contents and permissions, then carry over access and modification times.
fn copy_file_preserving(source: &Path, destination: &Path) -> io::Result<()> {
    fs::copy(source, destination)?;
    if let Err(err) = preserve_times(source, destination) {
        warn!(
            path = %destination.display(),
            error = %err,
            "file copied without original timestamps"
        );
    }
    Ok(())
}

fn preserve_times(source: &Path, destination: &Path) -> io::Result<()> {
    let metadata = fs::metadata(source)?;
    let mut times = FileTimes::new();
    if let Ok(modified) = metadata.modified() {
        times = times.set_modified(modified);
    }
    if let Ok(accessed) = metadata.accessed() {
        times = times.set_accessed(accessed);
    }
    let file = OpenOptions::new()
        .write(true)
        .open(destination)
        .or_else(|_| File::open(destination))?;
    file.set_times(times)
}
