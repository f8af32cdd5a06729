//! Archive fixtures and temporary workspaces.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::FileOptions;

/// Write a ZIP archive at `path` holding `entries` as `(name, contents)`.
///
/// Names ending in `/` are written as directory markers and their contents
/// are ignored.
///
/// # Errors
///
/// Returns an error if the archive cannot be created or written.
pub fn write_zip_archive(path: &Path, entries: &[(&str, &[u8])]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create archive parent {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("create archive {}", path.display()))?;
    let mut writer = ZipWriter::new(file);
    let options = FileOptions::default();
    for (name, contents) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options)?;
            continue;
        }
        writer.start_file(*name, options)?;
        writer.write_all(contents)?;
    }
    writer.finish()?;
    Ok(())
}

/// Monitored and destination folders inside one temporary directory.
#[derive(Debug)]
pub struct IngestWorkspace {
    root: TempDir,
    monitor: PathBuf,
    destination: PathBuf,
}

impl IngestWorkspace {
    /// Create `monitor/` and `dest/` under a fresh temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created.
    pub fn new() -> Result<Self> {
        let root = tempfile::tempdir().context("create workspace root")?;
        let monitor = root.path().join("monitor");
        let destination = root.path().join("dest");
        fs::create_dir_all(&monitor).context("create monitor folder")?;
        fs::create_dir_all(&destination).context("create destination folder")?;
        Ok(Self {
            root,
            monitor,
            destination,
        })
    }

    /// Temporary root holding both folders.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Folder watched for archives.
    #[must_use]
    pub fn monitor(&self) -> &Path {
        &self.monitor
    }

    /// Folder receiving copies.
    #[must_use]
    pub fn destination(&self) -> &Path {
        &self.destination
    }
}
