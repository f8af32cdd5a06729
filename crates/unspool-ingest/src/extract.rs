//! Extraction into the monitored folder.
//!
//! # Design
//! - Entries are listed and classified before anything is written.
//! - Extraction lands in a hidden staging folder beside the archive, then is
//!   moved into a name that did not exist, so existing content is never
//!   overwritten or merged into.
//! - Single-root archives keep their own top folder; everything else gets a
//!   folder named after the archive stem.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, instrument};

use crate::codec::CodecRegistry;
use crate::error::{IngestError, IngestResult};
use crate::layout::{ArchiveLayout, analyze};
use crate::naming::unique_path;

const STAGING_PREFIX: &str = ".unspool-";

/// Where an archive's content ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Folder holding the extracted content.
    pub destination_folder: PathBuf,
    /// The archive's own top folder was placed directly in the monitored
    /// folder instead of a wrapper named after the archive.
    pub was_monitored_folder: bool,
    /// Layout detected before extraction.
    pub layout: ArchiveLayout,
}

/// Lists, classifies, and unpacks archives.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    codecs: CodecRegistry,
}

impl Extractor {
    /// Extractor using the given codecs.
    #[must_use]
    pub const fn new(codecs: CodecRegistry) -> Self {
        Self { codecs }
    }

    /// Extract `archive` into `monitored_folder`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::SourceVanished`] when the archive no longer
    /// exists, and codec or filesystem errors otherwise. Nothing is left in
    /// the monitored folder when an error is returned.
    #[instrument(
        name = "extractor.extract",
        skip(self, archive, monitored_folder),
        fields(archive = %archive.display())
    )]
    pub fn extract(
        &self,
        archive: &Path,
        monitored_folder: &Path,
    ) -> IngestResult<ExtractionResult> {
        if !archive.is_file() {
            return Err(IngestError::SourceVanished {
                path: archive.to_path_buf(),
            });
        }

        let codec = self.codecs.for_path(archive)?;
        let entries = codec.list_entries(archive)?;
        let layout = analyze(&entries);
        debug!(
            entries = entries.len(),
            single_root = layout.single_root,
            "archive listed"
        );

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(monitored_folder)
            .map_err(|source_err| {
                IngestError::io("extract.create_staging", monitored_folder, source_err)
            })?;
        codec.extract_all(archive, staging.path())?;

        let root = layout
            .root_entry_name
            .as_deref()
            .filter(|name| is_plain_segment(name))
            .filter(|_| layout.single_root)
            .map(|name| staging.path().join(name))
            .filter(|path| path.is_dir());

        let result = if let Some(staged_root) = root {
            let name = staged_root
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_default();
            let destination = unique_path(&monitored_folder.join(name));
            fs::rename(&staged_root, &destination).map_err(|source_err| {
                IngestError::io("extract.place_root", &destination, source_err)
            })?;
            ExtractionResult {
                destination_folder: destination,
                was_monitored_folder: true,
                layout,
            }
        } else {
            let stem = archive
                .file_stem()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("extracted"));
            let destination = create_unique_dir(&monitored_folder.join(stem))?;
            move_children(staging.path(), &destination)?;
            ExtractionResult {
                destination_folder: destination,
                was_monitored_folder: false,
                layout,
            }
        };

        staging.close().map_err(|source_err| {
            IngestError::io("extract.remove_staging", monitored_folder, source_err)
        })?;
        Ok(result)
    }
}

fn is_plain_segment(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Create a fresh directory at `candidate` or the first free suffixed sibling.
fn create_unique_dir(candidate: &Path) -> IngestResult<PathBuf> {
    loop {
        let path = unique_path(candidate);
        match fs::create_dir(&path) {
            Ok(()) => return Ok(path),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {}
            Err(err) => return Err(IngestError::io("extract.create_folder", &path, err)),
        }
    }
}

fn move_children(from: &Path, to: &Path) -> IngestResult<()> {
    let entries = fs::read_dir(from)
        .map_err(|source_err| IngestError::io("extract.read_staging", from, source_err))?;
    for entry in entries {
        let entry = entry
            .map_err(|source_err| IngestError::io("extract.read_staging", from, source_err))?;
        let target = to.join(entry.file_name());
        fs::rename(entry.path(), &target)
            .map_err(|source_err| IngestError::io("extract.place_entry", &target, source_err))?;
    }
    Ok(())
}
