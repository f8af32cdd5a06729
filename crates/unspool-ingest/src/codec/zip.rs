use std::fs::{self, File};
use std::io;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Component, Path, PathBuf};

use zip::ZipArchive;

use super::{ArchiveCodec, ArchiveFormat};
use crate::error::{IngestError, IngestResult};

/// In-process ZIP reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipCodec;

impl ZipCodec {
    fn open(archive: &Path) -> IngestResult<ZipArchive<File>> {
        let file = File::open(archive)
            .map_err(|source_err| IngestError::io("zip.open", archive, source_err))?;
        ZipArchive::new(file)
            .map_err(|source_err| IngestError::zip("zip.decode", archive, source_err))
    }
}

impl ArchiveCodec for ZipCodec {
    fn format(&self) -> ArchiveFormat {
        ArchiveFormat::Zip
    }

    fn list_entries(&self, archive: &Path) -> IngestResult<Vec<String>> {
        let mut reader = Self::open(archive)?;
        let mut names = Vec::with_capacity(reader.len());
        for index in 0..reader.len() {
            let entry = reader.by_index(index).map_err(|source_err| {
                IngestError::zip("zip.read_entry", archive, source_err)
            })?;
            names.push(entry.name().to_string());
        }
        Ok(names)
    }

    fn extract_all(&self, archive: &Path, target: &Path) -> IngestResult<()> {
        let mut reader = Self::open(archive)?;
        fs::create_dir_all(target)
            .map_err(|source_err| IngestError::io("zip.create_target", target, source_err))?;

        for index in 0..reader.len() {
            let mut entry = reader.by_index(index).map_err(|source_err| {
                IngestError::zip("zip.read_entry", archive, source_err)
            })?;
            let entry_path = sanitize_entry_path(archive, entry.name())?;
            let destination = target.join(&entry_path);

            if entry.is_dir() {
                fs::create_dir_all(&destination).map_err(|source_err| {
                    IngestError::io("zip.create_dir", &destination, source_err)
                })?;
                continue;
            }

            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent).map_err(|source_err| {
                    IngestError::io("zip.create_parent", parent, source_err)
                })?;
            }

            let mut output = File::create(&destination).map_err(|source_err| {
                IngestError::io("zip.create_file", &destination, source_err)
            })?;
            io::copy(&mut entry, &mut output).map_err(|source_err| {
                if source_err.kind() == io::ErrorKind::InvalidData {
                    IngestError::CorruptArchive {
                        path: archive.to_path_buf(),
                        detail: source_err.to_string(),
                    }
                } else {
                    IngestError::io("zip.copy", &destination, source_err)
                }
            })?;

            #[cfg(unix)]
            if let Some(mode) = entry.unix_mode() {
                let perms = fs::Permissions::from_mode(mode);
                fs::set_permissions(&destination, perms).map_err(|source_err| {
                    IngestError::io("zip.set_permissions", &destination, source_err)
                })?;
            }
        }

        Ok(())
    }
}

/// Map an entry name to a relative path that stays under the target folder.
fn sanitize_entry_path(archive: &Path, entry: &str) -> IngestResult<PathBuf> {
    let normalised = entry.replace('\\', "/");
    let path = Path::new(&normalised);
    if path.is_absolute() || normalised.starts_with('/') {
        return Err(IngestError::UnsafeEntry {
            path: archive.to_path_buf(),
            entry: entry.to_string(),
            reason: "absolute_path",
        });
    }

    let mut sanitized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(segment) => sanitized.push(segment),
            Component::CurDir => {}
            _ => {
                return Err(IngestError::UnsafeEntry {
                    path: archive.to_path_buf(),
                    entry: entry.to_string(),
                    reason: "invalid_segment",
                });
            }
        }
    }

    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use unspool_test_support::fixtures::write_zip_archive;

    #[test]
    fn sanitize_entry_path_rejects_unsafe_inputs() -> Result<()> {
        let archive = Path::new("a.zip");
        assert!(sanitize_entry_path(archive, "/abs/path").is_err());
        assert!(sanitize_entry_path(archive, "../escape").is_err());
        assert!(sanitize_entry_path(archive, "..\\escape").is_err());
        assert_eq!(
            sanitize_entry_path(archive, "nested/./file.txt")?,
            PathBuf::from("nested/file.txt")
        );
        Ok(())
    }

    #[test]
    fn lists_and_extracts_entries() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let archive = temp.path().join("photos.zip");
        write_zip_archive(
            &archive,
            &[
                ("photos/a.jpg", b"a".as_slice()),
                ("photos/raw/b.cr2", b"bb".as_slice()),
            ],
        )?;

        let names = ZipCodec.list_entries(&archive)?;
        assert_eq!(names, vec!["photos/a.jpg", "photos/raw/b.cr2"]);

        let target = temp.path().join("out");
        ZipCodec.extract_all(&archive, &target)?;
        assert_eq!(fs::read(target.join("photos/a.jpg"))?, b"a");
        assert_eq!(fs::read(target.join("photos/raw/b.cr2"))?, b"bb");
        Ok(())
    }

    #[test]
    fn garbage_is_reported_as_corrupt() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let archive = temp.path().join("broken.zip");
        fs::write(&archive, b"definitely not a zip")?;
        assert!(matches!(
            ZipCodec.list_entries(&archive),
            Err(IngestError::CorruptArchive { .. })
        ));
        Ok(())
    }

    #[test]
    fn traversal_entries_are_refused() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let archive = temp.path().join("evil.zip");
        write_zip_archive(&archive, &[("../escape.txt", b"x".as_slice())])?;
        let target = temp.path().join("out");
        assert!(matches!(
            ZipCodec.extract_all(&archive, &target),
            Err(IngestError::UnsafeEntry { .. })
        ));
        assert!(!temp.path().join("escape.txt").exists());
        Ok(())
    }
}
