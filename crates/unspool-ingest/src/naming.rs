//! Collision-free destination naming.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Return `candidate` if nothing exists there, else the first free
/// `stem_N.rest` sibling with `N` counting from 1.
///
/// The suffix goes before the first `.` that is not the leading character, so
/// `photo.tar.gz` becomes `photo_1.tar.gz` and `.hidden` becomes `.hidden_1`.
/// Dangling symlinks count as occupied.
#[must_use]
pub fn unique_path(candidate: &Path) -> PathBuf {
    if !occupied(candidate) {
        return candidate.to_path_buf();
    }
    let Some(name) = candidate.file_name() else {
        return candidate.to_path_buf();
    };
    let parent = candidate.parent().unwrap_or_else(|| Path::new(""));

    (1_u64..)
        .map(|counter| parent.join(suffixed(name, counter)))
        .find(|path| !occupied(path))
        .unwrap_or_else(|| candidate.to_path_buf())
}

fn suffixed(name: &std::ffi::OsStr, counter: u64) -> OsString {
    if let Some(text) = name.to_str() {
        let split = text
            .char_indices()
            .find(|&(index, ch)| index > 0 && ch == '.')
            .map_or(text.len(), |(index, _)| index);
        let (stem, rest) = text.split_at(split);
        return OsString::from(format!("{stem}_{counter}{rest}"));
    }
    let mut raw = name.to_os_string();
    raw.push(format!("_{counter}"));
    raw
}

fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn free_candidate_is_returned_unchanged() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let candidate = temp.path().join("photo.jpg");
        assert_eq!(unique_path(&candidate), candidate);
        Ok(())
    }

    #[test]
    fn counter_starts_at_one_and_skips_taken_names() -> Result<()> {
        let temp = tempfile::tempdir()?;
        fs::write(temp.path().join("photo.jpg"), b"0")?;
        assert_eq!(
            unique_path(&temp.path().join("photo.jpg")),
            temp.path().join("photo_1.jpg")
        );

        fs::write(temp.path().join("photo_1.jpg"), b"1")?;
        assert_eq!(
            unique_path(&temp.path().join("photo.jpg")),
            temp.path().join("photo_2.jpg")
        );
        Ok(())
    }

    #[test]
    fn suffix_goes_before_first_inner_dot() -> Result<()> {
        let temp = tempfile::tempdir()?;
        fs::write(temp.path().join("backup.tar.gz"), b"")?;
        fs::write(temp.path().join(".hidden"), b"")?;
        fs::create_dir(temp.path().join("folder"))?;

        assert_eq!(
            unique_path(&temp.path().join("backup.tar.gz")),
            temp.path().join("backup_1.tar.gz")
        );
        assert_eq!(
            unique_path(&temp.path().join(".hidden")),
            temp.path().join(".hidden_1")
        );
        assert_eq!(
            unique_path(&temp.path().join("folder")),
            temp.path().join("folder_1")
        );
        Ok(())
    }
}
