//! Filesystem assertions for integration tests.

use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

/// Sorted names of the direct children of `dir`.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed.
pub fn dir_names(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("list {}", dir.display()))? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

/// Poll `condition` every 50ms until it holds or `timeout` passes.
#[must_use]
pub fn eventually(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(50));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dir_names_are_sorted() -> Result<()> {
        let temp = tempfile::tempdir()?;
        fs::write(temp.path().join("b.txt"), b"")?;
        fs::create_dir(temp.path().join("a"))?;
        assert_eq!(dir_names(temp.path())?, vec!["a", "b.txt"]);
        Ok(())
    }

    #[test]
    fn eventually_reports_timeouts() {
        let mut calls = 0;
        assert!(eventually(Duration::from_secs(1), || {
            calls += 1;
            calls >= 3
        }));
        assert!(!eventually(Duration::from_millis(60), || false));
    }
}
