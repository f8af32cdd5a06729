//! Archive layout analysis.
//!
//! Decides from entry names alone whether an archive wraps all of its content
//! in one top-level folder. Such archives are extracted without an extra
//! wrapping directory.

use std::collections::BTreeSet;

/// Shape of an archive's top level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLayout {
    /// Exactly one top-level directory holds every entry.
    pub single_root: bool,
    /// Name of that directory when `single_root` is set.
    pub root_entry_name: Option<String>,
}

impl ArchiveLayout {
    const fn multi_entry() -> Self {
        Self {
            single_root: false,
            root_entry_name: None,
        }
    }
}

/// Classify an archive from its entry names.
///
/// Names may use `/` or `\` separators. A top-level directory only counts
/// once some other entry is nested beneath it; a bare `name/` marker alone is
/// neither a file nor a confirmed directory. Empty listings are multi-entry.
#[must_use]
pub fn analyze<S: AsRef<str>>(entry_names: &[S]) -> ArchiveLayout {
    let names: Vec<String> = entry_names
        .iter()
        .map(|name| name.as_ref().replace('\\', "/"))
        .map(|name| name.trim_start_matches("./").to_string())
        .filter(|name| !name.is_empty())
        .collect();

    let mut root_files = BTreeSet::new();
    let mut candidates = BTreeSet::new();
    let mut top_segments = BTreeSet::new();
    for name in &names {
        let segments: Vec<&str> = name.split('/').collect();
        top_segments.insert(segments[0]);
        match segments.as_slice() {
            [file] => {
                root_files.insert(*file);
            }
            [dir, ..] => {
                candidates.insert(*dir);
            }
            [] => {}
        }
    }

    let confirmed: Vec<&str> = candidates
        .into_iter()
        .filter(|dir| {
            let prefix = format!("{dir}/");
            names
                .iter()
                .any(|name| name.len() > prefix.len() && name.starts_with(&prefix))
        })
        .collect();

    match confirmed.as_slice() {
        [root] if root_files.is_empty() && top_segments.len() == 1 => ArchiveLayout {
            single_root: true,
            root_entry_name: Some((*root).to_string()),
        },
        _ => ArchiveLayout::multi_entry(),
    }
}
