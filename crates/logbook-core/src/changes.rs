//! Change detection
//!
//! Decides which notes a pass has to look at. Without a recorded revision
//! every note in the tree is rescanned; with one, only the notes the
//! revision source reports as untracked or changed since that revision.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::error::{JournalError, JournalResult};
use crate::journal::Journal;
use crate::note::is_generated_path;
use crate::vcs::RevisionSource;

const VCS_DIR: &str = ".git";
const NOTE_SUFFIX: &str = ".md";

/// Notes touched since the last synchronized revision
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Notes present on disk that must be rescanned
    pub scan: BTreeSet<String>,
    /// Notes that no longer exist on disk
    pub removed: BTreeSet<String>,
}

/// What a pass has to process
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Rebuild from scratch: every note in the tree, sorted
    Full(Vec<String>),
    /// Update only the notes in the change set
    Incremental(ChangeSet),
}

/// Pick the notes to process for this pass
///
/// Tagged notes that have vanished from disk are removed even when the
/// revision source never reported them, e.g. a note created and deleted
/// without ever being committed.
pub fn select_changes(
    journal: &Journal,
    root: &Path,
    source: &dyn RevisionSource,
) -> JournalResult<Selection> {
    if !journal.is_synchronized() {
        debug!("No revision recorded, selecting the whole tree");
        return Ok(Selection::Full(list_notes(root)?));
    }

    let mut changes = ChangeSet::default();
    for path in source.untracked_files()? {
        if is_note_path(&path) {
            changes.scan.insert(path);
        }
    }
    for path in source.changed_files_since(&journal.revision)? {
        if !is_note_path(&path) {
            continue;
        }
        if root.join(&path).exists() {
            changes.scan.insert(path);
        } else {
            changes.removed.insert(path);
        }
    }
    for path in journal.note_paths() {
        if !changes.scan.contains(path) && !root.join(path).exists() {
            changes.removed.insert(path.to_string());
        }
    }

    debug!(
        "Changes since {}: {} to scan, {} removed",
        journal.revision,
        changes.scan.len(),
        changes.removed.len()
    );
    Ok(Selection::Incremental(changes))
}

/// Every note in the tree, relative and sorted
///
/// Skips the version-control directory and the generated index and archive.
pub fn list_notes(root: &Path) -> JournalResult<Vec<String>> {
    let mut notes = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_vcs_dir(e));

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            match e.into_io_error() {
                Some(io) => JournalError::from_io(io, path),
                None => JournalError::Read {
                    path,
                    source: std::io::Error::other("filesystem loop"),
                },
            }
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if let Some(path) = relative_path(root, entry.path()) {
            if is_note_path(&path) {
                notes.push(path);
            }
        }
    }
    notes.sort();
    Ok(notes)
}

fn is_vcs_dir(entry: &DirEntry) -> bool {
    entry.file_type().is_dir() && entry.file_name() == VCS_DIR
}

fn is_note_path(path: &str) -> bool {
    path.ends_with(NOTE_SUFFIX) && !is_generated_path(path)
}

/// `/`-separated path of `path` under `root`
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}
