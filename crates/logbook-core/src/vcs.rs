//! Revision tracking
//!
//! The journal tree lives in a version-controlled working copy. Change
//! detection only needs three answers from it, captured by
//! `RevisionSource`; `GitRevisions` answers them by running `git`.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::Command;

use tracing::debug;

use crate::error::{JournalError, JournalResult};

/// Source of truth for what changed in the note tree
///
/// Paths are relative to the tree root and `/`-separated.
pub trait RevisionSource {
    /// Files in the working tree that are not tracked yet
    fn untracked_files(&self) -> JournalResult<BTreeSet<String>>;

    /// Files that differ between `marker` and the working tree
    fn changed_files_since(&self, marker: &str) -> JournalResult<BTreeSet<String>>;

    /// Identifier of the current revision
    fn current_revision(&self) -> JournalResult<String>;
}

/// `RevisionSource` backed by a git working copy
#[derive(Debug, Clone)]
pub struct GitRevisions {
    root: PathBuf,
}

impl GitRevisions {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn git(&self, args: &[&str]) -> JournalResult<String> {
        let command = format!("git {}", args.join(" "));
        debug!("Running {}", command);

        let output = Command::new("git")
            .arg("-C")
            .arg(&self.root)
            .args(args)
            .output()
            .map_err(|e| JournalError::Vcs {
                command: command.clone(),
                details: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(JournalError::Vcs {
                command,
                details: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl RevisionSource for GitRevisions {
    fn untracked_files(&self) -> JournalResult<BTreeSet<String>> {
        let out = self.git(&["ls-files", ".", "--exclude-standard", "--others"])?;
        Ok(parse_paths(&out))
    }

    fn changed_files_since(&self, marker: &str) -> JournalResult<BTreeSet<String>> {
        let out = self.git(&["diff", marker, "--name-only"])?;
        Ok(parse_paths(&out))
    }

    fn current_revision(&self) -> JournalResult<String> {
        let out = self.git(&["rev-parse", "HEAD"])?;
        Ok(out.trim().to_string())
    }
}

/// One path per line; blank lines dropped
fn parse_paths(out: &str) -> BTreeSet<String> {
    out.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
