//! Journal state persistence
//!
//! Handles loading the aggregation state and writing it back together
//! with the generated documents. Uses atomic writes (write to temp file,
//! then rename) so a failed pass leaves the previous files in place.
//!
//! Files, all inside the journal tree:
//! - `.journal.json` - The aggregation state
//! - `index.md` - The rendered DOING / TODO / LATER index
//! - `.archive.md` - The rendered diary archive

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::Config;
use crate::error::JournalError;
use crate::journal::Journal;

/// Persistence layer for the journal state and its rendered documents
pub struct JournalPersistence {
    config: Config,
}

impl JournalPersistence {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Load the journal state
    ///
    /// Returns a fresh journal if the file doesn't exist.
    /// Returns an error if the file exists but can't be read or parsed.
    pub fn load(&self) -> Result<Journal> {
        let path = self.config.state_path();

        if !path.exists() {
            debug!("No state at {:?}, starting fresh", path);
            return Ok(Journal::new());
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| JournalError::from_io(e, &path))
            .with_context(|| format!("Failed to read journal state from {:?}", path))?;

        let journal = serde_json::from_str(&content).map_err(|e| JournalError::CorruptState {
            path: path.clone(),
            details: e.to_string(),
        })?;

        Ok(journal)
    }

    /// Write the state and the rendered documents as one unit
    ///
    /// Every file is staged next to its target first; nothing is renamed
    /// into place until all of them were written successfully.
    pub fn save(&self, journal: &Journal, index: &str, archive: &str) -> Result<()> {
        let state = serde_json::to_string_pretty(journal).context("Failed to serialize journal")?;

        let targets = [
            (self.config.state_path(), state.as_bytes()),
            (self.config.index_path(), index.as_bytes()),
            (self.config.archive_path(), archive.as_bytes()),
        ];

        let mut staged = Vec::with_capacity(targets.len());
        for (path, data) in &targets {
            match stage(path, data) {
                Ok(temp) => staged.push((temp, path.clone())),
                Err(e) => {
                    discard(&staged);
                    return Err(e);
                }
            }
        }

        for (temp, path) in &staged {
            fs::rename(temp, path)
                .with_context(|| format!("Failed to rename {:?} to {:?}", temp, path))?;
        }

        debug!("Saved journal state to {:?}", self.config.state_path());
        Ok(())
    }
}

/// Write `data` to a temp file beside `path` and sync it to disk
fn stage(path: &Path, data: &[u8]) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let mut file = File::create(&temp_path)
        .with_context(|| format!("Failed to create temp file {:?}", temp_path))?;

    file.write_all(data)
        .with_context(|| format!("Failed to write to temp file {:?}", temp_path))?;

    file.sync_all()
        .with_context(|| format!("Failed to sync temp file {:?}", temp_path))?;

    Ok(temp_path)
}

fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (temp, _) in staged {
        let _ = fs::remove_file(temp);
    }
}

/// Write data to a file atomically
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    let temp_path = stage(path, data)?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename {:?} to {:?}", temp_path, path))?;
    Ok(())
}
