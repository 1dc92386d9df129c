//! Journal error handling
//!
//! Typed errors for scanning, classification and persistence. Only a missing
//! note is recoverable; everything else aborts the pass.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while processing the journal
#[derive(Error, Debug)]
pub enum JournalError {
    /// File not found (when expected to exist)
    #[error("File not found: '{path}'")]
    NotFound { path: PathBuf },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to read file
    #[error("Failed to read '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Persisted journal state cannot be parsed
    #[error("Journal state at '{path}' is corrupted: {details}")]
    CorruptState { path: PathBuf, details: String },

    /// A `## HH:MM:SS` heading that is not a valid time of day
    #[error("Invalid time heading '{value}' in '{path}' at line {line}")]
    InvalidTimestamp {
        path: String,
        line: usize,
        value: String,
    },

    /// Revision tracking command failed
    #[error("Version control command `{command}` failed: {details}")]
    Vcs { command: String, details: String },
}

impl JournalError {
    /// Create a read error from an I/O error with path context
    ///
    /// Classifies the error based on its kind.
    pub fn from_io(error: io::Error, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match error.kind() {
            io::ErrorKind::NotFound => JournalError::NotFound { path },
            io::ErrorKind::PermissionDenied => JournalError::PermissionDenied {
                path,
                source: error,
            },
            _ => JournalError::Read {
                path,
                source: error,
            },
        }
    }

    /// Whether this error means the note is gone from disk
    pub fn is_missing(&self) -> bool {
        matches!(self, JournalError::NotFound { .. })
    }
}

/// Result type for journal operations
pub type JournalResult<T> = Result<T, JournalError>;
