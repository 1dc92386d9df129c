//! Note identity and classification
//!
//! A note is a markdown file in the journal tree, identified by its path
//! relative to the tree root. Files laid out as `YYYY/MM/YYYY-MM-DD.md`
//! are diary entries dated by their name; everything else is plain text
//! dated by its modification time.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, SubsecRound};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{ARCHIVE_FILE, INDEX_FILE};
use crate::error::{JournalError, JournalResult};

static DIARY_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})/(\d{2})/(\d{4})-(\d{2})-(\d{2})\.md$").expect("valid diary path regex")
});

/// How a note is dated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteKind {
    /// Freeform note, dated by modification time
    PlainText,
    /// `YYYY/MM/YYYY-MM-DD.md`, dated midnight of that day
    DiaryEntry,
}

/// A single note file in the journal tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    /// Path relative to the journal root, `/`-separated
    pub path: String,
    pub kind: NoteKind,
    /// Timestamp tags fall back to before any time heading
    pub baseline: NaiveDateTime,
}

impl Note {
    /// Classify the note at `path`, reading its modification time if needed
    ///
    /// Diary entries never touch the filesystem. Plain notes fail with
    /// `JournalError::NotFound` when the file is gone.
    pub fn open(root: &Path, path: &str) -> JournalResult<Self> {
        if let Some(date) = diary_date(path) {
            return Ok(Self::diary(path, date));
        }

        let full = root.join(path);
        let modified = fs::metadata(&full)
            .and_then(|m| m.modified())
            .map_err(|e| JournalError::from_io(e, &full))?;
        let modified = DateTime::<Local>::from(modified)
            .naive_local()
            .trunc_subsecs(0);

        Ok(Self::with_modified(path, modified))
    }

    /// Classify a note given its modification time
    pub fn with_modified(path: impl Into<String>, modified: NaiveDateTime) -> Self {
        let path = path.into();
        match diary_date(&path) {
            Some(date) => Self::diary(path, date),
            None => Self {
                path,
                kind: NoteKind::PlainText,
                baseline: modified,
            },
        }
    }

    fn diary(path: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            path: path.into(),
            kind: NoteKind::DiaryEntry,
            baseline: date.and_time(chrono::NaiveTime::MIN),
        }
    }

    pub fn is_diary(&self) -> bool {
        self.kind == NoteKind::DiaryEntry
    }

    /// Calendar date of the baseline timestamp
    pub fn date(&self) -> NaiveDate {
        self.baseline.date()
    }
}

/// Date encoded by a diary path, if the path is one
///
/// The year and month in the folders must repeat in the file name, and the
/// date must exist on the calendar.
pub fn diary_date(path: &str) -> Option<NaiveDate> {
    let caps = DIARY_PATH_RE.captures(path)?;
    if caps[1] != caps[3] || caps[2] != caps[4] {
        return None;
    }
    let year = caps[3].parse().ok()?;
    let month = caps[4].parse().ok()?;
    let day = caps[5].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Whether `path` is a generated index that must never be scanned
pub fn is_index_path(path: &str) -> bool {
    path == INDEX_FILE || path.ends_with(&format!("/{}", INDEX_FILE))
}

/// Whether `path` is written by logbook itself rather than by the user
pub fn is_generated_path(path: &str) -> bool {
    is_index_path(path) || path == ARCHIVE_FILE
}

/// Whole calendar months from `earlier` to `later`, ignoring days
pub fn months_between(later: NaiveDate, earlier: NaiveDate) -> i32 {
    (later.year() * 12 + later.month() as i32) - (earlier.year() * 12 + earlier.month() as i32)
}
