//! Tag extraction
//!
//! Notes are read line by line. A `## HH:MM:SS` heading moves the current
//! time forward; any line carrying a `*DOING*`, `*TODO*` or `*LATER*` token
//! becomes a tag, with the marker rewritten into a link back to the note.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use chrono::{NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{JournalError, JournalResult};
use crate::note::{is_generated_path, Note};

static TIME_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^##\s+(\d\d:\d\d:\d\d)\s*$").expect("valid time heading regex")
});

const TIME_FORMAT: &str = "%H:%M:%S";

/// The three kinds of tracked annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Doing,
    Todo,
    Later,
}

impl Category {
    /// All categories, in index order
    pub const ALL: [Category; 3] = [Category::Doing, Category::Todo, Category::Later];

    /// Heading label used in the index
    pub fn label(self) -> &'static str {
        match self {
            Category::Doing => "DOING",
            Category::Todo => "TODO",
            Category::Later => "LATER",
        }
    }

    /// Whitespace-isolated token that flags a line
    pub fn marker(self) -> &'static str {
        match self {
            Category::Doing => "*DOING*",
            Category::Todo => "*TODO*",
            Category::Later => "*LATER*",
        }
    }

    fn from_marker(token: &str) -> Option<Self> {
        Category::ALL.into_iter().find(|c| c.marker() == token)
    }

    fn link(self, path: &str, stamp: &str) -> String {
        format!("*[{}]({}#{})*", self.label(), path, stamp)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One extracted annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Most recent time heading at or before the line, else the note baseline
    pub time: NaiveDateTime,
    /// 1-based source line
    pub line: usize,
    /// Line text with markers replaced by links
    pub text: String,
}

/// Tags found in one note, split by category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    tags: [Vec<Tag>; 3],
}

impl ScanResult {
    pub fn get(&self, category: Category) -> &[Tag] {
        &self.tags[category.index()]
    }

    /// Take the tags of one category out of the result
    pub fn take(&mut self, category: Category) -> Vec<Tag> {
        std::mem::take(&mut self.tags[category.index()])
    }

    pub fn total(&self) -> usize {
        self.tags.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Extract tags from note text
///
/// Pure function of the note's path, baseline and text. Generated index
/// and archive files always yield nothing.
pub fn scan(note: &Note, text: &str) -> JournalResult<ScanResult> {
    let mut result = ScanResult::default();
    if is_generated_path(&note.path) {
        return Ok(result);
    }

    let date = note.date();
    let mut current = note.baseline;
    let mut stamp = current.format(TIME_FORMAT).to_string();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;

        if let Some(caps) = TIME_HEADING_RE.captures(line) {
            let value = &caps[1];
            let time = NaiveTime::parse_from_str(value, TIME_FORMAT).map_err(|_| {
                JournalError::InvalidTimestamp {
                    path: note.path.clone(),
                    line: line_no,
                    value: value.to_string(),
                }
            })?;
            current = date.and_time(time);
            stamp = value.to_string();
            continue;
        }

        let mut matched = [false; 3];
        let words: Vec<String> = line
            .split_whitespace()
            .map(|word| match Category::from_marker(word) {
                Some(category) => {
                    matched[category.index()] = true;
                    category.link(&note.path, &stamp)
                }
                None => word.to_string(),
            })
            .collect();

        if !matched.contains(&true) {
            continue;
        }

        let text = words.join(" ");
        for category in Category::ALL {
            if matched[category.index()] {
                result.tags[category.index()].push(Tag {
                    time: current,
                    line: line_no,
                    text: text.clone(),
                });
            }
        }
    }

    Ok(result)
}

/// Read a note from the journal tree and scan it
///
/// A vanished file surfaces as `JournalError::NotFound` so the caller can
/// purge the note instead of failing. Bytes that are not valid UTF-8 are
/// replaced; markers are plain ASCII and still match.
pub fn scan_file(root: &Path, note: &Note) -> JournalResult<ScanResult> {
    if is_generated_path(&note.path) {
        return Ok(ScanResult::default());
    }
    let full = root.join(&note.path);
    let bytes = fs::read(&full).map_err(|e| JournalError::from_io(e, &full))?;
    scan(note, &String::from_utf8_lossy(&bytes))
}
