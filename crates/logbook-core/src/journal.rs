//! Aggregation state
//!
//! The `Journal` holds every tag found in the tree, keyed by note path
//! per category, together with the archive of aged diary entries and the
//! last synchronized revision. It is the only persisted state besides the
//! notes themselves.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::note::{months_between, Note};
use crate::scanner::{Category, ScanResult, Tag};

/// Editor used when neither config nor state names one
pub const DEFAULT_EDITOR: &str = "vim";

/// A diary entry listed in the month archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiaryRef {
    /// Day of month, two digits
    pub day: String,
    pub path: String,
}

/// Aggregated tags and archive for the whole tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Journal {
    /// Last synchronized revision, empty when never synchronized
    #[serde(default)]
    pub revision: String,

    /// Editor command recorded with the journal
    #[serde(default = "default_editor")]
    pub editor: String,

    #[serde(default)]
    doing: BTreeMap<String, Vec<Tag>>,

    #[serde(default)]
    todo: BTreeMap<String, Vec<Tag>>,

    #[serde(default)]
    later: BTreeMap<String, Vec<Tag>>,

    /// `YYYY-MM` -> diary entries of that month
    #[serde(default)]
    diary: BTreeMap<String, Vec<DiaryRef>>,
}

impl Default for Journal {
    fn default() -> Self {
        Self {
            revision: String::new(),
            editor: default_editor(),
            doing: BTreeMap::new(),
            todo: BTreeMap::new(),
            later: BTreeMap::new(),
            diary: BTreeMap::new(),
        }
    }
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a revision marker has been recorded
    pub fn is_synchronized(&self) -> bool {
        !self.revision.is_empty()
    }

    /// Tags of one category, keyed by note path
    pub fn tags(&self, category: Category) -> &BTreeMap<String, Vec<Tag>> {
        match category {
            Category::Doing => &self.doing,
            Category::Todo => &self.todo,
            Category::Later => &self.later,
        }
    }

    fn tags_mut(&mut self, category: Category) -> &mut BTreeMap<String, Vec<Tag>> {
        match category {
            Category::Doing => &mut self.doing,
            Category::Todo => &mut self.todo,
            Category::Later => &mut self.later,
        }
    }

    /// Every note path holding at least one tag
    pub fn note_paths(&self) -> BTreeSet<&str> {
        Category::ALL
            .into_iter()
            .flat_map(|category| self.tags(category).keys())
            .map(String::as_str)
            .collect()
    }

    /// Number of tags in one category
    pub fn tag_count(&self, category: Category) -> usize {
        self.tags(category).values().map(Vec::len).sum()
    }

    /// Replace everything known about a note with a fresh scan
    ///
    /// Categories the scan left empty lose the note entirely.
    pub fn replace_note(&mut self, path: &str, mut scan: ScanResult) {
        for category in Category::ALL {
            let tags = scan.take(category);
            let slot = self.tags_mut(category);
            if tags.is_empty() {
                slot.remove(path);
            } else {
                slot.insert(path.to_string(), tags);
            }
        }
        debug!("Replaced tags for {}", path);
    }

    /// Drop a note from every category
    pub fn remove_note(&mut self, path: &str) {
        for category in Category::ALL {
            self.tags_mut(category).remove(path);
        }
        debug!("Removed tags for {}", path);
    }

    /// Clear all tags and the archive; revision and editor are kept
    pub fn reset(&mut self) {
        self.doing.clear();
        self.todo.clear();
        self.later.clear();
        self.diary.clear();
    }

    /// Archive a diary entry if its month is past the retention window
    ///
    /// Returns whether the entry was recorded.
    pub fn archive_diary(&mut self, note: &Note, today: NaiveDate, retention_months: u32) -> bool {
        if !note.is_diary() {
            return false;
        }
        let date = note.date();
        if months_between(today, date) <= retention_months as i32 {
            return false;
        }

        let key = date.format("%Y-%m").to_string();
        let entry = DiaryRef {
            day: date.format("%d").to_string(),
            path: note.path.clone(),
        };
        let month = self.diary.entry(key).or_default();
        if !month.contains(&entry) {
            month.push(entry);
            month.sort_by(|a, b| a.day.cmp(&b.day).then_with(|| a.path.cmp(&b.path)));
        }
        true
    }

    /// Archived diary entries by `YYYY-MM`
    pub fn diary(&self) -> &BTreeMap<String, Vec<DiaryRef>> {
        &self.diary
    }
}

fn default_editor() -> String {
    DEFAULT_EDITOR.to_string()
}
