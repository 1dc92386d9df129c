//! Index rendering
//!
//! Flattens the journal into the `index.md` document and the secondary
//! `.archive.md` listing of aged diary entries. Both are pure functions of
//! the journal, so an unchanged tree renders byte-identical output.

use crate::journal::Journal;
use crate::scanner::{Category, Tag};

/// Render the DOING / TODO / LATER index
///
/// Within a section tags run newest first; equal timestamps fall back to
/// note path, then line number.
pub fn render_index(journal: &Journal) -> String {
    let mut out = String::new();
    for (i, category) in Category::ALL.into_iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("# {}\n\n", category.label()));
        for tag in sorted_tags(journal, category) {
            out.push_str(&tag.text);
            out.push('\n');
        }
    }
    out
}

/// All tags of one category, newest first
pub fn sorted_tags(journal: &Journal, category: Category) -> Vec<&Tag> {
    // BTreeMap iteration gives path order, and per-note lists are in line
    // order, so a stable sort on time keeps both as tiebreakers.
    let mut tags: Vec<&Tag> = journal.tags(category).values().flatten().collect();
    tags.sort_by(|a, b| b.time.cmp(&a.time));
    tags
}

/// Render the month archive of aged diary entries, newest month first
pub fn render_archive(journal: &Journal) -> String {
    let mut out = String::from("# ARCHIVE\n");
    for (month, entries) in journal.diary().iter().rev() {
        out.push_str(&format!("\n## {}\n\n", month));
        for entry in entries {
            out.push_str(&format!("- [{}]({})\n", entry.day, entry.path));
        }
    }
    out
}
