//! Diary command handler
//!
//! Today's entry lives at `YYYY/MM/YYYY-MM-DD.md`. Each invocation adds a
//! `## HH:MM:SS` heading so new lines get the current time.

use std::fs;
use std::io;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};

use logbook_core::state::atomic_write;
use logbook_core::Store;

use crate::commands::refresh;
use crate::editor::edit_file;
use crate::output::Output;

/// Open today's diary entry with a fresh time heading, then refresh
pub fn create(store: &mut Store, output: &Output) -> Result<()> {
    let now = Local::now().naive_local();
    let rel_path = diary_path(now.date());
    let full_path = store.root().join(&rel_path);

    let existing = match fs::read_to_string(&full_path) {
        Ok(text) => Some(text),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read diary entry {:?}", full_path))
        }
    };

    let content = seed_entry(existing.as_deref(), now);
    atomic_write(&full_path, content.as_bytes())
        .with_context(|| format!("Failed to create diary entry {}", rel_path))?;
    output.message(&format!("Editing {}", rel_path));

    edit_file(store.editor(), &full_path).context("Failed to edit diary entry")?;

    refresh::refresh(store, output)
}

/// Relative path of the diary entry for `date`
fn diary_path(date: NaiveDate) -> String {
    date.format("%Y/%m/%Y-%m-%d.md").to_string()
}

/// Entry text with a heading for `now` appended
fn seed_entry(existing: Option<&str>, now: NaiveDateTime) -> String {
    let heading = format!("## {}\n\n", now.format("%H:%M:%S"));
    match existing {
        None => format!("# Note {}\n\n{}", now.format("%Y-%m-%d"), heading),
        Some(text) => {
            let body = text.trim_end();
            if body.is_empty() {
                heading
            } else {
                format!("{}\n\n{}", body, heading)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logbook_core::{Note, NoteKind};

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-03-05T09:15:00", "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn test_diary_path_is_a_diary_entry() {
        let path = diary_path(now().date());
        assert_eq!(path, "2024/03/2024-03-05.md");
        assert_eq!(Note::with_modified(path, now()).kind, NoteKind::DiaryEntry);
    }

    #[test]
    fn test_seed_new_entry() {
        assert_eq!(
            seed_entry(None, now()),
            "# Note 2024-03-05\n\n## 09:15:00\n\n"
        );
    }

    #[test]
    fn test_seed_existing_entry() {
        let existing = "# Note 2024-03-05\n\n## 08:00:00\n\nbuy milk *TODO*\n\n\n";
        assert_eq!(
            seed_entry(Some(existing), now()),
            "# Note 2024-03-05\n\n## 08:00:00\n\nbuy milk *TODO*\n\n## 09:15:00\n\n"
        );
    }
}
