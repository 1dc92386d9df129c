//! Processing passes
//!
//! The `Store` owns the journal state for one invocation and runs passes
//! over the note tree:
//! - select the notes to look at (full tree or changes since the marker)
//! - rescan each one, replacing its tags or purging it when it is gone
//! - advance the marker, render the index and persist everything together
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = Store::open(Config::load()?)?;
//! let report = store.refresh(&GitRevisions::new(store.root()), Local::now().date_naive())?;
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::changes::{select_changes, Selection};
use crate::config::Config;
use crate::journal::Journal;
use crate::note::Note;
use crate::render::{render_archive, render_index};
use crate::scanner::{scan_file, Category};
use crate::state::JournalPersistence;
use crate::vcs::RevisionSource;

/// How a pass chose its notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PassMode {
    Full,
    Incremental,
}

/// Summary of a completed pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub mode: PassMode,
    /// Notes read and rescanned
    pub scanned: usize,
    /// Notes purged because they no longer exist
    pub removed: usize,
    /// Diary entries recorded in the archive
    pub archived: usize,
    pub revision: String,
    pub doing: usize,
    pub todo: usize,
    pub later: usize,
}

/// Journal state plus the tree it describes
pub struct Store {
    journal: Journal,
    persistence: JournalPersistence,
    config: Config,
}

impl Store {
    /// Load the persisted state for the configured journal
    pub fn open(config: Config) -> Result<Self> {
        let persistence = JournalPersistence::new(config.clone());
        let journal = persistence
            .load()
            .context("Failed to load journal state")?;

        Ok(Self {
            journal,
            persistence,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Root of the note tree
    pub fn root(&self) -> &Path {
        &self.config.journal_dir
    }

    /// Editor command: config override first, then the recorded one
    pub fn editor(&self) -> &str {
        self.config
            .editor
            .as_deref()
            .unwrap_or(self.journal.editor.as_str())
    }

    /// Run a pass: incremental when a marker is recorded, full otherwise
    pub fn refresh(&mut self, source: &dyn RevisionSource, today: NaiveDate) -> Result<PassReport> {
        let selection = select_changes(&self.journal, self.root(), source)
            .context("Failed to determine changed notes")?;
        self.run(selection, source, today)
    }

    /// Run a full pass regardless of the recorded marker
    pub fn rebuild(&mut self, source: &dyn RevisionSource, today: NaiveDate) -> Result<PassReport> {
        let notes = crate::changes::list_notes(self.root()).context("Failed to list notes")?;
        self.run(Selection::Full(notes), source, today)
    }

    fn run(
        &mut self,
        selection: Selection,
        source: &dyn RevisionSource,
        today: NaiveDate,
    ) -> Result<PassReport> {
        // Work on a copy so a failed pass leaves the loaded state untouched
        let mut journal = self.journal.clone();
        let mut report = PassReport {
            mode: PassMode::Incremental,
            scanned: 0,
            removed: 0,
            archived: 0,
            revision: String::new(),
            doing: 0,
            todo: 0,
            later: 0,
        };

        match selection {
            Selection::Full(paths) => {
                report.mode = PassMode::Full;
                info!("Full rescan of {} notes", paths.len());
                journal.reset();
                for path in &paths {
                    let Some(note) = self.process(&mut journal, path, &mut report)? else {
                        continue;
                    };
                    if journal.archive_diary(&note, today, self.config.retention_months) {
                        report.archived += 1;
                    }
                }
            }
            Selection::Incremental(changes) => {
                info!(
                    "Incremental rescan: {} changed, {} removed",
                    changes.scan.len(),
                    changes.removed.len()
                );
                for path in &changes.scan {
                    self.process(&mut journal, path, &mut report)?;
                }
                for path in &changes.removed {
                    journal.remove_note(path);
                    report.removed += 1;
                }
            }
        }

        journal.revision = source
            .current_revision()
            .context("Failed to read current revision")?;

        let index = render_index(&journal);
        let archive = render_archive(&journal);
        self.persistence
            .save(&journal, &index, &archive)
            .context("Failed to save journal")?;

        report.revision = journal.revision.clone();
        report.doing = journal.tag_count(Category::Doing);
        report.todo = journal.tag_count(Category::Todo);
        report.later = journal.tag_count(Category::Later);
        self.journal = journal;

        info!(
            "Pass complete: {} scanned, {} removed, {} DOING / {} TODO / {} LATER",
            report.scanned, report.removed, report.doing, report.todo, report.later
        );
        Ok(report)
    }

    /// Rescan one note into `journal`; a vanished note is purged instead
    fn process(
        &self,
        journal: &mut Journal,
        path: &str,
        report: &mut PassReport,
    ) -> Result<Option<Note>> {
        let scanned = Note::open(self.root(), path)
            .and_then(|note| scan_file(self.root(), &note).map(|tags| (note, tags)));

        match scanned {
            Ok((note, tags)) => {
                debug!("Scanned {}: {} tags", path, tags.total());
                journal.replace_note(path, tags);
                report.scanned += 1;
                Ok(Some(note))
            }
            Err(e) if e.is_missing() => {
                warn!("Note {} disappeared, dropping its tags", path);
                journal.remove_note(path);
                report.removed += 1;
                Ok(None)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to process note '{}'", path)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::JournalResult;
    use std::cell::RefCell;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    /// In-memory stand-in for the version-control working copy
    #[derive(Default)]
    struct FakeRevisions {
        untracked: RefCell<BTreeSet<String>>,
        changed: RefCell<BTreeSet<String>>,
        revision: RefCell<String>,
    }

    impl FakeRevisions {
        fn at(revision: &str) -> Self {
            let fake = Self::default();
            *fake.revision.borrow_mut() = revision.to_string();
            fake
        }

        fn set_changed(&self, paths: &[&str]) {
            *self.changed.borrow_mut() = paths.iter().map(|s| s.to_string()).collect();
        }

        fn set_untracked(&self, paths: &[&str]) {
            *self.untracked.borrow_mut() = paths.iter().map(|s| s.to_string()).collect();
        }
    }

    impl RevisionSource for FakeRevisions {
        fn untracked_files(&self) -> JournalResult<BTreeSet<String>> {
            Ok(self.untracked.borrow().clone())
        }

        fn changed_files_since(&self, _marker: &str) -> JournalResult<BTreeSet<String>> {
            Ok(self.changed.borrow().clone())
        }

        fn current_revision(&self) -> JournalResult<String> {
            Ok(self.revision.borrow().clone())
        }
    }

    fn write(root: &Path, path: &str, text: &str) {
        let full = root.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, text).unwrap();
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
    }

    fn open(temp_dir: &TempDir) -> Store {
        Store::open(Config::for_journal(temp_dir.path())).unwrap()
    }

    fn index(temp_dir: &TempDir) -> String {
        fs::read_to_string(temp_dir.path().join("index.md")).unwrap()
    }

    #[test]
    fn test_first_pass_is_full() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(
            root,
            "2024/03/2024-03-05.md",
            "# Note 2024-03-05\n## 09:00:00\nbuy milk *TODO*\n",
        );

        let mut store = open(&temp_dir);
        let report = store.refresh(&FakeRevisions::at("rev1"), today()).unwrap();

        assert_eq!(report.mode, PassMode::Full);
        assert_eq!(report.scanned, 1);
        assert_eq!(report.todo, 1);
        assert_eq!(store.journal().revision, "rev1");
        assert_eq!(
            index(&temp_dir),
            "# DOING\n\n\n# TODO\n\nbuy milk *[TODO](2024/03/2024-03-05.md#09:00:00)*\n\n# LATER\n\n"
        );
    }

    #[test]
    fn test_full_rescan_is_byte_identical() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "2024/03/2024-03-05.md", "## 09:00:00\na *TODO*\nb *DOING*\n");
        write(root, "2024/03/2024-03-06.md", "## 09:00:00\nc *TODO*\n");
        write(root, "ideas.md", "d *LATER*\n");

        let source = FakeRevisions::at("rev1");
        let mut store = open(&temp_dir);
        store.rebuild(&source, today()).unwrap();
        let first = index(&temp_dir);
        let state = fs::read_to_string(root.join(".journal.json")).unwrap();

        let mut store = open(&temp_dir);
        store.rebuild(&source, today()).unwrap();
        assert_eq!(index(&temp_dir), first);
        assert_eq!(fs::read_to_string(root.join(".journal.json")).unwrap(), state);
    }

    #[test]
    fn test_incremental_only_touches_changed_notes() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "a.md", "old a *TODO*\n");
        write(root, "b.md", "old b *TODO*\n");

        let source = FakeRevisions::at("rev1");
        let mut store = open(&temp_dir);
        store.refresh(&source, today()).unwrap();

        // b.md changes on disk but is not reported, so its old tag stays
        write(root, "a.md", "new a *DOING*\n");
        write(root, "b.md", "new b *LATER*\n");
        source.set_changed(&["a.md"]);

        let mut store = open(&temp_dir);
        let report = store.refresh(&source, today()).unwrap();
        assert_eq!(report.mode, PassMode::Incremental);
        assert_eq!(report.scanned, 1);

        let journal = store.journal();
        assert!(!journal.tags(Category::Todo).contains_key("a.md"));
        assert!(journal.tags(Category::Doing).contains_key("a.md"));
        assert!(journal.tags(Category::Todo)["b.md"][0].text.starts_with("old b"));
        assert!(journal.tags(Category::Later).is_empty());
    }

    #[test]
    fn test_incremental_picks_up_untracked_notes() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let source = FakeRevisions::at("rev1");
        let mut store = open(&temp_dir);
        store.refresh(&source, today()).unwrap();

        write(root, "fresh.md", "brand new *TODO*\n");
        source.set_untracked(&["fresh.md"]);
        let report = store.refresh(&source, today()).unwrap();

        assert_eq!(report.scanned, 1);
        assert_eq!(report.todo, 1);
    }

    #[test]
    fn test_deleted_note_is_purged() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "gone.md", "x *TODO*\ny *DOING*\nz *LATER*\n");
        write(root, "kept.md", "k *TODO*\n");

        let source = FakeRevisions::at("rev1");
        let mut store = open(&temp_dir);
        store.refresh(&source, today()).unwrap();
        assert_eq!(store.journal().tag_count(Category::Todo), 2);

        fs::remove_file(root.join("gone.md")).unwrap();
        source.set_changed(&["gone.md"]);
        let report = store.refresh(&source, today()).unwrap();

        assert_eq!(report.removed, 1);
        for category in Category::ALL {
            assert!(!store.journal().tags(category).contains_key("gone.md"));
        }
        assert!(store.journal().tags(Category::Todo).contains_key("kept.md"));
        assert!(!index(&temp_dir).contains("gone.md"));
    }

    #[test]
    fn test_uncommitted_note_deleted_before_commit_is_purged() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let source = FakeRevisions::at("rev1");
        let mut store = open(&temp_dir);
        store.refresh(&source, today()).unwrap();

        write(root, "scratch.md", "draft *TODO*\n");
        source.set_untracked(&["scratch.md"]);
        assert_eq!(store.refresh(&source, today()).unwrap().todo, 1);

        // Gone again before any commit: git reports it nowhere
        fs::remove_file(root.join("scratch.md")).unwrap();
        source.set_untracked(&[]);
        let report = store.refresh(&source, today()).unwrap();

        assert_eq!(report.removed, 1);
        assert_eq!(report.todo, 0);
        assert!(!index(&temp_dir).contains("scratch.md"));
    }

    #[test]
    fn test_user_archive_note_is_kept_and_scanned() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "archive.md", "my old stuff *LATER*\n");
        write(root, "2023/10/2023-10-02.md", "# Note\n");

        let source = FakeRevisions::at("rev1");
        let mut store = open(&temp_dir);
        let report = store.rebuild(&source, today()).unwrap();
        assert_eq!(report.later, 1);
        assert_eq!(report.archived, 1);

        let report = store.rebuild(&source, today()).unwrap();
        assert_eq!(report.later, 1);
        assert_eq!(
            fs::read_to_string(root.join("archive.md")).unwrap(),
            "my old stuff *LATER*\n"
        );
        let generated = fs::read_to_string(root.join(".archive.md")).unwrap();
        assert!(generated.starts_with("# ARCHIVE\n"));
        assert!(!store.journal().tags(Category::Later).contains_key(".archive.md"));
    }

    #[test]
    fn test_non_utf8_note_does_not_abort_pass() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("latin1.md"), b"caf\xe9 *TODO*\n").unwrap();
        write(root, "ok.md", "fine *DOING*\n");

        let mut store = open(&temp_dir);
        let report = store.refresh(&FakeRevisions::at("rev1"), today()).unwrap();
        assert_eq!(report.scanned, 2);
        assert_eq!(report.todo, 1);
        assert_eq!(report.doing, 1);
    }

    #[test]
    fn test_full_rescan_archives_old_diary_entries() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "2023/10/2023-10-02.md", "# Note\n");
        write(root, "2023/11/2023-11-30.md", "# Note\n");
        write(root, "2024/03/2024-03-05.md", "# Note\n");

        let source = FakeRevisions::at("rev1");
        let mut store = open(&temp_dir);
        let report = store.refresh(&source, today()).unwrap();

        assert_eq!(report.archived, 2);
        let months: Vec<_> = store.journal().diary().keys().cloned().collect();
        assert_eq!(months, vec!["2023-10", "2023-11"]);

        let archive = fs::read_to_string(root.join(".archive.md")).unwrap();
        assert!(archive.contains("- [30](2023/11/2023-11-30.md)"));

        // Incremental passes leave the archive as it was
        write(root, "2023/09/2023-09-01.md", "# Note\n");
        source.set_untracked(&["2023/09/2023-09-01.md"]);
        let report = store.refresh(&source, today()).unwrap();
        assert_eq!(report.archived, 0);
        assert_eq!(store.journal().diary().len(), 2);
    }

    #[test]
    fn test_failed_pass_keeps_previous_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(root, "a.md", "a *TODO*\n");

        let source = FakeRevisions::at("rev1");
        let mut store = open(&temp_dir);
        store.refresh(&source, today()).unwrap();
        let before = index(&temp_dir);

        write(root, "bad.md", "## 99:00:00\nb *TODO*\n");
        source.set_untracked(&["bad.md"]);
        assert!(store.refresh(&source, today()).is_err());

        assert_eq!(index(&temp_dir), before);
        assert!(!store.journal().tags(Category::Todo).contains_key("bad.md"));
    }

    #[test]
    fn test_passes_over_a_git_working_copy() {
        use crate::vcs::test_repo::{commit_all, git_available, init};
        use crate::vcs::GitRevisions;

        if !git_available() {
            eprintln!("git not installed, skipping");
            return;
        }
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        init(root);
        fs::write(root.join(".gitignore"), ".journal.json\n*.tmp\n").unwrap();
        write(root, "a.md", "first a *TODO*\n");
        write(root, "b.md", "first b *DOING*\n");
        commit_all(root, "notes");

        let git = GitRevisions::new(root);
        let mut store = open(&temp_dir);
        let report = store.refresh(&git, today()).unwrap();
        assert_eq!(report.mode, PassMode::Full);
        assert_eq!((report.todo, report.doing), (1, 1));

        // Modify, delete and add without committing
        write(root, "a.md", "second a *LATER*\n");
        fs::remove_file(root.join("b.md")).unwrap();
        write(root, "c.md", "new c *TODO*\n");

        let mut store = open(&temp_dir);
        let report = store.refresh(&git, today()).unwrap();
        assert_eq!(report.mode, PassMode::Incremental);
        assert_eq!((report.doing, report.todo, report.later), (0, 1, 1));
        let journal = store.journal();
        assert!(journal.tags(Category::Later).contains_key("a.md"));
        assert!(journal.tags(Category::Todo).contains_key("c.md"));
        assert!(!journal.tags(Category::Doing).contains_key("b.md"));

        // A scratch note that never reaches a commit
        write(root, "scratch.md", "draft *DOING*\n");
        assert_eq!(store.refresh(&git, today()).unwrap().doing, 1);
        fs::remove_file(root.join("scratch.md")).unwrap();
        let report = store.refresh(&git, today()).unwrap();
        assert_eq!(report.doing, 0);
        assert!(!index(&temp_dir).contains("scratch.md"));

        // The marker still points at the first commit, so the edits are seen once more
        commit_all(root, "more notes");
        let report = store.refresh(&git, today()).unwrap();
        assert_eq!((report.doing, report.todo, report.later), (0, 1, 1));
        assert_eq!(report.scanned, 2);

        let report = store.refresh(&git, today()).unwrap();
        assert_eq!((report.scanned, report.removed), (0, 0));
        assert_eq!((report.doing, report.todo, report.later), (0, 1, 1));
    }

    #[test]
    fn test_editor_resolution() {
        let temp_dir = TempDir::new().unwrap();
        let store = open(&temp_dir);
        assert_eq!(store.editor(), crate::journal::DEFAULT_EDITOR);

        let mut config = Config::for_journal(temp_dir.path());
        config.editor = Some("hx".to_string());
        let store = Store::open(config).unwrap();
        assert_eq!(store.editor(), "hx");
    }
}
