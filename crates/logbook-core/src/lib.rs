//! Logbook Core Library
//!
//! This crate provides the core functionality for logbook, which keeps a
//! tree of markdown notes and diary entries and maintains a single index of
//! the `*DOING*`, `*TODO*` and `*LATER*` lines found in them.
//!
//! # Architecture
//!
//! - **Notes**: plain markdown files, the source of truth
//! - **Journal state**: tags aggregated per note, persisted as JSON
//! - **Revision source**: version control, used to rescan only what changed
//!
//! # Quick Start
//!
//! ```text
//! let mut store = Store::open(Config::load()?)?;
//! let git = GitRevisions::new(store.root());
//! let report = store.refresh(&git, Local::now().date_naive())?;
//! ```
//!
//! # Modules
//!
//! - `store`: Processing passes (main entry point)
//! - `note`: Note classification (diary entry vs plain note)
//! - `scanner`: Tag extraction from note text
//! - `journal`: Aggregation state
//! - `changes`: Selection of notes to rescan
//! - `render`: Index and archive documents
//! - `state`: Persistence of the journal state
//! - `vcs`: Revision tracking via git
//! - `config`: Application configuration

pub mod changes;
pub mod config;
pub mod error;
pub mod journal;
pub mod note;
pub mod render;
pub mod scanner;
pub mod state;
pub mod store;
pub mod vcs;

pub use config::Config;
pub use error::{JournalError, JournalResult};
pub use journal::{DiaryRef, Journal};
pub use note::{Note, NoteKind};
pub use scanner::{Category, ScanResult, Tag};
pub use store::{PassMode, PassReport, Store};
pub use vcs::{GitRevisions, RevisionSource};
