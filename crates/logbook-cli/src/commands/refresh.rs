//! Refresh command handlers

use anyhow::Result;
use chrono::Local;

use logbook_core::{GitRevisions, Store};

use crate::output::Output;

/// Update the index, rescanning only what changed when possible
pub fn refresh(store: &mut Store, output: &Output) -> Result<()> {
    let git = GitRevisions::new(store.root());
    let report = store.refresh(&git, Local::now().date_naive())?;
    output.print_report(&report);
    Ok(())
}

/// Rebuild the index from every note in the tree
pub fn rebuild(store: &mut Store, output: &Output) -> Result<()> {
    let git = GitRevisions::new(store.root());
    let report = store.rebuild(&git, Local::now().date_naive())?;
    output.print_report(&report);
    Ok(())
}
