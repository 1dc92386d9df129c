//! Index command handler

use anyhow::{Context, Result};

use logbook_core::Store;

use crate::commands::refresh;
use crate::editor::edit_file;
use crate::output::Output;

/// Refresh the index, open it in the editor, then pick up any edits
pub fn open(store: &mut Store, output: &Output) -> Result<()> {
    refresh::refresh(store, output)?;

    let index_path = store.config().index_path();
    edit_file(store.editor(), &index_path).context("Failed to edit index")?;

    refresh::refresh(store, output)
}
