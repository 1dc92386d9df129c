//! Status command handler

use anyhow::Result;

use logbook_core::{Category, Store};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(store: &Store, output: &Output) -> Result<()> {
    let journal = store.journal();
    let config = store.config();

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "journal_dir": config.journal_dir,
                    "revision": journal.revision,
                    "editor": store.editor(),
                    "counts": {
                        "doing": journal.tag_count(Category::Doing),
                        "todo": journal.tag_count(Category::Todo),
                        "later": journal.tag_count(Category::Later)
                    },
                    "archived_months": journal.diary().keys().collect::<Vec<_>>()
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", journal.revision);
        }
        OutputFormat::Human => {
            println!("Logbook Status");
            println!("==============");
            println!();
            println!("Journal:  {}", config.journal_dir.display());
            println!(
                "Revision: {}",
                if journal.is_synchronized() {
                    journal.revision.as_str()
                } else {
                    "(never synchronized, next run rescans everything)"
                }
            );
            println!("Editor:   {}", store.editor());
            println!();
            println!("Tags:");
            for category in Category::ALL {
                println!(
                    "  {:<6} {} in {} note(s)",
                    category.label(),
                    journal.tag_count(category),
                    journal.tags(category).len()
                );
            }
            println!();
            let entries: usize = journal.diary().values().map(Vec::len).sum();
            println!(
                "Archive: {} month(s), {} diary entries",
                journal.diary().len(),
                entries
            );
        }
    }

    Ok(())
}
