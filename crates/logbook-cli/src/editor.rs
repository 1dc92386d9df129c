//! Interactive editing support
//!
//! Opens the configured editor on a file inside the journal tree.

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::process::Command;

/// Open `path` in `editor` and wait for it to exit
///
/// The editor command may carry its own arguments, e.g. `code --wait`.
pub fn edit_file(editor: &str, path: &Path) -> Result<()> {
    let (program, args) = split_command(editor)?;

    let status = Command::new(program)
        .args(args)
        .arg(path)
        .status()
        .with_context(|| format!("Failed to run editor: {}", editor))?;

    if !status.success() {
        bail!(
            "Editor '{}' exited with non-zero status. Check that your editor is configured correctly.",
            editor
        );
    }

    Ok(())
}

fn split_command(editor: &str) -> Result<(&str, Vec<&str>)> {
    let mut parts = editor.split_whitespace();
    let Some(program) = parts.next() else {
        bail!(
            "No editor configured. Set one with:\n  \
             logbook config set editor nvim"
        );
    };
    Ok((program, parts.collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_command() {
        let (program, args) = split_command("code --wait").unwrap();
        assert_eq!(program, "code");
        assert_eq!(args, vec!["--wait"]);

        let (program, args) = split_command("vim").unwrap();
        assert_eq!(program, "vim");
        assert!(args.is_empty());
    }

    #[test]
    fn test_empty_editor_is_error() {
        assert!(split_command("   ").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_edit_file_runs_command() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("note.md");
        std::fs::write(&path, "x\n").unwrap();

        assert!(edit_file("true", &path).is_ok());
        assert!(edit_file("false", &path).is_err());
    }
}
