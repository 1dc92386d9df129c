//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use logbook_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "journal_dir": config.journal_dir,
                    "editor": config.editor,
                    "retention_months": config.retention_months,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.journal_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  journal_dir:      {}", config.journal_dir.display());
            println!(
                "  editor:           {}",
                config.editor.as_deref().unwrap_or("(from journal state)")
            );
            println!("  retention_months: {}", config.retention_months);
            println!(
                "  log_file:         {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "journal_dir" => {
            config.journal_dir = value.into();
        }
        "editor" => {
            config.editor = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.to_string())
            };
        }
        "retention_months" => {
            config.retention_months = value
                .parse()
                .context("Invalid value for retention_months. Use a whole number of months.")?;
        }
        "log_file" => {
            config.log_file = if value.is_empty() || value == "none" {
                None
            } else {
                Some(value.into())
            };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: journal_dir, editor, retention_months, log_file",
                key
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::for_journal("/notes");

        apply(&mut config, "editor", "nvim").unwrap();
        assert_eq!(config.editor.as_deref(), Some("nvim"));
        apply(&mut config, "editor", "none").unwrap();
        assert!(config.editor.is_none());

        apply(&mut config, "retention_months", "6").unwrap();
        assert_eq!(config.retention_months, 6);

        apply(&mut config, "journal_dir", "/elsewhere").unwrap();
        assert_eq!(config.journal_dir, PathBuf::from("/elsewhere"));
    }

    #[test]
    fn test_apply_rejects_bad_input() {
        let mut config = Config::for_journal("/notes");
        assert!(apply(&mut config, "retention_months", "soon").is_err());
        assert!(apply(&mut config, "sync_url", "ws://x").is_err());
    }
}
