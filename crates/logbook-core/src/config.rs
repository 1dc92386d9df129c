//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/logbook/config.toml)
//! 3. Environment variables (LOGBOOK_* prefix)
//!
//! Environment variables take precedence over config file values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable prefix
const ENV_PREFIX: &str = "LOGBOOK";

/// Name of the persisted aggregation state inside the journal tree
pub const STATE_FILE: &str = ".journal.json";

/// Name of the generated index document
pub const INDEX_FILE: &str = "index.md";

/// Name of the generated archive document, hidden so it cannot shadow a note
pub const ARCHIVE_FILE: &str = ".archive.md";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Root of the note tree
    #[serde(default = "default_journal_dir")]
    pub journal_dir: PathBuf,

    /// Editor command, overrides the one recorded in the journal state
    #[serde(default)]
    pub editor: Option<String>,

    /// Diary entries older than this many months go to the archive index
    #[serde(default = "default_retention_months")]
    pub retention_months: u32,

    /// Log file (logs go to stderr when unset)
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            journal_dir: default_journal_dir(),
            editor: None,
            retention_months: default_retention_months(),
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (LOGBOOK_JOURNAL_DIR, LOGBOOK_EDITOR)
    /// 2. Config file (~/.config/logbook/config.toml or LOGBOOK_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration, preferring an explicit path from the command line
    pub fn load_with_cli_override(path: Option<&PathBuf>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_path(p),
            None => Self::load(),
        }
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Configuration rooted at a specific journal directory, no file or env lookup
    pub fn for_journal(journal_dir: impl Into<PathBuf>) -> Self {
        Self {
            journal_dir: journal_dir.into(),
            ..Self::default()
        }
    }

    fn apply_env_overrides(&mut self) {
        // LOGBOOK_JOURNAL_DIR
        if let Ok(val) = std::env::var(format!("{}_JOURNAL_DIR", ENV_PREFIX)) {
            if !val.is_empty() {
                self.journal_dir = PathBuf::from(val);
            }
        }

        // LOGBOOK_EDITOR
        if let Ok(val) = std::env::var(format!("{}_EDITOR", ENV_PREFIX)) {
            self.editor = if val.is_empty() { None } else { Some(val) };
        }
    }

    /// Save configuration to a specific file
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(config_path, content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with LOGBOOK_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("logbook")
            .join("config.toml")
    }

    /// Path of the persisted journal state
    pub fn state_path(&self) -> PathBuf {
        self.journal_dir.join(STATE_FILE)
    }

    /// Path of the generated index
    pub fn index_path(&self) -> PathBuf {
        self.journal_dir.join(INDEX_FILE)
    }

    /// Path of the generated archive
    pub fn archive_path(&self) -> PathBuf {
        self.journal_dir.join(ARCHIVE_FILE)
    }
}

fn default_journal_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("journal")
}

fn default_retention_months() -> u32 {
    3
}
