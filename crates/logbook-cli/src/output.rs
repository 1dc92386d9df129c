//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use logbook_core::{PassMode, PassReport};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print the summary of a processing pass
    pub fn print_report(&self, report: &PassReport) {
        match self.format {
            OutputFormat::Human => {
                let mode = match report.mode {
                    PassMode::Full => "Full rescan",
                    PassMode::Incremental => "Updated",
                };
                let removed = if report.removed > 0 {
                    format!(", {} removed", report.removed)
                } else {
                    String::new()
                };
                println!("{}: {} note(s) scanned{}", mode, report.scanned, removed);
                println!(
                    "  DOING: {}  TODO: {}  LATER: {}",
                    report.doing, report.todo, report.later
                );
                if report.archived > 0 {
                    println!("  Archived diary entries: {}", report.archived);
                }
            }
            OutputFormat::Json => match serde_json::to_string_pretty(report) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Failed to serialize report: {}", e),
            },
            OutputFormat::Quiet => {}
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({ "success": true, "message": message }))
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message (human mode only)
    pub fn message(&self, message: &str) {
        if matches!(self.format, OutputFormat::Human) {
            println!("{}", message);
        }
    }
}
