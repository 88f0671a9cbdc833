//! Rendering of command results as tables or JSON.

use std::fmt;

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use attachkit_core::error::AppError;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Print rows in the selected format. An empty table prints a placeholder.
pub fn print_rows<T: Serialize + Tabled>(rows: &[T], format: OutputFormat) -> Result<(), AppError> {
    match format {
        OutputFormat::Table if rows.is_empty() => println!("(none)"),
        OutputFormat::Table => println!("{}", Table::new(rows).with(Style::rounded())),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(rows)?),
    }
    Ok(())
}

/// Print a single row. JSON output is an object rather than an array.
pub fn print_row<T: Serialize + Tabled>(row: &T, format: OutputFormat) -> Result<(), AppError> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(row)?);
            Ok(())
        }
        OutputFormat::Table => print_rows(std::slice::from_ref(row), format),
    }
}

/// One-line status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    /// Operation completed
    Success,
    /// Completed with nothing done or a degraded result
    Warning,
    /// Command failed
    Error,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "✓"),
            Self::Warning => write!(f, "⚠"),
            Self::Error => write!(f, "✗"),
        }
    }
}

/// Print a status line. Errors go to stderr.
pub fn notify(notice: Notice, msg: &str) {
    match notice {
        Notice::Error => eprintln!("{notice} {msg}"),
        _ => println!("{notice} {msg}"),
    }
}
