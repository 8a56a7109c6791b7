//! Rendering of command results.

use std::fmt::Debug;

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use complyhub_core::error::AppError;

/// How command results are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

impl OutputFormat {
    /// Renders rows as a table, or as a JSON array.
    pub fn rows<T: Serialize + Tabled>(self, rows: &[T]) -> Result<(), AppError> {
        match self {
            Self::Json => print_json(rows),
            Self::Table if rows.is_empty() => {
                println!("(none)");
                Ok(())
            }
            Self::Table => {
                let mut table = Table::new(rows);
                table.with(Style::rounded());
                println!("{table}");
                Ok(())
            }
        }
    }

    /// Renders one value in its debug form, or as JSON.
    pub fn value<T: Serialize + Debug>(self, value: &T) -> Result<(), AppError> {
        match self {
            Self::Json => print_json(value),
            Self::Table => {
                println!("{value:#?}");
                Ok(())
            }
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Outcome marker for a status line.
#[derive(Debug, Clone, Copy)]
pub enum Status {
    Ok,
    Warn,
    Fail,
}

/// Prints a status line. Failures go to stderr.
pub fn status(status: Status, msg: &str) {
    match status {
        Status::Ok => println!("[ok]   {msg}"),
        Status::Warn => println!("[warn] {msg}"),
        Status::Fail => eprintln!("[fail] {msg}"),
    }
}

/// Prints an aligned `label: value` line.
pub fn field(label: &str, value: &str) {
    println!("  {:<22}{value}", format!("{label}:"));
}
