//! Output formatting for CLI commands

use anyhow::{Context, Result};
use serde::Serialize;

/// Output format selected by the global `--json` / `--plain` flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    /// Tab-separated values, one record per line
    Plain,
}

impl OutputFormat {
    pub fn from_flags(json: bool, plain: bool) -> Self {
        if json {
            OutputFormat::Json
        } else if plain {
            OutputFormat::Plain
        } else {
            OutputFormat::Text
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Prints indented JSON
    pub fn json<T: Serialize + ?Sized>(&self, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data).context("Failed to encode JSON output")?;
        println!("{}", json);
        Ok(())
    }

    /// Prints a TSV row
    pub fn row<S: AsRef<str>>(&self, columns: &[S]) {
        println!("{}", tsv_row(columns));
    }

    pub fn line(&self, message: impl std::fmt::Display) {
        println!("{}", message);
    }
}

pub fn tsv_row<S: AsRef<str>>(columns: &[S]) -> String {
    columns.iter().map(AsRef::as_ref).collect::<Vec<_>>().join("\t")
}
