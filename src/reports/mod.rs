//! Rendering of validation results.
//!
//! Supports JSON (pretty, optionally with batch statistics), CSV for
//! spreadsheet import, and a fixed-width table for terminals.

mod csv;
mod json;
mod table;

pub use self::csv::CsvReporter;
pub use json::JsonReporter;
pub use table::TableReporter;

use crate::model::ValidationResult;
use crate::pipeline::ValidationStats;
use clap::ValueEnum;
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Write;
use thiserror::Error;

/// Output format for validation results
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Pretty-printed JSON
    Json,
    /// Fixed-width table for terminal
    #[default]
    Table,
    /// CSV for spreadsheet import
    Csv,
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Table => write!(f, "table"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Errors that can occur during report generation
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Format error: {0}")]
    FormatError(#[from] std::fmt::Error),
}

/// Trait for report generators
pub trait ReportGenerator {
    /// Render a result map, with optional batch statistics.
    fn generate(
        &self,
        results: &IndexMap<String, ValidationResult>,
        stats: Option<&ValidationStats>,
    ) -> Result<String, ReportError>;

    /// Write the rendered report to a writer
    fn write_report(
        &self,
        results: &IndexMap<String, ValidationResult>,
        stats: Option<&ValidationStats>,
        writer: &mut dyn Write,
    ) -> Result<(), ReportError> {
        let report = self.generate(results, stats)?;
        writer.write_all(report.as_bytes())?;
        Ok(())
    }

    /// Get the format this generator produces
    fn format(&self) -> ReportFormat;
}

/// Create a report generator for the given format.
#[must_use]
pub fn create_reporter(format: ReportFormat) -> Box<dyn ReportGenerator> {
    match format {
        ReportFormat::Json => Box::new(JsonReporter::new()),
        ReportFormat::Table => Box::new(TableReporter::new()),
        ReportFormat::Csv => Box::new(CsvReporter::new()),
    }
}

/// Short verdict label for a result.
pub(crate) fn verdict(result: &ValidationResult) -> &'static str {
    if result.valid {
        "valid"
    } else if result.is_error() {
        "error"
    } else {
        "invalid"
    }
}

/// Lifecycle status column value.
pub(crate) fn lifecycle_status(result: &ValidationResult) -> &str {
    result
        .lifecycle
        .as_ref()
        .and_then(|l| l.status.as_deref())
        .unwrap_or("-")
}
