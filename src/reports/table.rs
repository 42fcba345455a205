//! Fixed-width table for terminals.

use super::{lifecycle_status, verdict, ReportError, ReportFormat, ReportGenerator};
use crate::model::ValidationResult;
use crate::pipeline::ValidationStats;
use indexmap::IndexMap;
use std::fmt::Write as _;

const MPN_WIDTH: usize = 24;
const STATUS_WIDTH: usize = 8;
const REF_WIDTH: usize = 22;
const LIFECYCLE_WIDTH: usize = 16;

/// Fixed-width table reporter.
pub struct TableReporter;

impl TableReporter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for TableReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for TableReporter {
    fn generate(
        &self,
        results: &IndexMap<String, ValidationResult>,
        stats: Option<&ValidationStats>,
    ) -> Result<String, ReportError> {
        let mut out = String::new();
        writeln!(
            out,
            "{:<MPN_WIDTH$} {:<STATUS_WIDTH$} {:<MPN_WIDTH$} {:<REF_WIDTH$} {:<LIFECYCLE_WIDTH$} NOTE",
            "MPN", "STATUS", "CANONICAL", "REFERENCE", "LIFECYCLE"
        )?;
        writeln!(
            out,
            "{}",
            "-".repeat(MPN_WIDTH * 2 + STATUS_WIDTH + REF_WIDTH + LIFECYCLE_WIDTH + 9)
        )?;

        for (mpn, result) in results {
            let note = match (&result.error, &result.category) {
                (Some(error), _) => error.as_str(),
                (None, Some(category)) => category.name.as_str(),
                (None, None) if !result.valid && !result.all_canonical_mpns.is_empty() => {
                    "did you mean a listed alternative?"
                }
                (None, None) => "",
            };
            writeln!(
                out,
                "{:<MPN_WIDTH$} {:<STATUS_WIDTH$} {:<MPN_WIDTH$} {:<REF_WIDTH$} {:<LIFECYCLE_WIDTH$} {}",
                truncate(mpn, MPN_WIDTH),
                verdict(result),
                truncate(result.canonical_mpn.as_deref().unwrap_or("-"), MPN_WIDTH),
                truncate(result.reference_part_number.as_deref().unwrap_or("-"), REF_WIDTH),
                truncate(lifecycle_status(result), LIFECYCLE_WIDTH),
                note.trim_end()
            )?;
        }

        if let Some(stats) = stats {
            writeln!(out)?;
            writeln!(
                out,
                "{} unique, {} valid, {} invalid, {} cache hits, {} API lookups, {} errors",
                stats.unique_mpns,
                stats.valid,
                stats.invalid,
                stats.cache_hits(),
                stats.api_lookups,
                stats.lookup_errors
            )?;
        }

        Ok(out)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Table
    }
}

/// Cut a cell to `width` characters, marking the cut with `~`.
fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
    cut.push('~');
    cut
}
