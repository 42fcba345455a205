//! CSV report generator.
//!
//! One row per normalized MPN, suitable for spreadsheet import.

use super::{lifecycle_status, verdict, ReportError, ReportFormat, ReportGenerator};
use crate::model::ValidationResult;
use crate::pipeline::ValidationStats;
use indexmap::IndexMap;
use std::fmt::Write as _;

const HEADER: &str =
    "MPN,Status,Canonical MPN,Alternatives,Reference Part,Category,Lifecycle,Site,Language,Currency,Error";

/// CSV report generator.
pub struct CsvReporter;

impl CsvReporter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for CsvReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for CsvReporter {
    fn generate(
        &self,
        results: &IndexMap<String, ValidationResult>,
        _stats: Option<&ValidationStats>,
    ) -> Result<String, ReportError> {
        let mut content = String::with_capacity(64 * (results.len() + 1));
        content.push_str(HEADER);
        content.push('\n');

        for (mpn, result) in results {
            writeln!(
                content,
                "\"{}\",{},\"{}\",\"{}\",\"{}\",\"{}\",\"{}\",{},{},{},\"{}\"",
                escape_csv(mpn),
                verdict(result),
                escape_csv(result.canonical_mpn.as_deref().unwrap_or("")),
                escape_csv(&result.all_canonical_mpns.join(";")),
                escape_csv(result.reference_part_number.as_deref().unwrap_or("")),
                escape_csv(result.category.as_ref().map_or("", |c| c.name.as_str())),
                escape_csv(lifecycle_status(result)),
                result.site,
                result.language,
                result.currency,
                escape_csv(result.error.as_deref().unwrap_or("")),
            )?;
        }

        Ok(content)
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Csv
    }
}

fn escape_csv(s: &str) -> String {
    s.replace('"', "\"\"").replace(['\n', '\r'], " ")
}
