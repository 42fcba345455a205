//! JSON report generator.

use super::{ReportError, ReportFormat, ReportGenerator};
use crate::model::ValidationResult;
use crate::pipeline::ValidationStats;
use indexmap::IndexMap;
use serde::Serialize;

/// Pretty-printed JSON.
///
/// Without statistics the document is the bare result map keyed by
/// normalized MPN; with statistics it becomes `{ "results", "stats" }`.
pub struct JsonReporter {
    pretty: bool,
}

#[derive(Serialize)]
struct Envelope<'a> {
    results: &'a IndexMap<String, ValidationResult>,
    stats: &'a ValidationStats,
}

impl JsonReporter {
    #[must_use]
    pub const fn new() -> Self {
        Self { pretty: true }
    }

    #[must_use]
    pub const fn compact() -> Self {
        Self { pretty: false }
    }

    fn render<T: Serialize>(&self, value: &T) -> Result<String, ReportError> {
        let rendered = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        rendered.map_err(|e| ReportError::SerializationError(e.to_string()))
    }
}

impl Default for JsonReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportGenerator for JsonReporter {
    fn generate(
        &self,
        results: &IndexMap<String, ValidationResult>,
        stats: Option<&ValidationStats>,
    ) -> Result<String, ReportError> {
        match stats {
            Some(stats) => self.render(&Envelope { results, stats }),
            None => self.render(results),
        }
    }

    fn format(&self) -> ReportFormat {
        ReportFormat::Json
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::test_support::sample_results;

    #[test]
    fn test_bare_result_map() {
        let json = JsonReporter::new().generate(&sample_results(), None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 3);
        assert_eq!(value["lm358n"]["canonicalMpn"], "LM358N");
        assert_eq!(value["xyz123"]["valid"], false);
    }

    #[test]
    fn test_envelope_with_stats() {
        let stats = ValidationStats {
            unique_mpns: 3,
            ..ValidationStats::default()
        };
        let json = JsonReporter::compact()
            .generate(&sample_results(), Some(&stats))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["stats"]["unique_mpns"], 3);
        assert!(value["results"]["ne555"]["error"].is_string());
    }
}
