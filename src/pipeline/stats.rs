//! Per-batch statistics.

use crate::cache::CacheTier;
use crate::enrichment::EnrichOutcome;
use crate::model::ValidationResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Statistics from one `validate_batch` call.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ValidationStats {
    /// Raw inputs received, including blanks and duplicates
    pub inputs: usize,
    /// Distinct non-empty normalized MPNs
    pub unique_mpns: usize,
    /// Served from the durable tier
    pub persistent_hits: usize,
    /// Served from the TTL tier
    pub ephemeral_hits: usize,
    /// Keyword searches sent to the catalog
    pub api_lookups: usize,
    pub valid: usize,
    pub invalid: usize,
    /// Lookups that failed upstream and were recorded as errors
    pub lookup_errors: usize,
    pub lifecycle_enriched: usize,
    pub lifecycle_failed: usize,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Upstream error messages, one per failed lookup or enrichment
    pub errors: Vec<String>,
}

impl ValidationStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total cache hits across both tiers.
    #[must_use]
    pub const fn cache_hits(&self) -> usize {
        self.persistent_hits + self.ephemeral_hits
    }

    pub(crate) fn record_hit(&mut self, tier: CacheTier) {
        match tier {
            CacheTier::Persistent => self.persistent_hits += 1,
            CacheTier::Ephemeral => self.ephemeral_hits += 1,
        }
    }

    pub(crate) fn record_lookup(&mut self, result: &ValidationResult, enrichment: &EnrichOutcome) {
        self.api_lookups += 1;
        if let Some(error) = &result.error {
            self.lookup_errors += 1;
            self.errors.push(error.clone());
        }
        match enrichment {
            EnrichOutcome::Enriched => self.lifecycle_enriched += 1,
            EnrichOutcome::Failed(reason) => {
                self.lifecycle_failed += 1;
                self.errors.push(reason.clone());
            }
            EnrichOutcome::Skipped => {}
        }
    }

    pub(crate) fn record_verdict(&mut self, result: &ValidationResult) {
        if result.valid {
            self.valid += 1;
        } else {
            self.invalid += 1;
        }
    }

    /// Log a summary of the batch.
    pub fn log_summary(&self) {
        tracing::info!(
            "Validation complete: {} unique MPNs ({} valid, {} invalid), \
             {} cache hits ({} persistent, {} ephemeral), {} API lookups, \
             {} lifecycle lookups in {:?}",
            self.unique_mpns,
            self.valid,
            self.invalid,
            self.cache_hits(),
            self.persistent_hits,
            self.ephemeral_hits,
            self.api_lookups,
            self.lifecycle_enriched,
            self.duration
        );

        for err in &self.errors {
            tracing::warn!("Validation error: {}", err);
        }
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Serde support for Duration
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
