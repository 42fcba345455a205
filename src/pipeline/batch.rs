//! Batch orchestration.
//!
//! Normalize and deduplicate the inputs, serve what the cache already
//! knows, and resolve the rest against the catalog in parallel.

use super::stats::ValidationStats;
use crate::cache::{CacheKey, TwoTierCache};
use crate::catalog::{CatalogClient, KeywordSearchRequest};
use crate::config::BatchConfig;
use crate::enrichment::{EnrichOutcome, LifecycleEnricher};
use crate::error::{MpnError, Result};
use crate::matching::{evaluate, normalize};
use crate::model::{Locale, ValidationResult};
use indexmap::IndexMap;
use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// One deduplicated lookup.
#[derive(Debug, Clone)]
struct PendingLookup {
    /// First-seen raw spelling, sent as the search keyword
    raw: String,
    normalized: String,
    hint: Option<String>,
    key: CacheKey,
}

/// Outcome of resolving one cache miss.
struct Resolved {
    normalized: String,
    result: ValidationResult,
    enrichment: EnrichOutcome,
}

/// Validates batches of raw MPNs for one locale.
pub struct BatchValidator {
    client: Arc<CatalogClient>,
    cache: Arc<TwoTierCache>,
    enricher: Arc<dyn LifecycleEnricher>,
    record_count: u32,
    bypass_cache: bool,
    pool: rayon::ThreadPool,
}

impl BatchValidator {
    pub fn new(
        client: Arc<CatalogClient>,
        cache: Arc<TwoTierCache>,
        enricher: Arc<dyn LifecycleEnricher>,
        config: &BatchConfig,
    ) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.max_concurrent.max(1))
            .thread_name(|i| format!("mpn-lookup-{i}"))
            .build()
            .map_err(|e| MpnError::config(format!("failed to start lookup pool: {e}")))?;

        Ok(Self {
            client,
            cache,
            enricher,
            record_count: config.record_count,
            bypass_cache: false,
            pool,
        })
    }

    /// Skip cache reads. Fresh results are still written back.
    #[must_use]
    pub const fn with_bypass_cache(mut self, bypass: bool) -> Self {
        self.bypass_cache = bypass;
        self
    }

    #[must_use]
    pub fn locale(&self) -> &Locale {
        self.client.locale()
    }

    #[must_use]
    pub fn cache(&self) -> &TwoTierCache {
        &self.cache
    }

    /// Validate a batch of raw MPNs.
    ///
    /// `hints` maps raw MPN strings to manufacturer names used to break ties
    /// between identically normalizing candidates. `manufacturer_id`
    /// restricts the catalog search and scopes the cache.
    ///
    /// Every distinct non-empty normalized MPN appears exactly once in the
    /// returned map, in first-seen order. Only an authentication failure
    /// fails the whole call.
    pub fn validate_batch<S: AsRef<str>>(
        &self,
        raw_mpns: &[S],
        hints: Option<&HashMap<String, String>>,
        manufacturer_id: Option<&str>,
    ) -> Result<IndexMap<String, ValidationResult>> {
        self.validate_batch_with_stats(raw_mpns, hints, manufacturer_id)
            .map(|(results, _)| results)
    }

    /// [`validate_batch`](Self::validate_batch) plus batch statistics.
    pub fn validate_batch_with_stats<S: AsRef<str>>(
        &self,
        raw_mpns: &[S],
        hints: Option<&HashMap<String, String>>,
        manufacturer_id: Option<&str>,
    ) -> Result<(IndexMap<String, ValidationResult>, ValidationStats)> {
        let started = Instant::now();
        let mut stats = ValidationStats::new();
        stats.inputs = raw_mpns.len();

        let pending = self.dedupe(raw_mpns, hints, manufacturer_id);
        stats.unique_mpns = pending.len();

        let mut slots: IndexMap<String, Option<ValidationResult>> =
            IndexMap::with_capacity(pending.len());
        let mut misses = Vec::new();

        for lookup in pending {
            let cached = if self.bypass_cache {
                None
            } else {
                self.cache.get(&lookup.key)
            };
            match cached {
                Some((result, tier)) => {
                    tracing::debug!("Cache hit ({tier:?}) for {}", lookup.key);
                    stats.record_hit(tier);
                    slots.insert(lookup.normalized, Some(result));
                }
                None => {
                    slots.insert(lookup.normalized.clone(), None);
                    misses.push(lookup);
                }
            }
        }

        if !misses.is_empty() {
            tracing::debug!("Resolving {} cache misses against the catalog", misses.len());
            let resolved = self.pool.install(|| {
                misses
                    .par_iter()
                    .map(|lookup| self.resolve(lookup, manufacturer_id))
                    .collect::<Result<Vec<_>>>()
            })?;

            for item in resolved {
                stats.record_lookup(&item.result, &item.enrichment);
                slots.insert(item.normalized, Some(item.result));
            }
        }

        let results: IndexMap<String, ValidationResult> = slots
            .into_iter()
            .filter_map(|(mpn, result)| result.map(|r| (mpn, r)))
            .collect();
        results.values().for_each(|r| stats.record_verdict(r));

        stats.duration = started.elapsed();
        Ok((results, stats))
    }

    fn dedupe<S: AsRef<str>>(
        &self,
        raw_mpns: &[S],
        hints: Option<&HashMap<String, String>>,
        manufacturer_id: Option<&str>,
    ) -> Vec<PendingLookup> {
        let locale = self.locale();
        let mut pending: IndexMap<String, PendingLookup> = IndexMap::new();

        for raw in raw_mpns {
            let raw = raw.as_ref();
            let normalized = normalize(raw);
            if normalized.is_empty() {
                continue;
            }
            let hint = hints
                .and_then(|h| h.get(raw).or_else(|| h.get(raw.trim())))
                .map(|h| h.trim())
                .filter(|h| !h.is_empty())
                .map(str::to_string);

            pending
                .entry(normalized.clone())
                .and_modify(|existing| {
                    if existing.hint.is_none() {
                        existing.hint.clone_from(&hint);
                    }
                })
                .or_insert_with(|| PendingLookup {
                    raw: raw.trim().to_string(),
                    key: CacheKey::new(normalized.clone(), manufacturer_id, locale),
                    normalized,
                    hint,
                });
        }

        pending.into_values().collect()
    }

    /// Search, match, enrich and cache one MPN.
    fn resolve(&self, lookup: &PendingLookup, manufacturer_id: Option<&str>) -> Result<Resolved> {
        let locale = self.locale();
        let request = KeywordSearchRequest::new(&lookup.raw, self.record_count, manufacturer_id);

        let (result, enrichment) = match self.client.keyword_search(&request) {
            Ok(response) => {
                let outcome = evaluate(&response, &lookup.normalized, lookup.hint.as_deref());
                let mut result = outcome.into_result(locale);
                let enrichment = self.enricher.enrich(&lookup.normalized, &mut result);
                (result, enrichment)
            }
            Err(e) if e.is_batch_fatal() => return Err(e),
            Err(e) => {
                let detail = e.detail();
                tracing::warn!("Lookup for {} failed: {detail}", lookup.raw);
                (
                    ValidationResult::failed(locale, detail),
                    EnrichOutcome::Skipped,
                )
            }
        };

        self.cache.put(&lookup.key, &result);
        Ok(Resolved {
            normalized: lookup.normalized.clone(),
            result,
            enrichment,
        })
    }
}
