//! Two-tier read/write policy.

use super::ephemeral::EphemeralCache;
use super::key::CacheKey;
use super::persistent::{CacheEntry, CacheStats, ResultStore};
use crate::error::Result;
use crate::model::ValidationResult;
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Tier that served a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheTier {
    Persistent,
    Ephemeral,
}

/// Durable tier in front, TTL tier behind.
///
/// - Reads check the durable tier first; a hit there records an access.
/// - An ephemeral hit on a non-error result is copied into the durable tier.
/// - Failed lookups are only ever kept in the ephemeral tier.
///
/// Durable-tier IO errors are logged and treated as misses so a broken
/// cache directory degrades to uncached lookups.
pub struct TwoTierCache {
    ephemeral: EphemeralCache,
    persistent: Arc<dyn ResultStore>,
}

impl TwoTierCache {
    pub fn new(ephemeral: EphemeralCache, persistent: Arc<dyn ResultStore>) -> Self {
        Self {
            ephemeral,
            persistent,
        }
    }

    pub fn get(&self, key: &CacheKey) -> Option<(ValidationResult, CacheTier)> {
        match self.persistent.touch(key, Utc::now()) {
            Ok(Some(entry)) => return Some((entry.result, CacheTier::Persistent)),
            Ok(None) => {}
            Err(e) => tracing::warn!("Persistent cache read for {key} failed: {e}"),
        }

        let result = self.ephemeral.get(key)?;
        if !result.is_error() {
            if let Err(e) = self.persistent.upsert(key, result.clone(), Utc::now()) {
                tracing::warn!("Persistent cache backfill for {key} failed: {e}");
            }
        }
        Some((result, CacheTier::Ephemeral))
    }

    pub fn put(&self, key: &CacheKey, result: &ValidationResult) {
        if !result.is_error() {
            if let Err(e) = self.persistent.upsert(key, result.clone(), Utc::now()) {
                tracing::warn!("Persistent cache write for {key} failed: {e}");
            }
        }
        self.ephemeral.put(key.clone(), result.clone());
    }

    /// Remove durable entries not accessed within `days`, valid or not.
    pub fn cleanup_old_entries(&self, days: u32) -> Result<usize> {
        let cutoff = Utc::now() - Duration::days(i64::from(days));
        let removed = self
            .persistent
            .remove_where(&|entry: &CacheEntry| entry.last_accessed_at < cutoff)?;
        tracing::info!("Removed {removed} cache entries not accessed in {days} days");
        Ok(removed)
    }

    /// Remove invalid durable entries created more than `days` ago.
    pub fn cleanup_invalid_entries(&self, days: u32) -> Result<usize> {
        let cutoff = Utc::now() - Duration::days(i64::from(days));
        let removed = self
            .persistent
            .remove_where(&|entry: &CacheEntry| !entry.result.valid && entry.created_at < cutoff)?;
        tracing::info!("Removed {removed} invalid cache entries older than {days} days");
        Ok(removed)
    }

    pub fn stats(&self) -> Result<CacheStats> {
        self.persistent.stats()
    }

    #[must_use]
    pub const fn ephemeral(&self) -> &EphemeralCache {
        &self.ephemeral
    }

    #[must_use]
    pub fn persistent(&self) -> &dyn ResultStore {
        self.persistent.as_ref()
    }
}
