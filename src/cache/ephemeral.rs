//! In-process TTL tier.

use super::key::CacheKey;
use crate::config::{DEFAULT_ERROR_TTL, DEFAULT_SUCCESS_TTL};
use crate::model::ValidationResult;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

/// Default bound on live entries.
const DEFAULT_MAX_ENTRIES: usize = 50_000;

struct Slot {
    result: ValidationResult,
    stored_at: Instant,
    ttl: Duration,
}

impl Slot {
    fn is_live(&self) -> bool {
        self.stored_at.elapsed() < self.ttl
    }
}

/// Thread-safe TTL cache. Failed lookups get the shorter error TTL.
pub struct EphemeralCache {
    entries: RwLock<HashMap<CacheKey, Slot>>,
    success_ttl: Duration,
    error_ttl: Duration,
    max_entries: usize,
}

impl Default for EphemeralCache {
    fn default() -> Self {
        Self::new(DEFAULT_SUCCESS_TTL, DEFAULT_ERROR_TTL)
    }
}

impl EphemeralCache {
    #[must_use]
    pub fn new(success_ttl: Duration, error_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            success_ttl,
            error_ttl,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    #[must_use]
    pub const fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Live entry for `key`, if any.
    pub fn get(&self, key: &CacheKey) -> Option<ValidationResult> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(key)
            .filter(|slot| slot.is_live())
            .map(|slot| slot.result.clone())
    }

    /// Store a result with the TTL matching its kind.
    pub fn put(&self, key: CacheKey, result: ValidationResult) {
        let ttl = if result.is_error() {
            self.error_ttl
        } else {
            self.success_ttl
        };
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            entries.retain(|_, slot| slot.is_live());
            while entries.len() >= self.max_entries {
                let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, slot)| slot.stored_at)
                    .map(|(k, _)| k.clone())
                else {
                    break;
                };
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            Slot {
                result,
                stored_at: Instant::now(),
                ttl,
            },
        );
    }

    /// Drop expired entries. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, slot| slot.is_live());
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
