//! Durable tier.
//!
//! Entries never expire on their own. They are removed only by the explicit
//! cleanup operations, which an external scheduler is expected to run.

use super::key::CacheKey;
use crate::error::{CacheErrorKind, MpnError, Result};
use crate::model::ValidationResult;
use crate::utils::{read_json, write_json_atomic};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::fs::File;
use std::sync::{PoisonError, RwLock};

/// A stored result plus access bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub result: ValidationResult,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    pub access_count: u64,
}

impl CacheEntry {
    fn new(key: CacheKey, result: ValidationResult, now: DateTime<Utc>) -> Self {
        Self {
            key,
            result,
            created_at: now,
            updated_at: now,
            last_accessed_at: now,
            access_count: 0,
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.access_count += 1;
        self.last_accessed_at = now;
    }

    fn replace(&mut self, result: ValidationResult, now: DateTime<Utc>) {
        self.result = result;
        self.updated_at = now;
    }
}

/// Summary of the durable tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub invalid_entries: usize,
    pub total_accesses: u64,
}

impl CacheStats {
    fn record(&mut self, entry: &CacheEntry) {
        self.total_entries += 1;
        if entry.result.valid {
            self.valid_entries += 1;
        } else {
            self.invalid_entries += 1;
        }
        self.total_accesses += entry.access_count;
    }
}

/// Storage backend of the durable tier.
///
/// `touch` and `upsert` are atomic per key: concurrent hits on one key
/// never lose an access-count increment.
pub trait ResultStore: Send + Sync {
    /// Read an entry without recording an access.
    fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>>;

    /// Record a hit and return the updated entry.
    fn touch(&self, key: &CacheKey, now: DateTime<Utc>) -> Result<Option<CacheEntry>>;

    /// Insert or replace the result for `key`, keeping its access history.
    fn upsert(&self, key: &CacheKey, result: ValidationResult, now: DateTime<Utc>) -> Result<CacheEntry>;

    /// Remove every entry matching `predicate`. Returns the number removed.
    fn remove_where(&self, predicate: &dyn Fn(&CacheEntry) -> bool) -> Result<usize>;

    fn stats(&self) -> Result<CacheStats>;
}

// ============================================================================
// In-memory store
// ============================================================================

/// Durable-tier stand-in kept in memory, for tests and `persistent: false`.
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl MemoryResultStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for MemoryResultStore {
    fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn touch(&self, key: &CacheKey, now: DateTime<Utc>) -> Result<Option<CacheEntry>> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get_mut(key).map(|entry| {
            entry.touch(now);
            entry.clone()
        }))
    }

    fn upsert(&self, key: &CacheKey, result: ValidationResult, now: DateTime<Utc>) -> Result<CacheEntry> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let entry = entries
            .entry(key.clone())
            .and_modify(|e| e.replace(result.clone(), now))
            .or_insert_with(|| CacheEntry::new(key.clone(), result, now));
        Ok(entry.clone())
    }

    fn remove_where(&self, predicate: &dyn Fn(&CacheEntry) -> bool) -> Result<usize> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| !predicate(entry));
        Ok(before - entries.len())
    }

    fn stats(&self) -> Result<CacheStats> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut stats = CacheStats::default();
        entries.values().for_each(|e| stats.record(e));
        Ok(stats)
    }
}

// ============================================================================
// File store
// ============================================================================

/// Subdirectory holding one lock file per key.
const LOCK_DIR: &str = ".locks";

/// Exclusive advisory lock on one entry, released on drop.
///
/// The lock lives on a separate file so the atomic rename of the entry
/// itself never swaps the locked inode out from under a waiter. Lock files
/// are left in place after an entry is removed.
struct EntryLock {
    file: File,
}

impl EntryLock {
    fn acquire(path: &Path) -> Result<Self> {
        let file = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| MpnError::io(path, e))?;
        fs4::fs_std::FileExt::lock_exclusive(&file).map_err(|e| {
            MpnError::cache(
                format!("locking {}", path.display()),
                CacheErrorKind::Lock(e.to_string()),
            )
        })?;
        Ok(Self { file })
    }
}

impl Drop for EntryLock {
    fn drop(&mut self) {
        let _ = fs4::fs_std::FileExt::unlock(&self.file);
    }
}

/// One JSON file per key, replaced atomically on every write.
///
/// Read-modify-write cycles hold an OS-level lock on the key, so any number
/// of stores and processes may share a directory without losing updates.
pub struct FileResultStore {
    dir: PathBuf,
}

impl FileResultStore {
    /// Open (and create) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let locks = dir.join(LOCK_DIR);
        std::fs::create_dir_all(&locks).map_err(|e| MpnError::io(&locks, e))?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.to_filename())
    }

    fn lock(&self, key: &CacheKey) -> Result<EntryLock> {
        let path = self.dir.join(LOCK_DIR).join(key.to_filename()).with_extension("lock");
        EntryLock::acquire(&path)
    }

    /// Read an entry, checking it belongs to `key`.
    fn read_entry(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
        let entry: Option<CacheEntry> = read_json(&self.path_for(key))?;
        match entry {
            Some(entry) if &entry.key != key => Err(MpnError::cache(
                format!("reading entry for {key}"),
                CacheErrorKind::Corrupt(format!("file holds entry for {}", entry.key)),
            )),
            other => Ok(other),
        }
    }

    fn entry_paths(&self) -> Result<Vec<PathBuf>> {
        let read_dir = std::fs::read_dir(&self.dir).map_err(|e| MpnError::io(&self.dir, e))?;
        let mut paths = Vec::new();
        for item in read_dir {
            let path = item.map_err(|e| MpnError::io(&self.dir, e))?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        Ok(paths)
    }

    /// Every readable entry. Unreadable files are logged and skipped.
    fn scan(&self) -> Result<Vec<CacheEntry>> {
        let mut entries = Vec::new();
        for path in self.entry_paths()? {
            match read_json::<CacheEntry>(&path) {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(e) => tracing::warn!("Skipping unreadable cache entry {}: {e}", path.display()),
            }
        }
        Ok(entries)
    }
}

impl ResultStore for FileResultStore {
    fn get(&self, key: &CacheKey) -> Result<Option<CacheEntry>> {
        self.read_entry(key)
    }

    fn touch(&self, key: &CacheKey, now: DateTime<Utc>) -> Result<Option<CacheEntry>> {
        let _lock = self.lock(key)?;
        let Some(mut entry) = self.read_entry(key)? else {
            return Ok(None);
        };
        entry.touch(now);
        write_json_atomic(&self.path_for(key), &entry)?;
        Ok(Some(entry))
    }

    fn upsert(&self, key: &CacheKey, result: ValidationResult, now: DateTime<Utc>) -> Result<CacheEntry> {
        let _lock = self.lock(key)?;
        let existing = match self.read_entry(key) {
            Ok(existing) => existing,
            Err(e) => {
                tracing::warn!("Replacing unreadable cache entry for {key}: {e}");
                None
            }
        };
        let entry = match existing {
            Some(mut entry) => {
                entry.replace(result, now);
                entry
            }
            None => CacheEntry::new(key.clone(), result, now),
        };
        write_json_atomic(&self.path_for(key), &entry)?;
        Ok(entry)
    }

    fn remove_where(&self, predicate: &dyn Fn(&CacheEntry) -> bool) -> Result<usize> {
        let mut removed = 0;
        for entry in self.scan()? {
            if !predicate(&entry) {
                continue;
            }
            let _lock = self.lock(&entry.key)?;
            // Re-check under the lock; a concurrent hit may have refreshed it.
            let still_matches = self.read_entry(&entry.key)?.is_some_and(|e| predicate(&e));
            if !still_matches {
                continue;
            }
            let path = self.path_for(&entry.key);
            match std::fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(MpnError::io(path, e)),
            }
        }
        Ok(removed)
    }

    fn stats(&self) -> Result<CacheStats> {
        let mut stats = CacheStats::default();
        self.scan()?.iter().for_each(|e| stats.record(e));
        Ok(stats)
    }
}
