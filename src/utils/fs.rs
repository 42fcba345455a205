//! Atomic JSON file persistence.
//!
//! Writers go through a temp file in the destination directory and an
//! atomic rename, so readers never observe a partially written file.

use crate::error::{CacheErrorKind, MpnError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Read and decode a JSON file. A missing file is `Ok(None)`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(MpnError::io(path, e)),
    };
    serde_json::from_str(&content).map(Some).map_err(|e| {
        MpnError::cache(
            format!("decoding {}", path.display()),
            CacheErrorKind::Corrupt(e.to_string()),
        )
    })
}

/// Serialize `value` and atomically replace `path` with it.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| MpnError::io(dir, e))?;

    let json = serde_json::to_vec_pretty(value)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| MpnError::io(dir, e))?;
    tmp.write_all(&json).map_err(|e| MpnError::io(tmp.path(), e))?;
    tmp.as_file().sync_all().map_err(|e| MpnError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| {
        MpnError::cache(
            format!("replacing {}", path.display()),
            CacheErrorKind::Write(e.error.to_string()),
        )
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_none() {
        let tmp = TempDir::new().unwrap();
        let value: Option<serde_json::Value> = read_json(&tmp.path().join("absent.json")).unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_write_then_read() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("value.json");
        write_json_atomic(&path, &vec![1, 2, 3]).unwrap();
        write_json_atomic(&path, &vec![4]).unwrap();
        let back: Option<Vec<i32>> = read_json(&path).unwrap();
        assert_eq!(back, Some(vec![4]));
    }

    #[test]
    fn test_corrupt_file_is_cache_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, "{").unwrap();
        let err = read_json::<serde_json::Value>(&path).unwrap_err();
        assert!(matches!(
            err,
            MpnError::Cache {
                source: CacheErrorKind::Corrupt(_),
                ..
            }
        ));
    }
}
