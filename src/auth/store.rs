//! Persistence for the active token.

use super::token::OAuthToken;
use crate::error::{CacheErrorKind, MpnError, Result};
use crate::utils::{read_json, write_json_atomic};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Holds at most one token. `save` replaces whatever was stored.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<OAuthToken>>;
    fn save(&self, token: &OAuthToken) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// In-process token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<OAuthToken>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(token: OAuthToken) -> Self {
        Self {
            token: RwLock::new(Some(token)),
        }
    }
}

fn poisoned() -> MpnError {
    MpnError::cache("token store", CacheErrorKind::Poisoned)
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<OAuthToken>> {
        Ok(self.token.read().map_err(|_| poisoned())?.clone())
    }

    fn save(&self, token: &OAuthToken) -> Result<()> {
        *self.token.write().map_err(|_| poisoned())? = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.token.write().map_err(|_| poisoned())? = None;
        Ok(())
    }
}

/// JSON file token store with atomic replacement.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<OAuthToken>> {
        read_json(&self.path)
    }

    fn save(&self, token: &OAuthToken) -> Result<()> {
        write_json_atomic(&self.path, token)
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MpnError::io(&self.path, e)),
        }
    }
}
