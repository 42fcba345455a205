//! Configuration types for mpn-validator.

use super::defaults::{
    default_cache_dir, DEFAULT_API_BASE, DEFAULT_AUTHORIZE_PATH, DEFAULT_CLEANUP_DAYS,
    DEFAULT_ERROR_TTL, DEFAULT_INVALID_CLEANUP_DAYS, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_BACKOFF,
    DEFAULT_MAX_CONCURRENT, DEFAULT_MAX_ELAPSED, DEFAULT_RECORD_COUNT, DEFAULT_REDIRECT_URI,
    DEFAULT_SUCCESS_TTL, DEFAULT_TIMEOUT, DEFAULT_TOKEN_PATH,
};
use crate::model::Locale;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding `api.client_id`.
pub const ENV_CLIENT_ID: &str = "MPN_CLIENT_ID";

/// Environment variable overriding `api.client_secret`.
pub const ENV_CLIENT_SECRET: &str = "MPN_CLIENT_SECRET";

// ============================================================================
// Main Application Configuration
// ============================================================================

/// Unified application configuration.
///
/// Loaded from `.mpn-validator.yaml`, then overlaid with environment
/// secrets and CLI flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Catalog API endpoints and credentials
    pub api: ApiConfig,
    /// Locale every lookup is scoped to
    pub locale: Locale,
    /// Cache tiers
    pub cache: CacheConfig,
    /// HTTP retry and timeout behavior
    pub client: ClientConfig,
    /// Batch orchestration
    pub batch: BatchConfig,
}

impl AppConfig {
    /// Create a new `AppConfig` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an `AppConfig` builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Overlay credentials from the environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(id) = lookup(ENV_CLIENT_ID).filter(|v| !v.is_empty()) {
            self.api.client_id = id;
        }
        if let Some(secret) = lookup(ENV_CLIENT_SECRET).filter(|v| !v.is_empty()) {
            self.api.client_secret = secret;
        }
    }

    /// Copy with the client secret masked, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.api.client_secret.is_empty() {
            copy.api.client_secret = "********".to_string();
        }
        copy
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the API base URL.
    pub fn api_base(mut self, base_url: impl Into<String>) -> Self {
        self.config.api.base_url = base_url.into();
        self
    }

    /// Set client credentials.
    pub fn credentials(mut self, client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        self.config.api.client_id = client_id.into();
        self.config.api.client_secret = client_secret.into();
        self
    }

    /// Set the locale.
    pub fn locale(mut self, locale: Locale) -> Self {
        self.config.locale = locale;
        self
    }

    /// Set the cache directory.
    pub fn cache_dir(mut self, dir: PathBuf) -> Self {
        self.config.cache.dir = Some(dir);
        self
    }

    /// Skip cache reads.
    pub const fn bypass_cache(mut self, bypass: bool) -> Self {
        self.config.cache.bypass_cache = bypass;
        self
    }

    /// Set the number of parallel lookups.
    pub const fn max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.config.batch.max_concurrent = max_concurrent;
        self
    }

    /// Build the `AppConfig`.
    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// API Configuration
// ============================================================================

/// Catalog API endpoints and OAuth client registration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ApiConfig {
    /// API host, e.g. `https://api.digikey.com`
    pub base_url: String,
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret (prefer the `MPN_CLIENT_SECRET` environment variable)
    pub client_secret: String,
    /// Redirect URI registered for the authorization-code flow
    pub redirect_uri: String,
    /// Token endpoint path
    pub token_path: String,
    /// Authorize endpoint path
    pub authorize_path: String,
    /// Where the active token is persisted (defaults to the cache directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_file: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            token_path: DEFAULT_TOKEN_PATH.to_string(),
            authorize_path: DEFAULT_AUTHORIZE_PATH.to_string(),
            token_file: None,
        }
    }
}

impl ApiConfig {
    /// Join a path onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Full token endpoint URL.
    #[must_use]
    pub fn token_url(&self) -> String {
        self.endpoint(&self.token_path)
    }

    /// Whether client credentials are configured.
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

// ============================================================================
// Cache Configuration
// ============================================================================

/// Cache tier configuration.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory for the persistent tier and token file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
    /// Keep a durable tier on disk (in-memory only when false)
    pub persistent: bool,
    /// Ephemeral TTL for successful results, in hours
    #[schemars(range(min = 1))]
    pub success_ttl_hours: u64,
    /// Ephemeral TTL for failed lookups, in minutes
    #[schemars(range(min = 1))]
    pub error_ttl_minutes: u64,
    /// Default age for `cache cleanup`, in days since last access
    pub cleanup_days: u32,
    /// Default age for removing invalid entries, in days since creation
    pub invalid_cleanup_days: u32,
    /// Skip cache reads and always query the catalog
    pub bypass_cache: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            persistent: true,
            success_ttl_hours: DEFAULT_SUCCESS_TTL.as_secs() / 3600,
            error_ttl_minutes: DEFAULT_ERROR_TTL.as_secs() / 60,
            cleanup_days: DEFAULT_CLEANUP_DAYS,
            invalid_cleanup_days: DEFAULT_INVALID_CLEANUP_DAYS,
            bypass_cache: false,
        }
    }
}

impl CacheConfig {
    /// Configured directory, or the platform cache directory.
    #[must_use]
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(default_cache_dir)
    }

    #[must_use]
    pub const fn success_ttl(&self) -> Duration {
        Duration::from_secs(self.success_ttl_hours * 3600)
    }

    #[must_use]
    pub const fn error_ttl(&self) -> Duration {
        Duration::from_secs(self.error_ttl_minutes * 60)
    }
}

// ============================================================================
// HTTP Client Configuration
// ============================================================================

/// Retry and timeout behavior of the catalog client.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ClientConfig {
    /// Per-attempt timeout in seconds
    #[schemars(range(min = 1))]
    pub timeout_secs: u64,
    /// Attempts before a transient failure is surfaced
    #[schemars(range(min = 1))]
    pub max_attempts: u32,
    /// Upper bound for one computed backoff delay, in seconds
    pub max_backoff_secs: u64,
    /// Upper bound for total time spent waiting between retries, in seconds
    pub max_elapsed_secs: u64,
    /// Add up to one second of random jitter to computed delays
    pub jitter: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_backoff_secs: DEFAULT_MAX_BACKOFF.as_secs(),
            max_elapsed_secs: DEFAULT_MAX_ELAPSED.as_secs(),
            jitter: true,
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ============================================================================
// Batch Configuration
// ============================================================================

/// Batch orchestration settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BatchConfig {
    /// Parallel upstream lookups per batch
    #[schemars(range(min = 1))]
    pub max_concurrent: usize,
    /// Candidates requested per keyword search
    #[schemars(range(min = 1))]
    pub record_count: u32,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            record_count: DEFAULT_RECORD_COUNT,
        }
    }
}
