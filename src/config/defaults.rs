//! Default values shared by the configuration types and the services.

use std::path::PathBuf;
use std::time::Duration;

/// Production catalog API host.
pub const DEFAULT_API_BASE: &str = "https://api.digikey.com";

/// OAuth token endpoint path.
pub const DEFAULT_TOKEN_PATH: &str = "/v1/oauth2/token";

/// OAuth authorize endpoint path.
pub const DEFAULT_AUTHORIZE_PATH: &str = "/v1/oauth2/authorize";

/// Keyword search endpoint path.
pub const SEARCH_PATH: &str = "/products/v4/search/keyword";

/// Redirect URI registered for the authorization-code flow.
pub const DEFAULT_REDIRECT_URI: &str = "https://localhost:8139/callback";

/// TTL for successful results in the ephemeral tier.
pub const DEFAULT_SUCCESS_TTL: Duration = Duration::from_secs(12 * 3600);

/// TTL for failed lookups in the ephemeral tier.
pub const DEFAULT_ERROR_TTL: Duration = Duration::from_secs(5 * 60);

/// Persistent entries not accessed for this many days are removed by cleanup.
pub const DEFAULT_CLEANUP_DAYS: u32 = 365;

/// Invalid persistent entries older than this many days are removed by cleanup.
pub const DEFAULT_INVALID_CLEANUP_DAYS: u32 = 30;

/// Per-attempt HTTP timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Attempts before a transient failure is surfaced.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Upper bound for one computed backoff delay.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(32);

/// Upper bound for the total time spent sleeping between retries.
pub const DEFAULT_MAX_ELAPSED: Duration = Duration::from_secs(120);

/// Parallel upstream lookups per batch.
pub const DEFAULT_MAX_CONCURRENT: usize = 4;

/// Candidates requested per keyword search.
pub const DEFAULT_RECORD_COUNT: u32 = 10;

/// Tokens expiring within this window are refreshed before use.
pub const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Default directory for the persistent cache and token file.
#[must_use]
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from(".cache"))
        .join("mpn-validator")
}
