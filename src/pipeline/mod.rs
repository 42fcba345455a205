//! Orchestration of batch validation.
//!
//! [`Services`] wires the token manager, catalog client, cache tiers and
//! lifecycle enricher from an [`AppConfig`]; [`BatchValidator`] drives them.

mod batch;
mod output;
mod stats;

pub use batch::BatchValidator;
pub use output::{write_output, OutputTarget};
pub use stats::ValidationStats;

use crate::auth::{FileTokenStore, TokenManager, TokenStore};
use crate::cache::{EphemeralCache, FileResultStore, MemoryResultStore, ResultStore, TwoTierCache};
use crate::catalog::{CatalogClient, Transport};
use crate::config::AppConfig;
use crate::enrichment::CatalogLifecycleEnricher;
use crate::error::Result;
use std::sync::Arc;

/// Exit codes for CI/CD integration
pub mod exit_codes {
    /// Every requested MPN is valid
    pub const SUCCESS: i32 = 0;
    /// At least one MPN is invalid or could not be checked
    pub const INVALID_FOUND: i32 = 1;
    /// An error occurred (including authentication failure)
    pub const ERROR: i32 = 3;
}

/// File name of the persisted token inside the cache directory.
const TOKEN_FILE_NAME: &str = "token.json";

/// Directory of the durable result tier inside the cache directory.
const RESULTS_DIR_NAME: &str = "results";

/// Fully wired validation services.
pub struct Services {
    pub tokens: Arc<TokenManager>,
    pub client: Arc<CatalogClient>,
    pub cache: Arc<TwoTierCache>,
    pub validator: BatchValidator,
}

impl Services {
    /// Build every service from configuration over the given transport.
    pub fn from_config(config: &AppConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let token_store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(
            config
                .api
                .token_file
                .clone()
                .unwrap_or_else(|| config.cache.resolved_dir().join(TOKEN_FILE_NAME)),
        ));
        let tokens = Arc::new(TokenManager::new(
            config.api.clone(),
            config.locale.clone(),
            config.client.timeout(),
            Arc::clone(&transport),
            token_store,
        ));

        let client = Arc::new(CatalogClient::new(
            config.api.clone(),
            &config.client,
            config.locale.clone(),
            transport,
            Arc::clone(&tokens),
        ));

        let cache = Arc::new(build_cache(config)?);
        let enricher = Arc::new(CatalogLifecycleEnricher::new(Arc::clone(&client)));
        let validator = BatchValidator::new(
            Arc::clone(&client),
            Arc::clone(&cache),
            enricher,
            &config.batch,
        )?
        .with_bypass_cache(config.cache.bypass_cache);

        Ok(Self {
            tokens,
            client,
            cache,
            validator,
        })
    }
}

/// Build the two cache tiers from configuration.
pub fn build_cache(config: &AppConfig) -> Result<TwoTierCache> {
    let persistent: Arc<dyn ResultStore> = if config.cache.persistent {
        Arc::new(FileResultStore::open(
            config.cache.resolved_dir().join(RESULTS_DIR_NAME),
        )?)
    } else {
        Arc::new(MemoryResultStore::new())
    };
    let ephemeral = EphemeralCache::new(config.cache.success_ttl(), config.cache.error_ttl());
    Ok(TwoTierCache::new(ephemeral, persistent))
}
