//! Configuration for mpn-validator.
//!
//! - Type-safe configuration structures with defaults
//! - Validation for all configuration values
//! - YAML config file loading and discovery
//! - Environment overrides for credentials
//!
//! # Configuration File
//!
//! Place a `.mpn-validator.yaml` file in your project root or
//! `~/.config/mpn-validator/`:
//!
//! ```yaml
//! locale:
//!   site: DE
//!   language: de
//!   currency: EUR
//! batch:
//!   max_concurrent: 8
//! ```

mod defaults;
pub mod file;
mod types;
mod validation;

pub use defaults::{
    default_cache_dir, DEFAULT_API_BASE, DEFAULT_CLEANUP_DAYS, DEFAULT_ERROR_TTL,
    DEFAULT_INVALID_CLEANUP_DAYS, DEFAULT_MAX_CONCURRENT, DEFAULT_SUCCESS_TTL, SEARCH_PATH,
    TOKEN_REFRESH_MARGIN,
};
pub use types::{
    ApiConfig, AppConfig, AppConfigBuilder, BatchConfig, CacheConfig, ClientConfig,
    ENV_CLIENT_ID, ENV_CLIENT_SECRET,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    default_config_path, discover_config_file, generate_example_config, load_config_file,
    load_or_default, ConfigFileError,
};

/// Generate a JSON Schema for the `.mpn-validator.yaml` format.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}
