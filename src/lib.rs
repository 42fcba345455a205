//! **Manufacturer part number validation against an electronic-parts catalog.**
//!
//! `mpn-validator` takes the free-form MPNs found in bills of materials,
//! normalizes them, and decides for each one whether it names a real,
//! orderable part. Valid matches are enriched with the canonical spelling,
//! the distributor's reference part number, the catalog category and
//! lifecycle status.
//!
//! ## Core Concepts & Modules
//!
//! - **[`matching`]**: MPN normalization, package labels, and the match
//!   engine that turns catalog search results into a [`ValidationResult`].
//! - **[`auth`]**: OAuth2 token acquisition and refresh ([`TokenManager`]).
//! - **[`catalog`]**: the resilient [`CatalogClient`], with token injection,
//!   locale headers and rate-limit backoff, over a pluggable [`Transport`].
//! - **[`cache`]**: the [`TwoTierCache`], a TTL tier in front of a durable
//!   store, both scoped by locale.
//! - **[`enrichment`]**: lifecycle lookups for valid matches.
//! - **[`pipeline`]**: the [`BatchValidator`] that deduplicates, serves cache
//!   hits, and resolves misses in parallel.
//! - **[`reports`]**: JSON, CSV and table rendering of result maps.
//!
//! ## Getting Started
//!
//! ```no_run
//! use mpn_validator::{load_or_default, ReqwestTransport, Services};
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (config, _) = load_or_default(None);
//!     let services = Services::from_config(&config, Arc::new(ReqwestTransport::new()?))?;
//!
//!     let results = services
//!         .validator
//!         .validate_batch(&["LM358N", "lm358n", "NE555P"], None, None)?;
//!     for (mpn, result) in &results {
//!         println!("{mpn}: valid={} canonical={:?}", result.valid, result.canonical_mpn);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! - `http` (default): the blocking `reqwest` transport and the command-line
//!   handlers. Without it, callers supply their own [`Transport`].

// Lint to discourage unwrap() in production code - prefer explicit error handling
#![warn(clippy::unwrap_used)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation
)]

pub mod auth;
pub mod cache;
pub mod catalog;
#[cfg(feature = "http")]
pub mod cli;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod matching;
pub mod model;
pub mod pipeline;
pub mod reports;
pub mod utils;

// Re-export main types for convenience
pub use auth::{OAuthToken, TokenManager, TokenState};
pub use cache::{CacheKey, CacheStats, TwoTierCache};
#[cfg(feature = "http")]
pub use catalog::ReqwestTransport;
pub use catalog::{CatalogClient, Transport};
pub use config::{load_or_default, AppConfig, AppConfigBuilder, ConfigError, Validatable};
pub use enrichment::{CatalogLifecycleEnricher, LifecycleEnricher};
pub use error::{ErrorContext, MpnError, OptionContext, Result};
pub use matching::{evaluate, normalize, package_label};
pub use model::{Category, Lifecycle, Locale, ValidationResult};
pub use pipeline::{BatchValidator, Services, ValidationStats};
pub use reports::{ReportFormat, ReportGenerator};
