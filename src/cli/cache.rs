//! Cache maintenance handlers.

use crate::config::AppConfig;
use crate::pipeline::{build_cache, exit_codes};
use anyhow::{Context, Result};

/// Remove stale entries from the persistent tier.
pub fn run_cache_cleanup(
    config: &AppConfig,
    days: Option<u32>,
    invalid_days: Option<u32>,
) -> Result<i32> {
    let cache = build_cache(config)?;
    let days = days.unwrap_or(config.cache.cleanup_days);
    let invalid_days = invalid_days.unwrap_or(config.cache.invalid_cleanup_days);

    let old = cache.cleanup_old_entries(days)?;
    let invalid = cache.cleanup_invalid_entries(invalid_days)?;
    eprintln!(
        "Removed {old} entries unused for {days} days and {invalid} invalid entries older than {invalid_days} days"
    );
    Ok(exit_codes::SUCCESS)
}

/// Print persistent-tier statistics as JSON.
pub fn run_cache_stats(config: &AppConfig) -> Result<i32> {
    let cache = build_cache(config)?;
    let stats = cache.stats()?;
    let json = serde_json::to_string_pretty(&stats).context("failed to serialize cache stats")?;
    println!("{json}");
    eprintln!("Cache directory: {}", config.cache.resolved_dir().display());
    Ok(exit_codes::SUCCESS)
}
