//! CLI command handlers.
//!
//! Testable handlers invoked by main.rs. Each returns the process exit
//! code for its subcommand; errors are reported by the caller.

mod auth;
mod cache;
mod validate;

pub use auth::{run_auth_check, run_auth_exchange, run_auth_url};
pub use cache::{run_cache_cleanup, run_cache_stats};
pub use validate::{parse_hint, read_mpns, run_validate, ValidateOptions};

use crate::config::{AppConfig, Validatable};
use anyhow::{bail, Result};

/// Reject configurations that would fail on first use.
pub(crate) fn ensure_valid(config: &AppConfig) -> Result<()> {
    let errors = config.validate();
    if errors.is_empty() {
        return Ok(());
    }
    for error in &errors {
        tracing::error!("Invalid configuration: {error}");
    }
    bail!("configuration has {} error(s)", errors.len())
}
