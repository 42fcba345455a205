//! Auth command handlers.

use crate::auth::{FileTokenStore, TokenManager};
use crate::catalog::ReqwestTransport;
use crate::config::AppConfig;
use crate::pipeline::exit_codes;
use anyhow::Result;
use std::sync::Arc;

fn token_manager(config: &AppConfig) -> Result<TokenManager> {
    super::ensure_valid(config)?;
    let path = config
        .api
        .token_file
        .clone()
        .unwrap_or_else(|| config.cache.resolved_dir().join("token.json"));
    Ok(TokenManager::new(
        config.api.clone(),
        config.locale.clone(),
        config.client.timeout(),
        Arc::new(ReqwestTransport::new()?),
        Arc::new(FileTokenStore::new(path)),
    ))
}

/// Print the browser URL that starts the authorization-code flow.
pub fn run_auth_url(config: &AppConfig) -> Result<i32> {
    let url = token_manager(config)?.authorize_url()?;
    println!("{url}");
    eprintln!("Open the URL above, approve access, then run `mpn-validator auth exchange <CODE>`.");
    Ok(exit_codes::SUCCESS)
}

/// Exchange an authorization code for the active token.
pub fn run_auth_exchange(config: &AppConfig, code: &str) -> Result<i32> {
    let token = token_manager(config)?.exchange_code(code)?;
    eprintln!("Token stored; expires at {}", token.expires_at);
    Ok(exit_codes::SUCCESS)
}

/// Check that a usable token can be obtained.
pub fn run_auth_check(config: &AppConfig) -> Result<i32> {
    let manager = token_manager(config)?;
    eprintln!("Stored token: {:?}", manager.state());
    if manager.ensure_authorized() {
        eprintln!("Authorized.");
        Ok(exit_codes::SUCCESS)
    } else {
        eprintln!("Not authorized.");
        Ok(exit_codes::ERROR)
    }
}
