//! Configuration file loading and discovery.

use super::types::AppConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file names searched in each location, in order.
const CONFIG_FILE_NAMES: &[&str] = &[
    ".mpn-validator.yaml",
    ".mpn-validator.yml",
    "mpn-validator.yaml",
    "mpn-validator.yml",
];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (`~/.config/mpn-validator/`)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path.filter(|p| p.exists()) {
        return Some(path.to_path_buf());
    }

    let cwd = std::env::current_dir().ok();
    let candidates = [
        cwd.clone(),
        cwd.as_deref().and_then(find_git_root),
        dirs::config_dir().map(|d| d.join("mpn-validator")),
        dirs::home_dir(),
    ];

    candidates
        .iter()
        .flatten()
        .find_map(|dir| find_config_in_dir(dir))
}

fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

/// Path `config init` writes to when none is given.
#[must_use]
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("mpn-validator").join("mpn-validator.yaml"))
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAMES[0]))
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load config from a discovered file, or return the default.
///
/// Environment overrides are applied in both cases.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    let (mut config, loaded_from) = discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    );
    config.apply_env_overrides();
    (config, loaded_from)
}

/// Generate an example config file.
#[must_use]
pub fn generate_example_config() -> String {
    let example = AppConfig::default();
    format!(
        r"# mpn-validator configuration
# Place this file at .mpn-validator.yaml in your project root or
# ~/.config/mpn-validator/mpn-validator.yaml.
#
# Credentials can be supplied through MPN_CLIENT_ID / MPN_CLIENT_SECRET
# instead of being stored here.

{}",
        serde_yaml::to_string(&example).unwrap_or_default()
    )
}
