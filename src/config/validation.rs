//! Configuration validation.

use super::types::{ApiConfig, AppConfig, BatchConfig, CacheConfig, ClientConfig};
use crate::model::Locale;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.api.validate());
        errors.extend(self.locale.validate());
        errors.extend(self.cache.validate());
        errors.extend(self.client.validate());
        errors.extend(self.batch.validate());
        errors
    }
}

impl Validatable for ApiConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if url::Url::parse(&self.base_url).is_err() {
            errors.push(ConfigError::new(
                "api.base_url",
                format!("Not a valid URL: '{}'", self.base_url),
            ));
        }
        if url::Url::parse(&self.redirect_uri).is_err() {
            errors.push(ConfigError::new(
                "api.redirect_uri",
                format!("Not a valid URL: '{}'", self.redirect_uri),
            ));
        }
        errors
    }
}

impl Validatable for Locale {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let checks = [
            ("locale.site", &self.site, 2),
            ("locale.language", &self.language, 2),
            ("locale.currency", &self.currency, 3),
        ];
        for (field, value, len) in checks {
            if value.len() != len || !value.chars().all(|c| c.is_ascii_alphabetic()) {
                errors.push(ConfigError::new(
                    field,
                    format!("Expected {len} ASCII letters, got '{value}'"),
                ));
            }
        }
        errors
    }
}

impl Validatable for CacheConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.success_ttl_hours == 0 {
            errors.push(ConfigError::new(
                "cache.success_ttl_hours",
                "Success TTL must be at least 1 hour",
            ));
        }
        if self.error_ttl_minutes == 0 {
            errors.push(ConfigError::new(
                "cache.error_ttl_minutes",
                "Error TTL must be at least 1 minute",
            ));
        }
        if self.invalid_cleanup_days > self.cleanup_days {
            errors.push(ConfigError::new(
                "cache.invalid_cleanup_days",
                format!(
                    "Invalid-entry retention ({}) exceeds general retention ({})",
                    self.invalid_cleanup_days, self.cleanup_days
                ),
            ));
        }
        errors
    }
}

impl Validatable for ClientConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.timeout_secs == 0 {
            errors.push(ConfigError::new("client.timeout_secs", "Timeout must be at least 1 second"));
        }
        if self.max_attempts == 0 {
            errors.push(ConfigError::new("client.max_attempts", "At least one attempt is required"));
        }
        errors
    }
}

impl Validatable for BatchConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.max_concurrent == 0 {
            errors.push(ConfigError::new(
                "batch.max_concurrent",
                "Max concurrent requests must be at least 1",
            ));
        }
        if self.record_count == 0 {
            errors.push(ConfigError::new("batch.record_count", "Record count must be at least 1"));
        }
        errors
    }
}
