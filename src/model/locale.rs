//! Locale context for catalog lookups.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The (site, language, currency) triple that scopes catalog results,
/// pricing and cache entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Locale {
    /// Two-letter site code (e.g. "US", "DE")
    pub site: String,
    /// Two-letter language code (e.g. "en")
    pub language: String,
    /// ISO 4217 currency code (e.g. "USD")
    pub currency: String,
}

impl Locale {
    /// Create a locale, normalizing case the way the catalog expects it.
    pub fn new(
        site: impl Into<String>,
        language: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            site: site.into().trim().to_uppercase(),
            language: language.into().trim().to_lowercase(),
            currency: currency.into().trim().to_uppercase(),
        }
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::new("US", "en", "USD")
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.site, self.language, self.currency)
    }
}
