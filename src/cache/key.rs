//! Composite cache key.

use crate::model::Locale;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Manufacturer component of keys for unscoped lookups.
pub const ANY_MANUFACTURER: &str = "any";

/// Key shared by both cache tiers.
///
/// Results are scoped by manufacturer and locale, so two lookups that
/// differ only in currency never share an entry.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheKey {
    /// Normalized MPN
    pub mpn: String,
    /// Manufacturer id, or [`ANY_MANUFACTURER`]
    pub manufacturer_id: String,
    pub site: String,
    pub language: String,
    pub currency: String,
}

impl CacheKey {
    pub fn new(normalized_mpn: impl Into<String>, manufacturer_id: Option<&str>, locale: &Locale) -> Self {
        Self {
            mpn: normalized_mpn.into(),
            manufacturer_id: manufacturer_id
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .unwrap_or(ANY_MANUFACTURER)
                .to_string(),
            site: locale.site.clone(),
            language: locale.language.clone(),
            currency: locale.currency.clone(),
        }
    }

    /// SHA-256 of the key's canonical string.
    #[must_use]
    pub fn digest(&self) -> [u8; 32] {
        let hash = Sha256::digest(self.to_string().as_bytes());
        let mut out = [0u8; 32];
        out.copy_from_slice(&hash);
        out
    }

    /// Convert to a filesystem-safe filename using SHA256 hash.
    #[must_use]
    pub fn to_filename(&self) -> String {
        let hex: String = self.digest().iter().map(|b| format!("{b:02x}")).collect();
        format!("{hex}.json")
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|{}",
            self.mpn, self.manufacturer_id, self.site, self.language, self.currency
        )
    }
}
