//! Validation verdicts returned to callers.

use super::Locale;
use serde::{Deserialize, Serialize};

/// Maximum number of canonical suggestions kept per result.
pub const MAX_CANONICAL_SUGGESTIONS: usize = 10;

/// Lifecycle / end-of-life detail for a matched part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lifecycle {
    /// Catalog product status (e.g. "Active", "Obsolete", "Last Time Buy")
    pub status: Option<String>,
    /// Part has reached end of life
    pub end_of_life: bool,
    /// Part is discontinued
    pub discontinued: bool,
    /// Part is normally stocked
    pub normally_stocking: bool,
    /// Last-time-buy date, as reported upstream
    pub last_buy_chance: Option<String>,
}

impl Lifecycle {
    /// Whether the part should be flagged to the user as at-risk.
    #[must_use]
    pub fn is_at_risk(&self) -> bool {
        self.end_of_life
            || self.discontinued
            || self.last_buy_chance.is_some()
            || self
                .status
                .as_deref()
                .is_some_and(|s| !s.eq_ignore_ascii_case("active"))
    }
}

/// Catalog category of a matched part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub name: String,
    pub id: Option<i64>,
    pub parent_id: Option<i64>,
}

/// The verdict for one normalized MPN.
///
/// `valid == false` implies `lifecycle` and `reference_part_number` are
/// `None`. Suggestions may still be present on invalid results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_mpn: Option<String>,
    #[serde(default)]
    pub all_canonical_mpns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_part_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle: Option<Lifecycle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub site: String,
    pub language: String,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ValidationResult {
    /// A negative result with no suggestions.
    #[must_use]
    pub fn not_found(locale: &Locale) -> Self {
        Self {
            valid: false,
            canonical_mpn: None,
            all_canonical_mpns: Vec::new(),
            reference_part_number: None,
            lifecycle: None,
            category: None,
            site: locale.site.clone(),
            language: locale.language.clone(),
            currency: locale.currency.clone(),
            error: None,
        }
    }

    /// A negative result carrying an upstream diagnostic.
    #[must_use]
    pub fn failed(locale: &Locale, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::not_found(locale)
        }
    }

    /// Whether this result records a lookup failure rather than a verdict.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Attach lifecycle detail. Ignored for invalid results.
    pub fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        if self.valid {
            self.lifecycle = Some(lifecycle);
        }
    }

    /// Whether the invalid-implies-no-lifecycle rule holds.
    #[must_use]
    pub const fn upholds_invariant(&self) -> bool {
        self.valid || (self.lifecycle.is_none() && self.reference_part_number.is_none())
    }

    /// The locale this result was produced under.
    #[must_use]
    pub fn locale(&self) -> Locale {
        Locale {
            site: self.site.clone(),
            language: self.language.clone(),
            currency: self.currency.clone(),
        }
    }
}
