//! Strict match evaluation over catalog search responses.
//!
//! A query is valid only when a catalog candidate normalizes to exactly the
//! same key. Near misses are never promoted to a match; they are returned as
//! suggestions instead.

use super::normalize::normalize;
use super::package::{annotate, package_label};
use crate::catalog::response::{KeywordSearchResponse, ProductEntry};
use crate::model::{Category, Locale, ValidationResult, MAX_CANONICAL_SUGGESTIONS};

/// One candidate MPN drawn from a search response.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    /// MPN as spelled by the catalog
    pub mpn: String,
    /// Normalized form used for comparison
    pub normalized: String,
    /// MPN with its package label, if one could be derived
    pub annotated: String,
    /// The search entry the candidate came from
    pub entry: &'a ProductEntry,
}

/// Verdict produced by [`evaluate`], before locale and lifecycle are added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchOutcome {
    pub valid: bool,
    pub canonical_mpn: Option<String>,
    pub all_canonical_mpns: Vec<String>,
    pub reference_part_number: Option<String>,
    pub category: Option<Category>,
}

impl MatchOutcome {
    /// Turn the outcome into a caller-facing result for `locale`.
    #[must_use]
    pub fn into_result(self, locale: &Locale) -> ValidationResult {
        let mut result = ValidationResult::not_found(locale);
        result.valid = self.valid;
        result.canonical_mpn = self.canonical_mpn;
        result.all_canonical_mpns = self.all_canonical_mpns;
        result.category = self.category;
        if self.valid {
            result.reference_part_number = self.reference_part_number;
        }
        result
    }
}

/// Collect up to ten distinct candidates, exact matches first.
#[must_use]
pub fn collect_candidates(results: &KeywordSearchResponse) -> Vec<Candidate<'_>> {
    let mut candidates: Vec<Candidate<'_>> = Vec::new();

    for entry in results.entries() {
        if candidates.len() >= MAX_CANONICAL_SUGGESTIONS {
            break;
        }
        let Some(mpn) = entry
            .manufacturer_product_number
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
        else {
            continue;
        };
        if candidates.iter().any(|c| c.mpn == mpn) {
            continue;
        }

        let label = entry_package_label(entry);
        candidates.push(Candidate {
            mpn: mpn.to_string(),
            normalized: normalize(mpn),
            annotated: annotate(mpn, label.as_deref()),
            entry,
        });
    }

    candidates
}

/// First derivable package label among an entry's variations.
fn entry_package_label(entry: &ProductEntry) -> Option<String> {
    entry
        .product_variations
        .iter()
        .filter_map(|v| v.package_type.as_ref()?.name.as_deref())
        .find_map(package_label)
}

/// Evaluate a search response against a normalized query.
///
/// `manufacturer_hint` only breaks ties between candidates that normalize
/// identically; it never makes a non-matching candidate valid.
#[must_use]
pub fn evaluate(
    results: &KeywordSearchResponse,
    normalized_mpn: &str,
    manufacturer_hint: Option<&str>,
) -> MatchOutcome {
    let candidates = collect_candidates(results);
    let all_canonical_mpns: Vec<String> = candidates.iter().map(|c| c.annotated.clone()).collect();
    let category = extract_category(results);

    let winner = if normalized_mpn.is_empty() {
        None
    } else {
        pick_winner(&candidates, normalized_mpn, manufacturer_hint)
    };

    match winner {
        Some(winner) => MatchOutcome {
            valid: true,
            canonical_mpn: Some(winner.annotated.clone()),
            reference_part_number: select_reference_part(winner.entry),
            all_canonical_mpns,
            category,
        },
        None => MatchOutcome {
            valid: false,
            canonical_mpn: all_canonical_mpns.first().cloned(),
            reference_part_number: None,
            all_canonical_mpns,
            category,
        },
    }
}

fn pick_winner<'c, 'a>(
    candidates: &'c [Candidate<'a>],
    normalized_mpn: &str,
    manufacturer_hint: Option<&str>,
) -> Option<&'c Candidate<'a>> {
    let mut exact = candidates.iter().filter(|c| c.normalized == normalized_mpn);
    let first = exact.next()?;

    let hint = manufacturer_hint
        .map(|h| h.trim().to_lowercase())
        .filter(|h| !h.is_empty());
    let Some(hint) = hint else {
        return Some(first);
    };

    let made_by_hint = |c: &Candidate<'_>| {
        c.entry
            .manufacturer
            .as_ref()
            .and_then(|m| m.name.as_deref())
            .is_some_and(|name| name.to_lowercase().contains(&hint))
    };

    if made_by_hint(first) {
        return Some(first);
    }
    Some(exact.find(|c| made_by_hint(c)).unwrap_or(first))
}

/// Category of the first exact match, else of the first general match.
#[must_use]
pub fn extract_category(results: &KeywordSearchResponse) -> Option<Category> {
    let to_category = |entry: &ProductEntry| {
        let node = entry.category.as_ref()?;
        let name = node.name.as_deref()?.trim();
        if name.is_empty() {
            return None;
        }
        Some(Category {
            name: name.to_string(),
            id: node.id,
            parent_id: node.parent_id,
        })
    };

    results
        .exact_matches
        .first()
        .and_then(to_category)
        .or_else(|| results.products.first().and_then(to_category))
}

/// Reference part number used for the lifecycle lookup.
///
/// Prefers a cut-tape variation, else the first variation with a part number.
#[must_use]
pub fn select_reference_part(entry: &ProductEntry) -> Option<String> {
    let with_number = || {
        entry.product_variations.iter().filter(|v| {
            v.reference_part_number
                .as_deref()
                .is_some_and(|n| !n.trim().is_empty())
        })
    };

    let cut_tape = with_number().find(|v| {
        v.package_type
            .as_ref()
            .and_then(|p| p.name.as_deref())
            .is_some_and(|name| name.to_lowercase().contains("cut tape"))
    });

    cut_tape
        .or_else(|| with_number().next())
        .and_then(|v| v.reference_part_number.as_deref())
        .map(|n| n.trim().to_string())
}
