//! Property tests for MPN normalization and package labels.

use mpn_validator::matching::{normalize, package_label, same_part, VENDOR_SUFFIXES};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Normalization never panics and never keeps whitespace or hyphens.
    #[test]
    fn normalize_is_total(raw in "\\PC{0,40}") {
        let normalized = normalize(&raw);
        prop_assert!(!normalized.chars().any(char::is_whitespace));
        prop_assert!(!normalized.contains('-'));
    }

    #[test]
    fn normalize_lowercases_ascii(raw in "[ -~]{0,40}") {
        prop_assert!(!normalize(&raw).chars().any(|c| c.is_ascii_uppercase()));
    }

    /// Realistic part numbers (no stacked vendor suffixes) normalize to a fixed point.
    #[test]
    fn normalize_is_idempotent_for_part_numbers(
        stem in "[A-Z]{2,4}[0-9]{2,5}[A-Z]{0,2}",
        suffix in prop::sample::select(vec!["", "-G4", "T1", "TR", "/REEL", " CT"]),
    ) {
        let once = normalize(&format!("{stem}{suffix}"));
        let stacked = VENDOR_SUFFIXES.iter().any(|s| once.ends_with(s));
        prop_assume!(!stacked);
        prop_assert_eq!(normalize(&once), once);
    }

    /// Case, hyphens and surrounding whitespace never change the key.
    #[test]
    fn formatting_does_not_change_identity(stem in "[A-Za-z0-9]{1,12}") {
        let decorated = format!("  {}- ", stem.to_uppercase());
        prop_assert!(same_part(&stem, &decorated));
    }

    /// Package-label derivation never panics and never yields an empty label.
    #[test]
    fn package_label_is_total(description in "\\PC{0,60}") {
        if let Some(label) = package_label(&description) {
            prop_assert!(!label.trim().is_empty());
        }
    }
}
