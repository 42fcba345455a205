//! Compact package labels for canonical suggestions.
//!
//! The catalog describes packages verbosely (`8-SOIC (0.154", 3.90mm Width)`);
//! suggestions shown next to a spreadsheet cell need the short form
//! (`SOIC-8`).

use regex::Regex;
use std::sync::LazyLock;

/// Descriptive strings with a fixed short label.
const KNOWN_PACKAGES: &[(&str, &str)] = &[
    ("8-SOIC (0.154\", 3.90mm Width)", "SOIC-8"),
    ("14-SOIC (0.154\", 3.90mm Width)", "SOIC-14"),
    ("16-SOIC (0.154\", 3.90mm Width)", "SOIC-16"),
    ("16-SOIC (0.295\", 7.50mm Width)", "SOIC-16W"),
    ("8-DIP (0.300\", 7.62mm)", "DIP-8"),
    ("14-DIP (0.300\", 7.62mm)", "DIP-14"),
    ("16-DIP (0.300\", 7.62mm)", "DIP-16"),
    ("8-TSSOP (0.173\", 4.40mm Width)", "TSSOP-8"),
    ("8-MSOP, Micro8™", "MSOP-8"),
    ("TO-236-3, SC-59, SOT-23-3", "SOT-23"),
    ("SC-74A, SOT-753", "SOT-23-5"),
    ("SOT-23-5 Thin, TSOT-23-5", "TSOT-23-5"),
    ("TO-220-3", "TO-220"),
    ("TO-92-3 (TO-226_AA)", "TO-92"),
    ("TO-252-3, DPAK (2 Leads + Tab), SC-63", "DPAK"),
    ("TO-263-3, D²Pak (2 Leads + Tab), TO-263AB", "D2PAK"),
    ("0402 (1005 Metric)", "0402"),
    ("0603 (1608 Metric)", "0603"),
    ("0805 (2012 Metric)", "0805"),
    ("1206 (3216 Metric)", "1206"),
];

/// `N-FAMILY ...` package descriptions, e.g. `48-LQFP` or `20-TSSOP (...)`.
static PIN_FAMILY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d+)-(SOIC|DIP|PDIP|SOP|SSOP|TSSOP|MSOP|LQFP|TQFP|QFP|QFN|VQFN|WQFN|DFN)\b")
        .expect("static regex")
});

/// Parenthetical qualifiers such as `(0.154", 3.90mm Width)`.
static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\([^)]*\)").expect("static regex"));

/// Derive a compact label from a catalog package description.
///
/// Returns `None` for blank input or descriptions that reduce to nothing.
#[must_use]
pub fn package_label(description: &str) -> Option<String> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some((_, label)) = KNOWN_PACKAGES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(trimmed))
    {
        return Some((*label).to_string());
    }

    if let Some(caps) = PIN_FAMILY.captures(trimmed) {
        let pins = &caps[1];
        let family = caps[2].to_uppercase();
        return Some(format!("{family}-{pins}"));
    }

    let stripped = PARENTHETICAL.replace_all(trimmed, "");
    let stripped = stripped.trim();
    if stripped.is_empty() {
        None
    } else {
        Some(stripped.to_string())
    }
}

/// Format an MPN with its package label, e.g. `LM358DR (SOIC-8)`.
#[must_use]
pub fn annotate(mpn: &str, label: Option<&str>) -> String {
    match label {
        Some(label) if !label.is_empty() => format!("{mpn} ({label})"),
        _ => mpn.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_descriptions() {
        assert_eq!(
            package_label("8-SOIC (0.154\", 3.90mm Width)").as_deref(),
            Some("SOIC-8")
        );
        assert_eq!(package_label("TO-220-3").as_deref(), Some("TO-220"));
        assert_eq!(package_label("0603 (1608 Metric)").as_deref(), Some("0603"));
    }

    #[test]
    fn test_pin_family_fallback() {
        assert_eq!(
            package_label("20-TSSOP (0.173\", 4.40mm Width)").as_deref(),
            Some("TSSOP-20")
        );
        assert_eq!(package_label("48-LQFP").as_deref(), Some("LQFP-48"));
        assert_eq!(package_label("28-dip (0.600\", 15.24mm)").as_deref(), Some("DIP-28"));
    }

    #[test]
    fn test_parenthetical_fallback() {
        assert_eq!(
            package_label("Tape & Reel (TR)").as_deref(),
            Some("Tape & Reel")
        );
        assert_eq!(package_label("Cut Tape (CT)").as_deref(), Some("Cut Tape"));
        assert_eq!(package_label("(obsolete)"), None);
        assert_eq!(package_label("   "), None);
    }

    #[test]
    fn test_annotate() {
        assert_eq!(annotate("LM358DR", Some("SOIC-8")), "LM358DR (SOIC-8)");
        assert_eq!(annotate("LM358DR", None), "LM358DR");
        assert_eq!(annotate("LM358DR", Some("")), "LM358DR");
    }
}
