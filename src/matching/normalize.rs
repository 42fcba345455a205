//! MPN canonicalization.
//!
//! The normalized form is the primary lookup key for both cache tiers and
//! the comparison key of the strict match rule, so it must stay stable:
//! changing it silently re-keys every persisted cache entry.

/// Vendor packaging suffixes, in the order they are tried.
///
/// At most one is removed per call. An input that consists of nothing but a
/// suffix (`"CT"`, `"reel"`) is kept whole instead of normalizing to the
/// empty string, which would drop it from a batch as blank.
pub const VENDOR_SUFFIXES: &[&str] = &["g4", "t1", "tr", "reel", "ct"];

/// Normalize a raw MPN.
///
/// Lower-cases, maps non-breaking spaces to spaces, drops all whitespace and
/// hyphens, then strips the first matching entry of [`VENDOR_SUFFIXES`]
/// from the tail. A suffix is never stripped when it is the whole string.
///
/// ```
/// use mpn_validator::matching::normalize;
///
/// assert_eq!(normalize("LM358-G4 "), "lm358");
/// assert_eq!(normalize("lm358g4"), "lm358");
/// assert_eq!(normalize("  "), "");
/// ```
#[must_use]
pub fn normalize(raw: &str) -> String {
    let compact: String = raw
        .replace('\u{a0}', " ")
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();

    strip_vendor_suffix(&compact).to_string()
}

/// Strip exactly one known vendor suffix.
fn strip_vendor_suffix(compact: &str) -> &str {
    for suffix in VENDOR_SUFFIXES {
        if let Some(stripped) = compact.strip_suffix(suffix) {
            if !stripped.is_empty() {
                return stripped;
            }
        }
    }
    compact
}

/// Whether two raw MPNs normalize to the same key.
#[must_use]
pub fn same_part(a: &str, b: &str) -> bool {
    let na = normalize(a);
    !na.is_empty() && na == normalize(b)
}
