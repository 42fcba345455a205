#![no_main]
use libfuzzer_sys::fuzz_target;
use mpn_validator::matching::normalize;

/// Fuzz MPN normalization.
///
/// Normalization must accept any string and never leave whitespace or
/// hyphens in the key.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let normalized = normalize(s);
        assert!(!normalized.chars().any(char::is_whitespace));
        assert!(!normalized.contains('-'));
    }
});
