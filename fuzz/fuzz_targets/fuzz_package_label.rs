#![no_main]
use libfuzzer_sys::fuzz_target;
use mpn_validator::matching::package_label;

/// Fuzz package-label derivation from catalog package descriptions.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Some(label) = package_label(s) {
            assert!(!label.trim().is_empty());
        }
    }
});
