#![no_main]
use libfuzzer_sys::fuzz_target;
use mpn_validator::catalog::KeywordSearchResponse;
use mpn_validator::matching::evaluate;
use mpn_validator::model::Locale;

/// Fuzz the match engine over arbitrary search payloads.
///
/// Whatever the catalog returns, an invalid verdict must never carry a
/// reference part number.
fuzz_target!(|data: &[u8]| {
    let Some((query, payload)) = data.split_first() else {
        return;
    };
    let Ok(response) = serde_json::from_slice::<KeywordSearchResponse>(payload) else {
        return;
    };
    let query = format!("q{query}");
    let result = evaluate(&response, &query, None).into_result(&Locale::default());
    assert!(result.upholds_invariant());
});
