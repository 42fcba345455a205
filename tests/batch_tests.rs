//! End-to-end batch validation over a mocked catalog.

mod common;

use common::*;
use mpn_validator::cache::{CacheKey, EphemeralCache, MemoryResultStore, ResultStore, TwoTierCache};
use mpn_validator::catalog::HttpResponse;
use mpn_validator::config::BatchConfig;
use mpn_validator::enrichment::{CatalogLifecycleEnricher, NoOpLifecycleEnricher};
use mpn_validator::error::MpnError;
use mpn_validator::matching::normalize;
use mpn_validator::model::Locale;
use mpn_validator::pipeline::BatchValidator;
use mpn_validator::auth::MemoryTokenStore;
use std::collections::HashMap;
use std::sync::Arc;

const EMPTY_SEARCH: &str = r#"{"ExactMatches": [], "Products": []}"#;

/// Catalog that knows LM358N and answers 400 for `BADREQ`.
fn catalog() -> MockTransport {
    MockTransport::new(|request| {
        if request.url.ends_with("/productdetails") {
            return ok(details_body("Active"));
        }
        match search_keyword(request).as_deref() {
            Some("BADREQ") => Ok(HttpResponse::new(400, "bad request")),
            Some(keyword) if normalize(keyword) == "lm358n" => {
                ok(search_body("LM358N", "Texas Instruments", "296-1395-1-ND"))
            }
            Some(keyword) if normalize(keyword) == "lm358" => {
                ok(search_body("LM358DR", "Texas Instruments", "296-1014-1-ND"))
            }
            _ => ok(EMPTY_SEARCH),
        }
    })
}

fn memory_cache() -> Arc<TwoTierCache> {
    Arc::new(TwoTierCache::new(
        EphemeralCache::default(),
        Arc::new(MemoryResultStore::new()),
    ))
}

fn validator(h: &Harness, cache: Arc<TwoTierCache>) -> BatchValidator {
    BatchValidator::new(
        Arc::clone(&h.client),
        cache,
        Arc::new(CatalogLifecycleEnricher::new(Arc::clone(&h.client))),
        &BatchConfig::default(),
    )
    .unwrap()
}

fn searches(h: &Harness) -> usize {
    h.transport
        .catalog_requests()
        .iter()
        .filter(|r| search_keyword(r).is_some())
        .count()
}

#[test]
fn test_duplicates_and_blanks_collapse() {
    let h = harness(catalog(), Locale::default());
    let validator = validator(&h, memory_cache());

    let (results, stats) = validator
        .validate_batch_with_stats(&["LM358N", "lm358n", "", "LM358N"], None, None)
        .unwrap();

    assert_eq!(results.len(), 1);
    let result = &results["lm358n"];
    assert!(result.valid);
    assert!(result.canonical_mpn.as_deref().unwrap().starts_with("LM358N"));
    assert_eq!(result.reference_part_number.as_deref(), Some("296-1395-1-ND"));
    assert_eq!(result.category.as_ref().unwrap().name, "Linear, Amplifiers");
    assert_eq!(
        result.lifecycle.as_ref().and_then(|l| l.status.as_deref()),
        Some("Active")
    );
    assert_eq!((result.site.as_str(), result.currency.as_str()), ("US", "USD"));

    assert_eq!(searches(&h), 1);
    assert_eq!(stats.inputs, 4);
    assert_eq!(stats.unique_mpns, 1);
    assert_eq!(stats.api_lookups, 1);
    assert_eq!(stats.lifecycle_enriched, 1);
}

#[test]
fn test_first_seen_spelling_is_the_search_keyword() {
    let h = harness(catalog(), Locale::default());
    validator(&h, memory_cache())
        .validate_batch(&["  lm358n ", "LM358N"], None, None)
        .unwrap();

    let keywords: Vec<_> = h
        .transport
        .catalog_requests()
        .iter()
        .filter_map(search_keyword)
        .collect();
    assert_eq!(keywords, vec!["lm358n"]);
}

#[test]
fn test_second_batch_served_from_cache() {
    let h = harness(catalog(), Locale::default());
    let cache = memory_cache();
    let validator = validator(&h, Arc::clone(&cache));

    let first = validator.validate_batch(&["LM358N", "XYZ999"], None, None).unwrap();
    let calls = h.transport.count();

    let (second, stats) = validator
        .validate_batch_with_stats(&["lm358n", "xyz999"], None, None)
        .unwrap();
    assert_eq!(h.transport.count(), calls);
    assert_eq!(first, second);
    assert_eq!(stats.persistent_hits, 2);
    assert_eq!(stats.api_lookups, 0);
}

#[test]
fn test_refresh_bypasses_cache_reads() {
    let h = harness(catalog(), Locale::default());
    let cache = memory_cache();
    validator(&h, Arc::clone(&cache))
        .validate_batch(&["LM358N"], None, None)
        .unwrap();

    let refreshing = validator(&h, cache).with_bypass_cache(true);
    refreshing.validate_batch(&["LM358N"], None, None).unwrap();
    assert_eq!(searches(&h), 2);
}

#[test]
fn test_invalid_mpn_gets_suggestions() {
    let h = harness(catalog(), Locale::default());
    let results = validator(&h, memory_cache())
        .validate_batch(&["LM358"], None, None)
        .unwrap();

    let result = &results["lm358"];
    assert!(!result.valid);
    assert!(result.canonical_mpn.as_deref().unwrap().starts_with("LM358DR"));
    assert_eq!(result.all_canonical_mpns.len(), 1);
    assert!(result.reference_part_number.is_none());
    assert!(result.lifecycle.is_none());
    assert!(result.upholds_invariant());
    // No lifecycle lookup for invalid parts.
    assert!(!h
        .transport
        .requests()
        .iter()
        .any(|r| r.url.ends_with("/productdetails")));
}

#[test]
fn test_authentication_failure_fails_the_batch() {
    let h = harness_with_store(
        MockTransport::new(|_| status(401)),
        Locale::default(),
        MemoryTokenStore::new(),
    );
    let err = validator(&h, memory_cache())
        .validate_batch(&["LM358N", "NE555P"], None, None)
        .unwrap_err();
    assert!(matches!(err, MpnError::Authentication(_)));
}

#[test]
fn test_upstream_error_is_recorded_and_cached_briefly() {
    let h = harness(catalog(), Locale::default());
    let cache = memory_cache();
    let validator = validator(&h, Arc::clone(&cache));

    let (results, stats) = validator
        .validate_batch_with_stats(&["BADREQ", "LM358N"], None, None)
        .unwrap();

    let failed = &results["badreq"];
    assert!(!failed.valid);
    assert!(failed.error.as_deref().unwrap().contains("400"));
    assert!(results["lm358n"].valid);
    assert_eq!(stats.lookup_errors, 1);

    let key = CacheKey::new("badreq", None, &Locale::default());
    assert!(cache.persistent().get(&key).unwrap().is_none());
    assert!(cache.ephemeral().get(&key).is_some());

    // Served from the ephemeral tier until the error TTL lapses.
    let before = h.transport.count();
    validator.validate_batch(&["BADREQ"], None, None).unwrap();
    assert_eq!(h.transport.count(), before);
}

#[test]
fn test_lifecycle_failure_keeps_valid_result() {
    let h = harness(
        MockTransport::new(|request| {
            if request.url.ends_with("/productdetails") {
                return Ok(HttpResponse::new(404, "not found"));
            }
            ok(search_body("LM358N", "Texas Instruments", "296-1395-1-ND"))
        }),
        Locale::default(),
    );
    let cache = memory_cache();
    let validator = validator(&h, Arc::clone(&cache));

    let (results, stats) = validator
        .validate_batch_with_stats(&["LM358N"], None, None)
        .unwrap();

    let result = &results["lm358n"];
    assert!(result.valid);
    assert!(result.lifecycle.is_none());
    assert!(result.error.is_none());
    assert_eq!(result.reference_part_number.as_deref(), Some("296-1395-1-ND"));
    assert_eq!(stats.lifecycle_failed, 1);
    assert_eq!(stats.lifecycle_enriched, 0);
    assert_eq!(stats.lookup_errors, 0);
    assert!(stats.errors[0].contains("404"));

    let key = CacheKey::new("lm358n", None, &Locale::default());
    let stored = cache.persistent().get(&key).unwrap().unwrap();
    assert!(stored.result.valid);
    assert!(stored.result.lifecycle.is_none());
}

#[test]
fn test_lifecycle_network_failure_keeps_valid_result() {
    let h = harness(
        MockTransport::new(|request| {
            if request.url.ends_with("/productdetails") {
                return network_error();
            }
            ok(search_body("LM358N", "Texas Instruments", "296-1395-1-ND"))
        }),
        Locale::default(),
    );
    let validator = validator(&h, memory_cache());

    let (results, stats) = validator
        .validate_batch_with_stats(&["LM358N"], None, None)
        .unwrap();

    assert!(results["lm358n"].valid);
    assert!(results["lm358n"].lifecycle.is_none());
    assert_eq!(stats.lifecycle_failed, 1);
    // Details retried with backoff before giving up.
    assert_eq!(h.sleeper.slept().len(), 4);
}

#[test]
fn test_currency_scopes_cache_entries() {
    let cache = memory_cache();

    let usd = harness(catalog(), Locale::default());
    validator(&usd, Arc::clone(&cache))
        .validate_batch(&["LM358N"], None, None)
        .unwrap();

    let eur = harness(catalog(), Locale::new("US", "en", "EUR"));
    let results = validator(&eur, Arc::clone(&cache))
        .validate_batch(&["LM358N"], None, None)
        .unwrap();
    assert_eq!(searches(&eur), 1);
    assert_eq!(results["lm358n"].currency, "EUR");
    assert_eq!(cache.stats().unwrap().total_entries, 2);
}

#[test]
fn test_manufacturer_id_filters_and_scopes() {
    let h = harness(catalog(), Locale::default());
    let cache = memory_cache();
    let validator = validator(&h, Arc::clone(&cache));

    validator.validate_batch(&["LM358N"], None, Some("296")).unwrap();
    let search = h
        .transport
        .catalog_requests()
        .into_iter()
        .find(|r| search_keyword(r).is_some())
        .unwrap();
    match search.body {
        Some(mpn_validator::catalog::RequestBody::Json(body)) => {
            assert_eq!(body["FilterOptionsRequest"]["ManufacturerFilter"][0]["Id"], "296");
        }
        other => panic!("unexpected body {other:?}"),
    }

    validator.validate_batch(&["LM358N"], None, None).unwrap();
    assert_eq!(searches(&h), 2);
}

#[test]
fn test_hints_by_raw_or_trimmed_spelling() {
    let transport = MockTransport::new(|request| {
        if search_keyword(request).is_none() {
            return ok(details_body("Active"));
        }
        ok(serde_json::json!({
            "ExactMatches": [
                {"ManufacturerProductNumber": "BAT54", "Manufacturer": {"Name": "Nexperia"},
                 "ProductVariations": [{"DigiKeyProductNumber": "NEX-1"}]},
                {"ManufacturerProductNumber": "BAT-54", "Manufacturer": {"Name": "onsemi"},
                 "ProductVariations": [{"DigiKeyProductNumber": "ON-1"}]}
            ]
        })
        .to_string())
    });
    let h = harness(transport, Locale::default());
    let validator = BatchValidator::new(
        Arc::clone(&h.client),
        memory_cache(),
        Arc::new(NoOpLifecycleEnricher),
        &BatchConfig::default(),
    )
    .unwrap();

    let hints = HashMap::from([("BAT54".to_string(), "ONSEMI".to_string())]);
    let results = validator
        .validate_batch(&[" BAT54 "], Some(&hints), None)
        .unwrap();
    assert_eq!(results["bat54"].canonical_mpn.as_deref(), Some("BAT-54"));
    assert_eq!(results["bat54"].reference_part_number.as_deref(), Some("ON-1"));
}

#[test]
fn test_results_follow_first_seen_order() {
    let h = harness(catalog(), Locale::default());
    let results = validator(&h, memory_cache())
        .validate_batch(&["zzz1", "LM358N", "aaa2", "zzz1"], None, None)
        .unwrap();
    let keys: Vec<_> = results.keys().cloned().collect();
    assert_eq!(keys, vec!["zzz1", "lm358n", "aaa2"]);
}
