//! Token acquisition, refresh, fallback and persistence.

mod common;

use common::*;
use mpn_validator::auth::{FileTokenStore, MemoryTokenStore, TokenManager, TokenState, TokenStore};
use mpn_validator::catalog::Transport;
use mpn_validator::error::MpnError;
use mpn_validator::model::Locale;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn manager(transport: MockTransport, store: MemoryTokenStore) -> Harness {
    harness_with_store(transport, Locale::default(), store)
}

#[test]
fn test_no_token_uses_client_credentials() {
    let h = manager(
        MockTransport::scripted(vec![ok(token_body("cc-token", None, 1800))]),
        MemoryTokenStore::new(),
    );
    assert_eq!(h.tokens.state(), TokenState::NoToken);

    let token = h.tokens.ensure_access_token().unwrap();
    assert_eq!(token.access_token, "cc-token");
    assert_eq!(h.tokens.state(), TokenState::Valid);

    let requests = h.transport.token_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(form_field(&requests[0], "grant_type").as_deref(), Some("client_credentials"));
    assert_eq!(form_field(&requests[0], "client_id").as_deref(), Some("test-client"));
    assert_eq!(form_field(&requests[0], "client_secret").as_deref(), Some("test-secret"));
}

#[test]
fn test_valid_token_is_reused() {
    let h = manager(
        MockTransport::scripted(vec![]),
        MemoryTokenStore::with_token(token("still-good", 3600, None)),
    );
    assert_eq!(h.tokens.ensure_access_token().unwrap().access_token, "still-good");
    assert_eq!(h.transport.count(), 0);
}

#[test]
fn test_expiring_token_is_refreshed() {
    let h = manager(
        MockTransport::scripted(vec![ok(token_body("refreshed", None, 1800))]),
        MemoryTokenStore::with_token(token("old", 30, Some("refresh-1"))),
    );
    assert_eq!(h.tokens.state(), TokenState::ExpiringSoon);

    let token = h.tokens.ensure_access_token().unwrap();
    assert_eq!(token.access_token, "refreshed");
    // The grant did not issue a refresh token, so the previous one is kept.
    assert_eq!(token.refresh_token.as_deref(), Some("refresh-1"));

    let requests = h.transport.token_requests();
    assert_eq!(form_field(&requests[0], "grant_type").as_deref(), Some("refresh_token"));
    assert_eq!(form_field(&requests[0], "refresh_token").as_deref(), Some("refresh-1"));
}

#[test]
fn test_failed_refresh_falls_back_to_client_credentials() {
    let h = manager(
        MockTransport::scripted(vec![status(400), ok(token_body("cc-token", None, 1800))]),
        MemoryTokenStore::with_token(token("old", -10, Some("revoked"))),
    );
    assert_eq!(h.tokens.state(), TokenState::Expired);

    let token = h.tokens.ensure_access_token().unwrap();
    assert_eq!(token.access_token, "cc-token");

    let grants: Vec<_> = h
        .transport
        .token_requests()
        .iter()
        .filter_map(|r| form_field(r, "grant_type"))
        .collect();
    assert_eq!(grants, vec!["refresh_token", "client_credentials"]);
}

#[test]
fn test_all_grants_failing_is_authentication_error() {
    let h = manager(
        MockTransport::scripted(vec![status(400), status(401)]),
        MemoryTokenStore::with_token(token("old", -10, Some("revoked"))),
    );

    let err = h.tokens.ensure_access_token().unwrap_err();
    assert!(matches!(err, MpnError::Authentication(_)));
    assert!(err.is_batch_fatal());
    assert_eq!(h.transport.count(), 2);
}

#[test]
fn test_grant_network_failure_is_authentication_error() {
    let h = manager(MockTransport::scripted(vec![network_error()]), MemoryTokenStore::new());
    assert!(matches!(
        h.tokens.ensure_access_token(),
        Err(MpnError::Authentication(_))
    ));
}

#[test]
fn test_exchange_code_replaces_active_token() {
    let h = manager(
        MockTransport::scripted(vec![ok(token_body("user-token", Some("user-refresh"), 1800))]),
        MemoryTokenStore::with_token(token("old", 3600, None)),
    );

    let token = h.tokens.exchange_code(" auth-code ").unwrap();
    assert_eq!(token.access_token, "user-token");
    assert_eq!(h.store.load().unwrap().unwrap().access_token, "user-token");

    let requests = h.transport.token_requests();
    assert_eq!(form_field(&requests[0], "grant_type").as_deref(), Some("authorization_code"));
    assert_eq!(form_field(&requests[0], "code").as_deref(), Some("auth-code"));
    assert!(form_field(&requests[0], "redirect_uri").is_some());
}

#[test]
fn test_token_is_stamped_with_locale() {
    let locale = Locale::new("DE", "de", "EUR");
    let h = harness_with_store(
        MockTransport::scripted(vec![ok(token_body("de-token", None, 1800))]),
        locale.clone(),
        MemoryTokenStore::new(),
    );
    assert_eq!(h.tokens.ensure_access_token().unwrap().locale, locale);
}

#[test]
fn test_concurrent_callers_all_get_a_token() {
    let h = manager(
        MockTransport::new(|_| ok(token_body("shared", None, 1800))),
        MemoryTokenStore::new(),
    );

    std::thread::scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                assert_eq!(h.tokens.ensure_access_token().unwrap().access_token, "shared");
            });
        }
    });
    let grants = h.transport.token_requests().len();
    assert!((1..=8).contains(&grants));
    assert_eq!(h.tokens.state(), TokenState::Valid);

    // Once stored, the token is reused without another grant.
    h.tokens.ensure_access_token().unwrap();
    assert_eq!(h.transport.token_requests().len(), grants);
}

#[test]
fn test_grant_without_lifetime_is_rejected() {
    let h = manager(
        MockTransport::new(|_| ok(r#"{"access_token":"no-expiry","token_type":"Bearer"}"#)),
        MemoryTokenStore::new(),
    );
    assert!(matches!(
        h.tokens.ensure_access_token(),
        Err(MpnError::Authentication(_))
    ));
    assert!(h.store.load().unwrap().is_none());

    let h = manager(
        MockTransport::scripted(vec![ok(token_body("instant", None, 0))]),
        MemoryTokenStore::new(),
    );
    assert!(matches!(
        h.tokens.ensure_access_token(),
        Err(MpnError::Authentication(_))
    ));
    assert_eq!(h.tokens.state(), TokenState::NoToken);
}

#[test]
fn test_file_store_survives_restart() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("token.json");
    let transport: Arc<dyn Transport> = Arc::new(MockTransport::scripted(vec![ok(token_body(
        "persisted",
        Some("r"),
        1800,
    ))]));

    let first = TokenManager::new(
        api(),
        Locale::default(),
        Duration::from_secs(5),
        Arc::clone(&transport),
        Arc::new(FileTokenStore::new(&path)),
    );
    first.ensure_access_token().unwrap();

    let second = TokenManager::new(
        api(),
        Locale::default(),
        Duration::from_secs(5),
        Arc::new(MockTransport::scripted(vec![])),
        Arc::new(FileTokenStore::new(&path)),
    );
    assert_eq!(second.state(), TokenState::Valid);
    assert_eq!(second.ensure_access_token().unwrap().access_token, "persisted");
}

#[test]
fn test_corrupt_token_file_counts_as_no_token() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("token.json");
    std::fs::write(&path, "{not json").unwrap();

    let store = Arc::new(FileTokenStore::new(&path));
    let tokens = TokenManager::new(
        api(),
        Locale::default(),
        Duration::from_secs(5),
        Arc::new(MockTransport::scripted(vec![ok(token_body("new", None, 1800))])),
        store,
    );
    assert_eq!(tokens.state(), TokenState::NoToken);
    assert_eq!(tokens.ensure_access_token().unwrap().access_token, "new");
}
