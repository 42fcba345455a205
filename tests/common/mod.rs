//! Shared fixtures for integration tests: a scripted transport and a
//! sleeper that records instead of blocking.

#![allow(dead_code)]

use chrono::{Duration as ChronoDuration, Utc};
use mpn_validator::auth::{MemoryTokenStore, OAuthToken, TokenManager, TokenStore};
use mpn_validator::catalog::{
    CatalogClient, HttpRequest, HttpResponse, RequestBody, Sleeper, Transport,
};
use mpn_validator::config::{ApiConfig, ClientConfig};
use mpn_validator::error::{MpnError, Result, UpstreamErrorKind};
use mpn_validator::model::Locale;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE_URL: &str = "https://api.test";

type Handler = Box<dyn Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync>;

/// Transport that answers from a handler and records every request.
pub struct MockTransport {
    handler: Handler,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new(handler: impl Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer requests from a fixed queue, in order.
    pub fn scripted(responses: Vec<Result<HttpResponse>>) -> Self {
        let queue = Mutex::new(VecDeque::from(responses));
        Self::new(move |request| {
            queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| panic!("unscripted request: {} {}", request.method, request.url))
        })
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Requests sent to the token endpoint.
    pub fn token_requests(&self) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.ends_with("/oauth2/token"))
            .collect()
    }

    /// Requests sent to the catalog (everything but the token endpoint).
    pub fn catalog_requests(&self) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| !r.url.ends_with("/oauth2/token"))
            .collect()
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().unwrap().push(request.clone());
        (self.handler)(request)
    }
}

/// Sleeper that records requested delays.
#[derive(Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn slept(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

pub fn api() -> ApiConfig {
    ApiConfig {
        base_url: BASE_URL.to_string(),
        client_id: "test-client".to_string(),
        client_secret: "test-secret".to_string(),
        ..ApiConfig::default()
    }
}

/// Client config without jitter so delays are exact.
pub fn client_config() -> ClientConfig {
    ClientConfig {
        jitter: false,
        ..ClientConfig::default()
    }
}

pub fn token(access: &str, expires_in_secs: i64, refresh: Option<&str>) -> OAuthToken {
    OAuthToken {
        access_token: access.to_string(),
        refresh_token: refresh.map(str::to_string),
        token_type: "Bearer".to_string(),
        scope: String::new(),
        expires_at: Utc::now() + ChronoDuration::seconds(expires_in_secs),
        locale: Locale::default(),
    }
}

pub fn token_body(access: &str, refresh: Option<&str>, expires_in: i64) -> String {
    let mut body = serde_json::json!({
        "access_token": access,
        "token_type": "Bearer",
        "expires_in": expires_in,
        "scope": "",
    });
    if let Some(refresh) = refresh {
        body["refresh_token"] = serde_json::Value::from(refresh);
    }
    body.to_string()
}

/// One search hit with a single cut-tape variation.
pub fn search_body(mpn: &str, manufacturer: &str, reference: &str) -> String {
    serde_json::json!({
        "ExactMatches": [{
            "ManufacturerProductNumber": mpn,
            "Manufacturer": {"Id": 296, "Name": manufacturer},
            "ProductVariations": [
                {"DigiKeyProductNumber": reference, "PackageType": {"Id": 2, "Name": "Cut Tape (CT)"}}
            ],
            "Category": {"Name": "Linear, Amplifiers", "CategoryId": 687, "ParentId": 32}
        }],
        "Products": []
    })
    .to_string()
}

pub fn details_body(status: &str) -> String {
    serde_json::json!({
        "Product": {
            "ProductStatus": {"Id": 0, "Status": status},
            "EndOfLife": false,
            "Discontinued": false,
            "NormallyStocking": true
        }
    })
    .to_string()
}

pub fn ok(body: impl Into<String>) -> Result<HttpResponse> {
    Ok(HttpResponse::new(200, body))
}

pub fn status(code: u16) -> Result<HttpResponse> {
    Ok(HttpResponse::new(code, ""))
}

pub fn network_error() -> Result<HttpResponse> {
    Err(MpnError::upstream(
        "POST https://api.test",
        UpstreamErrorKind::Network("connection reset".to_string()),
    ))
}

/// Keyword of a search request, if it is one.
pub fn search_keyword(request: &HttpRequest) -> Option<String> {
    match &request.body {
        Some(RequestBody::Json(value)) => value["Keywords"].as_str().map(str::to_string),
        _ => None,
    }
}

/// Form field of a token request.
pub fn form_field(request: &HttpRequest, name: &str) -> Option<String> {
    match &request.body {
        Some(RequestBody::Form(fields)) => fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone()),
        _ => None,
    }
}

pub struct Harness {
    pub transport: Arc<MockTransport>,
    pub sleeper: Arc<RecordingSleeper>,
    pub store: Arc<MemoryTokenStore>,
    pub tokens: Arc<TokenManager>,
    pub client: Arc<CatalogClient>,
}

/// Client stack over `transport`, holding a valid token for `locale`.
pub fn harness(transport: MockTransport, locale: Locale) -> Harness {
    harness_with_store(
        transport,
        locale,
        MemoryTokenStore::with_token(token("valid-token", 3600, Some("refresh-1"))),
    )
}

pub fn harness_with_store(transport: MockTransport, locale: Locale, store: MemoryTokenStore) -> Harness {
    let transport = Arc::new(transport);
    let sleeper = Arc::new(RecordingSleeper::default());
    let store = Arc::new(store);
    let tokens = Arc::new(TokenManager::new(
        api(),
        locale.clone(),
        Duration::from_secs(5),
        Arc::clone(&transport) as Arc<dyn Transport>,
        Arc::clone(&store) as Arc<dyn TokenStore>,
    ));
    let client = Arc::new(
        CatalogClient::new(
            api(),
            &client_config(),
            locale,
            Arc::clone(&transport) as Arc<dyn Transport>,
            Arc::clone(&tokens),
        )
        .with_sleeper(Arc::clone(&sleeper) as Arc<dyn Sleeper>),
    );
    Harness {
        transport,
        sleeper,
        store,
        tokens,
        client,
    }
}
