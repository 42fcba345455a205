//! Resilient catalog API client.

use super::backoff::{BackoffPolicy, Sleeper, ThreadSleeper};
use super::response::{KeywordSearchRequest, KeywordSearchResponse, ProductDetailsResponse};
use super::transport::{HttpRequest, HttpResponse, Method, RequestBody, Transport};
use crate::auth::TokenManager;
use crate::config::{ApiConfig, ClientConfig, SEARCH_PATH};
use crate::error::{is_retryable_status, ErrorContext, MpnError, Result, UpstreamErrorKind};
use crate::model::Locale;
use std::sync::Arc;
use std::time::Duration;

/// Header carrying the OAuth client id.
pub const CLIENT_ID_HEADER: &str = "X-DIGIKEY-Client-Id";
/// Locale headers, in (site, language, currency) order.
pub const LOCALE_SITE_HEADER: &str = "X-DIGIKEY-Locale-Site";
pub const LOCALE_LANGUAGE_HEADER: &str = "X-DIGIKEY-Locale-Language";
pub const LOCALE_CURRENCY_HEADER: &str = "X-DIGIKEY-Locale-Currency";

/// Longest upstream body kept in error diagnostics.
const MAX_ERROR_BODY: usize = 512;

/// Catalog client bound to one locale.
///
/// Every attempt carries a fresh bearer token and the locale headers.
/// Rate-limit and gateway statuses are retried with backoff, a rejected
/// token is refreshed once, everything else fails fast.
pub struct CatalogClient {
    api: ApiConfig,
    locale: Locale,
    timeout: Duration,
    policy: BackoffPolicy,
    transport: Arc<dyn Transport>,
    tokens: Arc<TokenManager>,
    sleeper: Arc<dyn Sleeper>,
}

impl CatalogClient {
    pub fn new(
        api: ApiConfig,
        client: &ClientConfig,
        locale: Locale,
        transport: Arc<dyn Transport>,
        tokens: Arc<TokenManager>,
    ) -> Self {
        Self {
            api,
            locale,
            timeout: client.timeout(),
            policy: BackoffPolicy::from_config(client),
            transport,
            tokens,
            sleeper: Arc::new(ThreadSleeper),
        }
    }

    /// Replace the sleeper used between retries.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    #[must_use]
    pub const fn locale(&self) -> &Locale {
        &self.locale
    }

    /// Search the catalog by keyword.
    pub fn keyword_search(&self, request: &KeywordSearchRequest) -> Result<KeywordSearchResponse> {
        let body = serde_json::to_value(request).map_err(|e| {
            MpnError::upstream("encoding search", UpstreamErrorKind::InvalidResponse(e.to_string()))
        })?;
        let url = self.api.endpoint(SEARCH_PATH);
        self.request(Method::Post, &url, Some(body))?
            .json::<KeywordSearchResponse>()
            .context("keyword search")
    }

    /// Fetch product details for a reference part number.
    pub fn product_details(&self, reference_part: &str) -> Result<ProductDetailsResponse> {
        let mut url = url::Url::parse(&self.api.endpoint("/products/v4/search")).map_err(|e| {
            MpnError::config(format!("invalid API base URL '{}': {e}", self.api.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|()| MpnError::config("API base URL cannot have a path"))?
            .push(reference_part)
            .push("productdetails");

        self.request(Method::Get, url.as_str(), None)?
            .json::<ProductDetailsResponse>()
            .with_context(|| format!("product details for {reference_part}"))
    }

    /// Send one logical request with token injection and retries.
    pub fn request(
        &self,
        method: Method,
        url: &str,
        body: Option<serde_json::Value>,
    ) -> Result<HttpResponse> {
        let context = format!("{method} {url}");
        let mut failures: u32 = 0;
        let mut waited = Duration::ZERO;
        let mut refreshed = false;
        let mut token = self.tokens.ensure_access_token()?;

        loop {
            let request = self.build(method, url, body.as_ref(), &token.authorization());
            let outcome = self.transport.execute(&request);

            let (last, retry_after) = match outcome {
                Ok(response) if response.is_success() => return Ok(response),
                Ok(response) if response.status == 401 => {
                    if refreshed {
                        return Err(MpnError::authentication(format!(
                            "{context}: access token rejected after refresh"
                        )));
                    }
                    tracing::debug!("{context}: 401, refreshing token");
                    refreshed = true;
                    token = self.tokens.force_refresh(&token)?;
                    continue;
                }
                Ok(response) if is_retryable_status(response.status) => {
                    let retry_after = response.retry_after();
                    (status_error(&response), retry_after)
                }
                Ok(response) => {
                    return Err(MpnError::upstream(context, status_error(&response)));
                }
                Err(err) => {
                    let transient = err.upstream_kind().filter(|k| k.is_transient()).cloned();
                    match transient {
                        Some(kind) => (kind, None),
                        None => return Err(err),
                    }
                }
            };

            failures += 1;
            if failures >= self.policy.max_attempts {
                return Err(exhausted(context, failures, &last));
            }

            let delay = self.policy.delay(failures, retry_after);
            if waited + delay > self.policy.max_elapsed {
                tracing::debug!("{context}: next delay {delay:?} exceeds retry time budget");
                return Err(exhausted(context, failures, &last));
            }
            tracing::debug!(
                "{context}: attempt {failures} failed ({last}), retrying in {delay:?}"
            );
            self.sleeper.sleep(delay);
            waited += delay;

            token = self.tokens.ensure_access_token()?;
        }
    }

    fn build(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
        authorization: &str,
    ) -> HttpRequest {
        let mut request = HttpRequest::new(method, url, self.timeout)
            .header("Authorization", authorization)
            .header(CLIENT_ID_HEADER, self.tokens.client_id())
            .header(LOCALE_SITE_HEADER, self.locale.site.as_str())
            .header(LOCALE_LANGUAGE_HEADER, self.locale.language.as_str())
            .header(LOCALE_CURRENCY_HEADER, self.locale.currency.as_str())
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request.body(RequestBody::Json(body.clone()));
        }
        request
    }
}

fn status_error(response: &HttpResponse) -> UpstreamErrorKind {
    let mut body = response.body.trim().to_string();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    UpstreamErrorKind::Status {
        status: response.status,
        body,
    }
}

fn exhausted(context: String, attempts: u32, last: &UpstreamErrorKind) -> MpnError {
    MpnError::upstream(
        context,
        UpstreamErrorKind::RetriesExhausted {
            attempts,
            last: last.to_string(),
        },
    )
}
