//! HTTP transport seam.
//!
//! The client and token manager speak to the network only through
//! [`Transport`], so retry and token logic can be exercised against a
//! scripted transport in tests.

use crate::error::{MpnError, Result, UpstreamErrorKind};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
        }
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(serde_json::Value),
    Form(Vec<(String, String)>),
}

/// A fully prepared outbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub timeout: Duration,
}

impl HttpRequest {
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
            timeout,
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of a request header (case-insensitive).
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A received response. Header names are stored lower-cased.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Delay requested through `Retry-After`, in delta-seconds or HTTP-date form.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        let value = self.header("retry-after")?.trim();
        if let Ok(secs) = value.parse::<u64>() {
            return Some(Duration::from_secs(secs));
        }
        let at = chrono::DateTime::parse_from_rfc2822(value).ok()?;
        let wait = at.with_timezone(&chrono::Utc) - chrono::Utc::now();
        Some(wait.to_std().unwrap_or(Duration::ZERO))
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| {
            MpnError::upstream(
                "parsing response",
                UpstreamErrorKind::InvalidResponse(e.to_string()),
            )
        })
    }
}

/// Executes one HTTP exchange. Implementations must not retry.
///
/// A received response is `Ok` whatever its status; `Err` is reserved for
/// exchanges that produced no response (connect failure, timeout).
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

#[cfg(feature = "http")]
pub use reqwest_transport::ReqwestTransport;

#[cfg(feature = "http")]
mod reqwest_transport {
    use super::{HttpRequest, HttpResponse, Method, RequestBody, Transport};
    use crate::error::{MpnError, Result, UpstreamErrorKind};
    use reqwest::blocking::Client;

    /// Blocking `reqwest` transport.
    pub struct ReqwestTransport {
        client: Client,
    }

    fn network_error(msg: &str, err: &reqwest::Error) -> MpnError {
        MpnError::upstream(msg, UpstreamErrorKind::Network(err.to_string()))
    }

    impl ReqwestTransport {
        pub fn new() -> Result<Self> {
            let client = Client::builder()
                .user_agent(concat!(
                    env!("CARGO_PKG_NAME"),
                    "/",
                    env!("CARGO_PKG_VERSION")
                ))
                .build()
                .map_err(|e| network_error("Failed to create HTTP client", &e))?;
            Ok(Self { client })
        }
    }

    impl Transport for ReqwestTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
            let mut builder = match request.method {
                Method::Get => self.client.get(&request.url),
                Method::Post => self.client.post(&request.url),
            }
            .timeout(request.timeout);

            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }
            builder = match &request.body {
                Some(RequestBody::Json(value)) => builder.json(value),
                Some(RequestBody::Form(fields)) => builder.form(fields),
                None => builder,
            };

            let response = builder.send().map_err(|e| {
                let context = format!("{} {}", request.method, request.url);
                if e.is_timeout() {
                    MpnError::upstream(context, UpstreamErrorKind::Timeout(request.timeout))
                } else {
                    network_error(&context, &e)
                }
            })?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    Some((name.as_str().to_ascii_lowercase(), value.to_str().ok()?.to_string()))
                })
                .collect();
            let body = response
                .text()
                .map_err(|e| network_error("Failed to read response body", &e))?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_after_seconds() {
        let resp = HttpResponse::new(429, "").with_header("Retry-After", "2");
        assert_eq!(resp.retry_after(), Some(Duration::from_secs(2)));
        assert_eq!(HttpResponse::new(429, "").retry_after(), None);
    }

    #[test]
    fn test_retry_after_past_date_is_zero() {
        let resp = HttpResponse::new(503, "")
            .with_header("retry-after", "Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(resp.retry_after(), Some(Duration::ZERO));
    }

    #[test]
    fn test_retry_after_garbage_ignored() {
        let resp = HttpResponse::new(503, "").with_header("Retry-After", "soon");
        assert_eq!(resp.retry_after(), None);
    }

    #[test]
    fn test_json_decode_error_is_upstream() {
        let resp = HttpResponse::new(200, "not json");
        let err = resp.json::<serde_json::Value>().unwrap_err();
        assert!(matches!(
            err.upstream_kind(),
            Some(UpstreamErrorKind::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_request_header_lookup() {
        let req = HttpRequest::new(Method::Get, "https://x", Duration::from_secs(1))
            .header("X-DIGIKEY-Client-Id", "abc");
        assert_eq!(req.header_value("x-digikey-client-id"), Some("abc"));
    }
}
