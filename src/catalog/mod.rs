//! Catalog API access.
//!
//! - [`transport`]: the HTTP seam and its `reqwest` implementation
//! - [`backoff`]: retry delay schedule
//! - [`CatalogClient`]: token injection, 401 refresh, rate-limit retries
//! - [`response`]: request and response schemas

pub mod backoff;
mod client;
pub mod response;
pub mod transport;

pub use backoff::{BackoffPolicy, Sleeper, ThreadSleeper};
pub use client::{
    CatalogClient, CLIENT_ID_HEADER, LOCALE_CURRENCY_HEADER, LOCALE_LANGUAGE_HEADER,
    LOCALE_SITE_HEADER,
};
pub use response::{KeywordSearchRequest, KeywordSearchResponse, ProductDetailsResponse};
#[cfg(feature = "http")]
pub use transport::ReqwestTransport;
pub use transport::{HttpRequest, HttpResponse, Method, RequestBody, Transport};
