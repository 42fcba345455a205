//! Unified error types for mpn-validator.
//!
//! Errors are split along the lines that matter to a batch caller:
//! authentication failures abort the whole batch, upstream failures degrade
//! to a per-MPN negative result, and everything else is local (cache, IO,
//! configuration).

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for mpn-validator operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MpnError {
    /// No usable access token could be obtained.
    #[error("Catalog service unavailable, check credentials: {0}")]
    Authentication(String),

    /// Errors talking to the catalog API
    #[error("Upstream request failed: {context}")]
    Upstream {
        context: String,
        #[source]
        source: UpstreamErrorKind,
    },

    /// Errors in either cache tier or the token store
    #[error("Cache operation failed: {context}")]
    Cache {
        context: String,
        #[source]
        source: CacheErrorKind,
    },

    /// IO errors with context
    #[error("IO error at {path:?}: {message}")]
    Io {
        path: Option<PathBuf>,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Specific upstream error kinds
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum UpstreamErrorKind {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Gave up after {attempts} attempts, last error: {last}")]
    RetriesExhausted { attempts: u32, last: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl UpstreamErrorKind {
    /// Whether another attempt may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Statuses that are retried with backoff.
#[must_use]
pub const fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 502 | 503 | 504)
}

/// Specific cache error kinds
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CacheErrorKind {
    #[error("Entry lock failed: {0}")]
    Lock(String),

    #[error("Store write failed: {0}")]
    Write(String),

    #[error("Corrupt entry: {0}")]
    Corrupt(String),

    #[error("Lock poisoned")]
    Poisoned,
}

// ============================================================================
// Result type alias
// ============================================================================

/// Convenient Result type for mpn-validator operations
pub type Result<T> = std::result::Result<T, MpnError>;

// ============================================================================
// Error construction helpers
// ============================================================================

impl MpnError {
    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication(message.into())
    }

    /// Create an upstream error with context
    pub fn upstream(context: impl Into<String>, source: UpstreamErrorKind) -> Self {
        Self::Upstream {
            context: context.into(),
            source,
        }
    }

    /// Create a cache error with context
    pub fn cache(context: impl Into<String>, source: CacheErrorKind) -> Self {
        Self::Cache {
            context: context.into(),
            source,
        }
    }

    /// Create an IO error with path context
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let message = format!("{source}");
        Self::Io {
            path: Some(path.into()),
            message,
            source,
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this error must abort a whole batch.
    #[must_use]
    pub const fn is_batch_fatal(&self) -> bool {
        matches!(self, Self::Authentication(_))
    }

    /// Display text followed by every chained source.
    #[must_use]
    pub fn detail(&self) -> String {
        let mut message = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            message.push_str(": ");
            message.push_str(&err.to_string());
            source = err.source();
        }
        message
    }

    /// The upstream kind, if this is an upstream error.
    #[must_use]
    pub const fn upstream_kind(&self) -> Option<&UpstreamErrorKind> {
        match self {
            Self::Upstream { source, .. } => Some(source),
            _ => None,
        }
    }
}

// ============================================================================
// Conversions from existing error types
// ============================================================================

impl From<std::io::Error> for MpnError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            path: None,
            message: format!("{err}"),
            source: err,
        }
    }
}

impl From<serde_json::Error> for MpnError {
    fn from(err: serde_json::Error) -> Self {
        Self::cache("JSON (de)serialization", CacheErrorKind::Corrupt(err.to_string()))
    }
}

// ============================================================================
// Error context extension trait
// ============================================================================

/// Extension trait for adding context to errors.
///
/// Context strings chain outward-in, so an error raised while fetching
/// product details for a part reads
/// `"lifecycle lookup: GET /productdetails: ..."`.
pub trait ErrorContext<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context from a closure (lazy evaluation).
    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>;
}

impl<T, E: Into<MpnError>> ErrorContext<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        let ctx: String = context.into();
        self.map_err(|e| add_context_to_error(e.into(), &ctx))
    }

    fn with_context<F, C>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Into<String>,
    {
        self.map_err(|e| {
            let ctx: String = f().into();
            add_context_to_error(e.into(), &ctx)
        })
    }
}

/// Add context to an error, chaining with any existing context.
fn add_context_to_error(err: MpnError, new_ctx: &str) -> MpnError {
    match err {
        MpnError::Authentication(msg) => {
            MpnError::Authentication(chain_context(new_ctx, &msg))
        }
        MpnError::Upstream {
            context: existing,
            source,
        } => MpnError::Upstream {
            context: chain_context(new_ctx, &existing),
            source,
        },
        MpnError::Cache {
            context: existing,
            source,
        } => MpnError::Cache {
            context: chain_context(new_ctx, &existing),
            source,
        },
        MpnError::Io {
            path,
            message,
            source,
        } => MpnError::Io {
            path,
            message: chain_context(new_ctx, &message),
            source,
        },
        MpnError::Config(msg) => MpnError::Config(chain_context(new_ctx, &msg)),
        MpnError::Validation(msg) => MpnError::Validation(chain_context(new_ctx, &msg)),
    }
}

/// Chain two context strings together.
///
/// If the existing context is empty, returns just the new context.
/// Otherwise, returns "`new_context`: `existing_context`".
fn chain_context(new: &str, existing: &str) -> String {
    if existing.is_empty() {
        new.to_string()
    } else {
        format!("{new}: {existing}")
    }
}

/// Extension trait for Option types to convert to errors with context.
pub trait OptionContext<T> {
    /// Convert None to an error with the given context.
    fn context_none(self, context: impl Into<String>) -> Result<T>;
}

impl<T> OptionContext<T> for Option<T> {
    fn context_none(self, context: impl Into<String>) -> Result<T> {
        self.ok_or_else(|| MpnError::Validation(context.into()))
    }
}
