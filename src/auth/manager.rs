//! Token lifecycle management.
//!
//! [`TokenManager`] owns the single active token. Catalog calls ask it for a
//! bearer value before every attempt; it decides whether the stored token
//! can be used as is, must be refreshed, or must be replaced by a fresh
//! client-credentials grant.
//!
//! Concurrent callers that find the token stale each run their own grant.
//! The store write is atomic and last writer wins; any token a grant
//! returns serves later calls.

use super::store::TokenStore;
use super::token::{OAuthToken, TokenResponse, TokenState};
use crate::catalog::transport::{HttpRequest, Method, RequestBody, Transport};
use crate::config::{ApiConfig, TOKEN_REFRESH_MARGIN};
use crate::error::{MpnError, Result};
use crate::model::Locale;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// OAuth grant kinds sent to the token endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grant {
    ClientCredentials,
    RefreshToken,
    AuthorizationCode,
}

impl Grant {
    const fn as_str(self) -> &'static str {
        match self {
            Self::ClientCredentials => "client_credentials",
            Self::RefreshToken => "refresh_token",
            Self::AuthorizationCode => "authorization_code",
        }
    }
}

/// Acquires and refreshes the active bearer token.
pub struct TokenManager {
    api: ApiConfig,
    locale: Locale,
    timeout: Duration,
    transport: Arc<dyn Transport>,
    store: Arc<dyn TokenStore>,
}

impl TokenManager {
    pub fn new(
        api: ApiConfig,
        locale: Locale,
        timeout: Duration,
        transport: Arc<dyn Transport>,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            api,
            locale,
            timeout,
            transport,
            store,
        }
    }

    /// Client id sent with every catalog call.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.api.client_id
    }

    /// Current lifecycle state of the stored token.
    #[must_use]
    pub fn state(&self) -> TokenState {
        TokenState::of(self.current().as_ref(), Utc::now(), TOKEN_REFRESH_MARGIN)
    }

    /// Return a usable access token, obtaining a new one if needed.
    ///
    /// Fails with [`MpnError::Authentication`] when neither a refresh nor a
    /// client-credentials grant succeeds.
    pub fn ensure_access_token(&self) -> Result<OAuthToken> {
        match self.current() {
            Some(token) if token.state_at(Utc::now(), TOKEN_REFRESH_MARGIN) == TokenState::Valid => {
                Ok(token)
            }
            None => {
                tracing::debug!("No stored token, requesting client credentials grant");
                self.grant(Grant::ClientCredentials, &[], None)
            }
            Some(stale) => self.refresh_or_replace(&stale),
        }
    }

    /// Replace a token the catalog rejected.
    ///
    /// If the stored token already differs from `rejected`, another caller
    /// refreshed it and the stored one is returned.
    pub fn force_refresh(&self, rejected: &OAuthToken) -> Result<OAuthToken> {
        match self.current() {
            Some(current) if current.access_token != rejected.access_token => {
                if current.state_at(Utc::now(), TOKEN_REFRESH_MARGIN) == TokenState::Valid {
                    return Ok(current);
                }
                self.refresh_or_replace(&current)
            }
            _ => self.refresh_or_replace(rejected),
        }
    }

    /// Whether a usable token can be obtained right now.
    pub fn ensure_authorized(&self) -> bool {
        match self.ensure_access_token() {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Authorization check failed: {e}");
                false
            }
        }
    }

    /// Browser URL that starts the authorization-code flow.
    pub fn authorize_url(&self) -> Result<String> {
        let endpoint = self.api.endpoint(&self.api.authorize_path);
        let url = url::Url::parse_with_params(
            &endpoint,
            &[
                ("response_type", "code"),
                ("client_id", self.api.client_id.as_str()),
                ("redirect_uri", self.api.redirect_uri.as_str()),
            ],
        )
        .map_err(|e| MpnError::config(format!("invalid authorize URL '{endpoint}': {e}")))?;
        Ok(url.into())
    }

    /// Exchange an authorization code for the active token.
    pub fn exchange_code(&self, code: &str) -> Result<OAuthToken> {
        let code = code.trim();
        if code.is_empty() {
            return Err(MpnError::validation("authorization code is empty"));
        }
        self.grant(
            Grant::AuthorizationCode,
            &[("code", code), ("redirect_uri", self.api.redirect_uri.as_str())],
            None,
        )
    }

    fn current(&self) -> Option<OAuthToken> {
        match self.store.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Ignoring unreadable stored token: {e}");
                None
            }
        }
    }

    /// Refresh grant first, client-credentials grant as fallback.
    fn refresh_or_replace(&self, stale: &OAuthToken) -> Result<OAuthToken> {
        let refresh_error = match stale.refresh_token.as_deref() {
            Some(refresh) => {
                match self.grant(Grant::RefreshToken, &[("refresh_token", refresh)], Some(refresh)) {
                    Ok(token) => return Ok(token),
                    Err(e) => {
                        tracing::warn!("Token refresh failed, falling back to client credentials: {e}");
                        Some(e)
                    }
                }
            }
            None => None,
        };

        self.grant(Grant::ClientCredentials, &[], None).map_err(|fallback| {
            let message = match refresh_error {
                Some(refresh) => format!("{}; {}", auth_message(refresh), auth_message(fallback)),
                None => auth_message(fallback),
            };
            MpnError::authentication(message)
        })
    }

    /// Run one grant and store the result as the active token.
    fn grant(
        &self,
        grant: Grant,
        extra: &[(&str, &str)],
        previous_refresh: Option<&str>,
    ) -> Result<OAuthToken> {
        if self.api.client_id.is_empty() {
            return Err(MpnError::authentication("no client id configured"));
        }
        if grant == Grant::ClientCredentials && self.api.client_secret.is_empty() {
            return Err(MpnError::authentication("no client secret configured"));
        }

        let mut form = vec![
            ("grant_type".to_string(), grant.as_str().to_string()),
            ("client_id".to_string(), self.api.client_id.clone()),
            ("client_secret".to_string(), self.api.client_secret.clone()),
        ];
        form.extend(extra.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())));

        let request = HttpRequest::new(Method::Post, self.api.token_url(), self.timeout)
            .body(RequestBody::Form(form));
        let response = self
            .transport
            .execute(&request)
            .map_err(|e| MpnError::authentication(format!("{} grant: {e}", grant.as_str())))?;

        if !response.is_success() {
            return Err(MpnError::authentication(format!(
                "{} grant returned HTTP {}",
                grant.as_str(),
                response.status
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&response.body).map_err(|e| {
            MpnError::authentication(format!("{} grant: malformed token response: {e}", grant.as_str()))
        })?;
        if parsed.expires_in <= 0 {
            return Err(MpnError::authentication(format!(
                "{} grant: token response has no usable expires_in ({})",
                grant.as_str(),
                parsed.expires_in
            )));
        }
        let token = OAuthToken::from_response(parsed, &self.locale, previous_refresh, Utc::now());

        if let Err(e) = self.store.save(&token) {
            tracing::warn!("Failed to persist access token: {e}");
        }
        tracing::info!(
            grant = grant.as_str(),
            expires_at = %token.expires_at,
            "Obtained catalog access token"
        );
        Ok(token)
    }
}

fn auth_message(err: MpnError) -> String {
    match err {
        MpnError::Authentication(message) => message,
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;

    struct NoNetwork;

    impl Transport for NoNetwork {
        fn execute(&self, _request: &HttpRequest) -> Result<crate::catalog::transport::HttpResponse> {
            panic!("unexpected network call");
        }
    }

    fn manager(api: ApiConfig) -> TokenManager {
        TokenManager::new(
            api,
            Locale::default(),
            Duration::from_secs(5),
            Arc::new(NoNetwork),
            Arc::new(MemoryTokenStore::new()),
        )
    }

    #[test]
    fn test_authorize_url() {
        let api = ApiConfig {
            client_id: "my id".to_string(),
            redirect_uri: "https://localhost:8139/callback".to_string(),
            ..ApiConfig::default()
        };
        let url = manager(api).authorize_url().unwrap();
        assert!(url.starts_with("https://api.digikey.com/v1/oauth2/authorize?"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=my+id"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Flocalhost%3A8139%2Fcallback"));
    }

    #[test]
    fn test_missing_credentials_fail_without_network() {
        let mgr = manager(ApiConfig::default());
        let err = mgr.ensure_access_token().unwrap_err();
        assert!(err.is_batch_fatal());
        assert!(!mgr.ensure_authorized());
        assert_eq!(mgr.state(), TokenState::NoToken);
    }

    #[test]
    fn test_empty_code_rejected() {
        let mgr = manager(ApiConfig::default());
        assert!(matches!(mgr.exchange_code("  "), Err(MpnError::Validation(_))));
    }
}
