//! OAuth token records and lifecycle states.

use crate::model::Locale;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The single active bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
    pub expires_at: DateTime<Utc>,
    /// Locale of the manager that obtained the token
    pub locale: Locale,
}

impl OAuthToken {
    /// Build the active token from a grant response.
    ///
    /// `previous_refresh` is kept when the grant does not issue a new
    /// refresh token.
    #[must_use]
    pub fn from_response(
        response: TokenResponse,
        locale: &Locale,
        previous_refresh: Option<&str>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response
                .refresh_token
                .filter(|t| !t.is_empty())
                .or_else(|| previous_refresh.map(str::to_string)),
            token_type: response.token_type.unwrap_or_else(|| "Bearer".to_string()),
            scope: response.scope,
            expires_at: now + ChronoDuration::seconds(response.expires_in.max(0)),
            locale: locale.clone(),
        }
    }

    /// Lifecycle state at `now`.
    #[must_use]
    pub fn state_at(&self, now: DateTime<Utc>, margin: Duration) -> TokenState {
        let margin = ChronoDuration::from_std(margin).unwrap_or_else(|_| ChronoDuration::zero());
        if now >= self.expires_at {
            TokenState::Expired
        } else if now >= self.expires_at - margin {
            TokenState::ExpiringSoon
        } else {
            TokenState::Valid
        }
    }

    /// `Authorization` header value.
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

/// Token endpoint response body.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds. Required: a token without one cannot be reused.
    pub expires_in: i64,
    #[serde(default)]
    pub scope: String,
}

/// Where the active token sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    NoToken,
    Valid,
    /// Inside the refresh margin before expiry
    ExpiringSoon,
    Expired,
}

impl TokenState {
    #[must_use]
    pub fn of(token: Option<&OAuthToken>, now: DateTime<Utc>, margin: Duration) -> Self {
        token.map_or(Self::NoToken, |t| t.state_at(now, margin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARGIN: Duration = Duration::from_secs(60);

    fn response(refresh: Option<&str>) -> TokenResponse {
        TokenResponse {
            access_token: "abc".to_string(),
            refresh_token: refresh.map(str::to_string),
            token_type: Some("Bearer".to_string()),
            expires_in: 600,
            scope: String::new(),
        }
    }

    #[test]
    fn test_states() {
        let now = Utc::now();
        let token = OAuthToken::from_response(response(None), &Locale::default(), None, now);

        assert_eq!(token.state_at(now, MARGIN), TokenState::Valid);
        assert_eq!(
            token.state_at(now + ChronoDuration::seconds(560), MARGIN),
            TokenState::ExpiringSoon
        );
        assert_eq!(
            token.state_at(now + ChronoDuration::seconds(600), MARGIN),
            TokenState::Expired
        );
        assert_eq!(TokenState::of(None, now, MARGIN), TokenState::NoToken);
    }

    #[test]
    fn test_refresh_token_carried_forward() {
        let now = Utc::now();
        let token = OAuthToken::from_response(response(None), &Locale::default(), Some("old"), now);
        assert_eq!(token.refresh_token.as_deref(), Some("old"));

        let token =
            OAuthToken::from_response(response(Some("new")), &Locale::default(), Some("old"), now);
        assert_eq!(token.refresh_token.as_deref(), Some("new"));
    }

    #[test]
    fn test_locale_stamped_from_caller() {
        let locale = Locale::new("DE", "de", "EUR");
        let token = OAuthToken::from_response(response(None), &locale, None, Utc::now());
        assert_eq!(token.locale, locale);
        assert_eq!(token.authorization(), "Bearer abc");
    }

    #[test]
    fn test_token_response_minimal() {
        let parsed: TokenResponse =
            serde_json::from_str(r#"{"access_token":"x","expires_in":1799}"#).unwrap();
        assert_eq!(parsed.expires_in, 1799);
        assert!(parsed.refresh_token.is_none());
    }

    #[test]
    fn test_token_response_without_lifetime_rejected() {
        assert!(serde_json::from_str::<TokenResponse>(r#"{"access_token":"x"}"#).is_err());
    }
}
