//! Credential types returned by the authentication endpoints.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::auth::User;

/// Which of the two session tokens to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Short-lived bearer credential sent with authenticated calls.
    Access,
    /// Longer-lived credential used only to obtain a new access token.
    Refresh,
}

impl TokenKind {
    /// Returns the storage key this token is persisted under.
    #[must_use]
    pub const fn storage_key(&self) -> &'static str {
        match self {
            Self::Access => "access_token",
            Self::Refresh => "refresh_token",
        }
    }
}

/// An access token and its refresh token.
///
/// Both values are opaque; the SDK never inspects them. The `Debug`
/// implementation masks them so they do not end up in logs.
///
/// # Example
///
/// ```rust
/// use a1french_api::TokenPair;
///
/// let pair = TokenPair::new("T1", "R1");
/// assert_eq!(pair.access_token, "T1");
/// assert!(!format!("{pair:?}").contains("T1"));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// The access token.
    pub access_token: String,
    /// The refresh token.
    pub refresh_token: String,
}

impl TokenPair {
    /// Creates a pair from its two tokens.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenPair { access_token: *****, refresh_token: ***** }")
    }
}

/// Body returned by signup, login and refresh endpoints.
///
/// Every field is optional because the endpoints differ: logins return a
/// token pair, signup may return only a confirmation `message` and the new
/// user `id`, and some deployments embed the `user`.
#[derive(Clone, Default, Deserialize)]
pub struct AuthResponse {
    /// New access token, if issued.
    #[serde(default)]
    pub access_token: Option<String>,
    /// New refresh token, if issued.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token type, normally `Bearer`.
    #[serde(default)]
    pub token_type: Option<String>,
    /// The authenticated user, when the server includes it.
    #[serde(default)]
    pub user: Option<User>,
    /// Server-side id of a newly created user.
    #[serde(default)]
    pub id: Option<crate::auth::UserId>,
    /// Human readable status message.
    #[serde(default)]
    pub message: Option<String>,
}

impl AuthResponse {
    /// Returns the token pair when both tokens were issued.
    #[must_use]
    pub fn token_pair(&self) -> Option<TokenPair> {
        match (&self.access_token, &self.refresh_token) {
            (Some(access), Some(refresh)) => Some(TokenPair::new(access, refresh)),
            _ => None,
        }
    }
}

impl fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthResponse")
            .field("access_token", &self.access_token.as_ref().map(|_| "*****"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "*****"))
            .field("token_type", &self.token_type)
            .field("user", &self.user)
            .field("id", &self.id)
            .field("message", &self.message)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_pair_debug_masks_values() {
        let pair = TokenPair::new("secret-access", "secret-refresh");
        let debug = format!("{pair:?}");
        assert!(!debug.contains("secret-access"));
        assert!(!debug.contains("secret-refresh"));
        assert!(debug.contains("*****"));
    }

    #[test]
    fn test_token_pair_deserializes_from_refresh_response() {
        let pair: TokenPair = serde_json::from_str(
            r#"{"access_token":"T2","refresh_token":"R2","token_type":"Bearer"}"#,
        )
        .unwrap();
        assert_eq!(pair, TokenPair::new("T2", "R2"));
    }

    #[test]
    fn test_auth_response_login_shape() {
        let response: AuthResponse = serde_json::from_str(
            r#"{"user":{"id":1,"name":"Amélie","email":"a@b.com"},"access_token":"T1","refresh_token":"R1"}"#,
        )
        .unwrap();

        assert_eq!(response.token_pair(), Some(TokenPair::new("T1", "R1")));
        assert_eq!(response.user.unwrap().id.as_str(), "1");
    }

    #[test]
    fn test_auth_response_signup_shape_has_no_tokens() {
        let response: AuthResponse = serde_json::from_str(
            r#"{"message":"User created successfully","id":"6f1c0d3e-0000-4000-8000-000000000000"}"#,
        )
        .unwrap();

        assert!(response.token_pair().is_none());
        assert_eq!(response.message.as_deref(), Some("User created successfully"));
        assert!(response.id.is_some());
    }

    #[test]
    fn test_auth_response_debug_masks_tokens() {
        let response = AuthResponse {
            access_token: Some("T1".to_string()),
            refresh_token: Some("R1".to_string()),
            ..AuthResponse::default()
        };
        let debug = format!("{response:?}");
        assert!(!debug.contains("T1"));
        assert!(!debug.contains("R1"));
    }

    #[test]
    fn test_storage_keys() {
        assert_eq!(TokenKind::Access.storage_key(), "access_token");
        assert_eq!(TokenKind::Refresh.storage_key(), "refresh_token");
    }
}
