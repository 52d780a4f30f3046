//! Recovery from expired access tokens.
//!
//! [`ReauthClient`] wraps the base [`HttpClient`]. When an authenticated
//! request comes back `401 Unauthorized`, it exchanges the stored refresh
//! token for a new pair at [`REFRESH_PATH`] and retries the request once.
//! If no refresh token is stored, or the refresh call fails, both tokens are
//! cleared and the call fails with [`ReauthError::SessionExpired`].
//!
//! The recovery steps are modelled by [`ReauthState`], whose transitions are
//! a pure function of [`ReauthEvent`]s.
//!
//! # Concurrent 401s
//!
//! Refreshes are serialized through a gate. A caller that gets through the
//! gate after another caller already rotated the access token (the stored
//! token no longer matches the one its request was sent with) skips its own
//! refresh and goes straight to the retry, so a burst of expired requests
//! produces a single refresh call.

use std::sync::Arc;

use serde_json::json;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::auth::storage::StorageError;
use crate::auth::{TokenPair, TokenStore};
use crate::clients::errors::HttpError;
use crate::clients::http_client::HttpClient;
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;

/// Path of the token refresh endpoint.
pub const REFRESH_PATH: &str = "/api/refresh";

/// Where a single logical call is in the recovery cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReauthState {
    /// No call in flight.
    #[default]
    Idle,
    /// The original request has been sent.
    AwaitingPrimary,
    /// The original request got a `401`; the refresh call is in flight.
    AwaitingRefresh,
    /// Tokens were refreshed; the single retry is in flight.
    AwaitingRetry,
    /// Recovery is impossible; tokens are cleared and the call fails.
    Failed,
}

/// Inputs driving [`ReauthState`] transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReauthEvent {
    /// A call is issued.
    Dispatch,
    /// The original request returned `401`.
    Unauthorized {
        /// Whether a refresh token is stored.
        has_refresh_token: bool,
    },
    /// The refresh call returned a new pair.
    Refreshed,
    /// The refresh call failed.
    RefreshFailed,
    /// A response (or non-401 error) was handed back to the caller.
    Completed,
}

impl ReauthState {
    /// Returns the state after `event`.
    ///
    /// Events that do not apply to the current state leave it unchanged.
    /// `Failed` is terminal.
    ///
    /// # Example
    ///
    /// ```rust
    /// use a1french_api::clients::{ReauthEvent, ReauthState};
    ///
    /// let state = ReauthState::Idle
    ///     .next(ReauthEvent::Dispatch)
    ///     .next(ReauthEvent::Unauthorized { has_refresh_token: true })
    ///     .next(ReauthEvent::Refreshed);
    /// assert_eq!(state, ReauthState::AwaitingRetry);
    /// ```
    #[must_use]
    pub const fn next(self, event: ReauthEvent) -> Self {
        match (self, event) {
            (Self::Idle, ReauthEvent::Dispatch) => Self::AwaitingPrimary,
            (Self::AwaitingPrimary | Self::AwaitingRetry, ReauthEvent::Completed) => Self::Idle,
            (
                Self::AwaitingPrimary,
                ReauthEvent::Unauthorized {
                    has_refresh_token: true,
                },
            ) => Self::AwaitingRefresh,
            (
                Self::AwaitingPrimary,
                ReauthEvent::Unauthorized {
                    has_refresh_token: false,
                },
            )
            | (Self::AwaitingRefresh, ReauthEvent::RefreshFailed) => Self::Failed,
            (Self::AwaitingRefresh, ReauthEvent::Refreshed) => Self::AwaitingRetry,
            (state, _) => state,
        }
    }
}

/// Why a token refresh could not produce a new pair.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// No refresh token is stored.
    #[error("No refresh token is stored")]
    MissingRefreshToken,

    /// The refresh endpoint answered with an error, or was unreachable.
    #[error("Refresh request failed: {0}")]
    Http(#[from] HttpError),

    /// The refresh response did not contain a token pair.
    #[error("Refresh response did not contain a token pair: {0}")]
    Decode(#[from] serde_json::Error),

    /// The new pair could not be stored.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors returned by [`ReauthClient::request`].
#[derive(Debug, Error)]
pub enum ReauthError {
    /// The request failed for a reason other than an expired token, or the
    /// single retry failed. Returned unchanged.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The access token was rejected and could not be refreshed. The token
    /// store has been cleared.
    #[error("Session expired: {reason}")]
    SessionExpired {
        /// What prevented the refresh.
        #[source]
        reason: RefreshError,
    },
}

/// Executor wrapper that refreshes the token pair on `401` and retries once.
///
/// # Thread Safety
///
/// `ReauthClient` is `Send + Sync`; share it across tasks with `Arc`.
///
/// # Example
///
/// ```rust,ignore
/// use a1french_api::clients::{HttpClient, HttpMethod, HttpRequest, ReauthClient};
///
/// let client = ReauthClient::new(HttpClient::new(&config, tokens)?);
/// let request = HttpRequest::builder(HttpMethod::Get, "/api/user/me")
///     .requires_auth(true)
///     .build()?;
///
/// // An expired access token is refreshed transparently
/// let response = client.request(&request).await?;
/// ```
#[derive(Debug)]
pub struct ReauthClient {
    http: HttpClient,
    refresh_gate: Mutex<()>,
}

// Verify ReauthClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ReauthClient>();
};

impl ReauthClient {
    /// Wraps a base executor.
    #[must_use]
    pub fn new(http: HttpClient) -> Self {
        Self {
            http,
            refresh_gate: Mutex::new(()),
        }
    }

    /// Returns the wrapped executor.
    #[must_use]
    pub const fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Returns the token store shared with the executor.
    #[must_use]
    pub const fn tokens(&self) -> &Arc<TokenStore> {
        self.http.tokens()
    }

    /// Sends a request, recovering from one expired access token.
    ///
    /// Requests that do not require auth are passed straight to the
    /// executor. For authenticated requests:
    ///
    /// - any result other than `401` is returned unchanged
    /// - a `401` triggers one refresh and one retry, whose result is
    ///   returned unchanged (a second `401` is not retried)
    /// - network errors never trigger a refresh
    ///
    /// # Errors
    ///
    /// Returns [`ReauthError::Http`] for failures passed through, and
    /// [`ReauthError::SessionExpired`] when the token could not be
    /// refreshed.
    pub async fn request(&self, request: &HttpRequest) -> Result<HttpResponse, ReauthError> {
        if !request.requires_auth {
            return Ok(self.http.request(request).await?);
        }

        let (state, result) = self.drive(request).await;
        debug_assert!(matches!(state, ReauthState::Idle | ReauthState::Failed));
        result
    }

    /// Runs one authenticated call through the recovery cycle and returns
    /// the state it settled in along with the result.
    async fn drive(
        &self,
        request: &HttpRequest,
    ) -> (ReauthState, Result<HttpResponse, ReauthError>) {
        let mut state = ReauthState::Idle;
        let mut sent_with: Option<String> = None;
        let mut failure: Option<RefreshError> = None;
        let mut outcome: Option<Result<HttpResponse, HttpError>> = None;

        loop {
            match state {
                ReauthState::Idle => {
                    if let Some(result) = outcome.take() {
                        return (state, result.map_err(ReauthError::from));
                    }
                    sent_with = self.tokens().access_token();
                    state = state.next(ReauthEvent::Dispatch);
                }
                ReauthState::AwaitingPrimary => {
                    match self
                        .http
                        .request_with_token(request, sent_with.as_deref())
                        .await
                    {
                        Err(e) if e.is_unauthorized() => {
                            let has_refresh_token = self.tokens().refresh_token().is_some();
                            tracing::debug!(
                                path = %request.path,
                                has_refresh_token,
                                "Access token rejected"
                            );
                            if !has_refresh_token {
                                failure = Some(RefreshError::MissingRefreshToken);
                            }
                            state = state.next(ReauthEvent::Unauthorized { has_refresh_token });
                        }
                        other => {
                            outcome = Some(other);
                            state = state.next(ReauthEvent::Completed);
                        }
                    }
                }
                ReauthState::AwaitingRefresh => {
                    match self.refresh(sent_with.as_deref()).await {
                        Ok(()) => state = state.next(ReauthEvent::Refreshed),
                        Err(e) => {
                            failure = Some(e);
                            state = state.next(ReauthEvent::RefreshFailed);
                        }
                    }
                }
                ReauthState::AwaitingRetry => {
                    let token = self.tokens().access_token();
                    outcome = Some(
                        self.http
                            .request_with_token(request, token.as_deref())
                            .await,
                    );
                    state = state.next(ReauthEvent::Completed);
                }
                ReauthState::Failed => {
                    let reason = failure.take().unwrap_or(RefreshError::MissingRefreshToken);
                    tracing::warn!(
                        path = %request.path,
                        "Session expired, clearing stored tokens: {}",
                        reason
                    );
                    if let Err(e) = self.tokens().clear() {
                        tracing::warn!("Failed to clear stored tokens: {}", e);
                    }
                    return (state, Err(ReauthError::SessionExpired { reason }));
                }
            }
        }
    }

    /// Exchanges the refresh token for a new pair unless another caller
    /// already rotated `stale`.
    async fn refresh(&self, stale: Option<&str>) -> Result<(), RefreshError> {
        let _gate = self.refresh_gate.lock().await;

        let current = self.tokens().access_token();
        if current.is_some() && current.as_deref() != stale {
            tracing::debug!("Access token already refreshed by a concurrent request");
            return Ok(());
        }

        let refresh_token = self
            .tokens()
            .refresh_token()
            .ok_or(RefreshError::MissingRefreshToken)?;

        let request = HttpRequest::builder(HttpMethod::Post, REFRESH_PATH)
            .body(json!({ "refresh_token": refresh_token }))
            .build()
            .map_err(HttpError::from)?;

        let response = self.http.request_with_token(&request, None).await?;
        let pair: TokenPair = response.json()?;
        self.tokens().set(&pair)?;

        tracing::info!("Access token refreshed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ApiBaseUrl, ClientConfig};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, access: &str, refresh: &str) -> ReauthClient {
        let config = ClientConfig::builder()
            .base_url(ApiBaseUrl::new(server.uri()).unwrap())
            .build()
            .unwrap();
        let tokens = Arc::new(TokenStore::in_memory());
        tokens.set(&TokenPair::new(access, refresh)).unwrap();
        ReauthClient::new(HttpClient::new(&config, tokens).unwrap())
    }

    fn cart_request() -> HttpRequest {
        HttpRequest::builder(HttpMethod::Get, "/api/cart")
            .requires_auth(true)
            .build()
            .unwrap()
    }

    #[test]
    fn test_successful_primary_returns_to_idle() {
        let state = ReauthState::Idle
            .next(ReauthEvent::Dispatch)
            .next(ReauthEvent::Completed);
        assert_eq!(state, ReauthState::Idle);
    }

    #[test]
    fn test_unauthorized_with_refresh_token_awaits_refresh() {
        let state = ReauthState::AwaitingPrimary.next(ReauthEvent::Unauthorized {
            has_refresh_token: true,
        });
        assert_eq!(state, ReauthState::AwaitingRefresh);
    }

    #[test]
    fn test_unauthorized_without_refresh_token_fails() {
        let state = ReauthState::AwaitingPrimary.next(ReauthEvent::Unauthorized {
            has_refresh_token: false,
        });
        assert_eq!(state, ReauthState::Failed);
    }

    #[test]
    fn test_refresh_outcomes() {
        assert_eq!(
            ReauthState::AwaitingRefresh.next(ReauthEvent::Refreshed),
            ReauthState::AwaitingRetry
        );
        assert_eq!(
            ReauthState::AwaitingRefresh.next(ReauthEvent::RefreshFailed),
            ReauthState::Failed
        );
    }

    #[test]
    fn test_retry_is_never_followed_by_another_refresh() {
        let state = ReauthState::AwaitingRetry.next(ReauthEvent::Unauthorized {
            has_refresh_token: true,
        });
        assert_eq!(state, ReauthState::AwaitingRetry);
        assert_eq!(
            state.next(ReauthEvent::Completed),
            ReauthState::Idle
        );
    }

    #[test]
    fn test_failed_is_terminal() {
        for event in [
            ReauthEvent::Dispatch,
            ReauthEvent::Refreshed,
            ReauthEvent::RefreshFailed,
            ReauthEvent::Completed,
            ReauthEvent::Unauthorized {
                has_refresh_token: true,
            },
        ] {
            assert_eq!(ReauthState::Failed.next(event), ReauthState::Failed);
        }
    }

    #[test]
    fn test_idle_ignores_everything_but_dispatch() {
        assert_eq!(
            ReauthState::Idle.next(ReauthEvent::Refreshed),
            ReauthState::Idle
        );
        assert_eq!(
            ReauthState::Idle.next(ReauthEvent::Completed),
            ReauthState::Idle
        );
    }

    #[test]
    fn test_session_expired_display() {
        let error = ReauthError::SessionExpired {
            reason: RefreshError::MissingRefreshToken,
        };
        assert_eq!(
            error.to_string(),
            "Session expired: No refresh token is stored"
        );
    }

    #[tokio::test]
    async fn test_answered_call_settles_in_idle() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cart"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Failed to get cart"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, "T1", "R1");
        let (state, result) = client.drive(&cart_request()).await;

        assert_eq!(state, ReauthState::Idle);
        assert!(matches!(result, Err(ReauthError::Http(e)) if e.status() == Some(500)));
    }

    #[tokio::test]
    async fn test_retried_call_settles_in_idle() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cart"))
            .and(header("Authorization", "Bearer T1"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(REFRESH_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"access_token": "T2", "refresh_token": "R2"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/cart"))
            .and(header("Authorization", "Bearer T2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 0})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, "T1", "R1");
        let (state, result) = client.drive(&cart_request()).await;

        assert_eq!(state, ReauthState::Idle);
        assert_eq!(result.unwrap().code, 200);
    }

    #[tokio::test]
    async fn test_unrecoverable_call_settles_in_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/cart"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(REFRESH_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_string("Invalid refresh token"))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, "T1", "R1");
        let (state, result) = client.drive(&cart_request()).await;

        assert_eq!(state, ReauthState::Failed);
        assert!(matches!(result, Err(ReauthError::SessionExpired { .. })));
        assert!(client.tokens().token_pair().is_none());
    }
}
