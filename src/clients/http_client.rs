//! HTTP client for the course platform API.
//!
//! This module provides [`HttpClient`], the base request executor. It sends
//! exactly one request per call and attaches the stored bearer token to
//! authenticated requests. It never writes to the token store; recovering
//! from an expired token is the job of the
//! [`ReauthClient`](crate::clients::ReauthClient) wrapped around it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::TokenStore;
use crate::clients::errors::{HttpError, HttpResponseError};
use crate::clients::http_request::{HttpMethod, HttpRequest};
use crate::clients::http_response::HttpResponse;
use crate::config::{ApiBaseUrl, ClientConfig};

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Base request executor.
///
/// The client handles:
/// - URL construction from the configured [`ApiBaseUrl`]
/// - Default headers including User-Agent and Accept
/// - The `Authorization: Bearer` header on requests that require auth
/// - Mapping non-2xx responses to [`HttpError::Response`]
///
/// # Thread Safety
///
/// `HttpClient` is `Send + Sync`, making it safe to share across async tasks.
///
/// # Example
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use a1french_api::{ApiBaseUrl, ClientConfig, TokenStore};
/// use a1french_api::clients::{HttpClient, HttpMethod, HttpRequest};
///
/// let config = ClientConfig::builder()
///     .base_url(ApiBaseUrl::new("http://localhost:3000")?)
///     .build()?;
/// let client = HttpClient::new(&config, Arc::new(TokenStore::in_memory()))?;
///
/// let request = HttpRequest::builder(HttpMethod::Get, "/api/courses")
///     .requires_auth(true)
///     .build()?;
/// let response = client.request(&request).await?;
/// ```
#[derive(Debug)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: ApiBaseUrl,
    default_headers: HashMap<String, String>,
    tokens: Arc<TokenStore>,
}

// Verify HttpClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<HttpClient>();
};

impl HttpClient {
    /// Creates a new HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Network`] if the underlying reqwest client
    /// cannot be created (for example when TLS initialization fails).
    pub fn new(config: &ClientConfig, tokens: Arc<TokenStore>) -> Result<Self, HttpError> {
        let user_agent_prefix = config
            .user_agent_prefix()
            .map_or(String::new(), |prefix| format!("{prefix} | "));
        let rust_version = env!("CARGO_PKG_RUST_VERSION");
        let user_agent =
            format!("{user_agent_prefix}A1 French API Library v{SDK_VERSION} | Rust {rust_version}");

        let mut default_headers = HashMap::new();
        default_headers.insert("User-Agent".to_string(), user_agent);
        default_headers.insert("Accept".to_string(), "application/json".to_string());

        let mut builder = reqwest::Client::builder().use_rustls_tls();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url().clone(),
            default_headers,
            tokens,
        })
    }

    /// Returns the API base URL.
    #[must_use]
    pub const fn base_url(&self) -> &ApiBaseUrl {
        &self.base_url
    }

    /// Returns the default headers for this client.
    #[must_use]
    pub const fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    /// Returns the token store the bearer token is read from.
    #[must_use]
    pub const fn tokens(&self) -> &Arc<TokenStore> {
        &self.tokens
    }

    /// Sends a request, reading the access token from the token store.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if:
    /// - Request validation fails (`InvalidRequest`)
    /// - Network error occurs (`Network`)
    /// - Non-2xx response received (`Response`)
    pub async fn request(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let token = self.tokens.access_token();
        self.request_with_token(request, token.as_deref()).await
    }

    /// Sends a request with an explicit access token.
    ///
    /// The token is only attached when `request.requires_auth` is set.
    pub(crate) async fn request_with_token(
        &self,
        request: &HttpRequest,
        access_token: Option<&str>,
    ) -> Result<HttpResponse, HttpError> {
        request.verify()?;

        let url = self.base_url.join(&request.path);

        let mut headers = self.default_headers.clone();
        if request.body.is_some() {
            headers.insert("Content-Type".to_string(), "application/json".to_string());
        }
        if request.requires_auth {
            if let Some(token) = access_token {
                headers.insert("Authorization".to_string(), format!("Bearer {token}"));
            }
        }

        let mut req_builder = match request.http_method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
            HttpMethod::Put => self.client.put(&url),
            HttpMethod::Delete => self.client.delete(&url),
        };
        for (key, value) in &headers {
            req_builder = req_builder.header(key, value);
        }
        if let Some(query) = &request.query {
            req_builder = req_builder.query(query);
        }
        if let Some(body) = &request.body {
            req_builder = req_builder.body(body.to_string());
        }

        tracing::debug!(
            method = %request.http_method,
            path = %request.path,
            authenticated = request.requires_auth && access_token.is_some(),
            "Dispatching request"
        );

        let res = req_builder.send().await?;

        let code = res.status().as_u16();
        let res_headers = Self::parse_response_headers(res.headers());
        let body_text = res.text().await?;
        let response = HttpResponse::new(code, res_headers, HttpResponse::parse_body(&body_text));

        if response.is_ok() {
            return Ok(response);
        }

        tracing::debug!(
            status = code,
            path = %request.path,
            "Request failed"
        );
        Err(HttpError::Response(HttpResponseError::from_response(
            &response,
        )))
    }

    fn parse_response_headers(
        headers: &reqwest::header::HeaderMap,
    ) -> HashMap<String, Vec<String>> {
        let mut result: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in headers {
            let key = name.as_str().to_lowercase();
            let value = value.to_str().unwrap_or_default().to_string();
            result.entry(key).or_default().push(value);
        }
        result
    }
}
