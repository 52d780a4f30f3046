//! HTTP client types for the course platform API.
//!
//! This module provides the transport layer: a base request executor and a
//! wrapper that recovers from expired access tokens.
//!
//! # Overview
//!
//! - [`HttpClient`]: Sends one request, attaching the bearer token when required
//! - [`ReauthClient`]: Wraps [`HttpClient`] with one refresh-and-retry on `401`
//! - [`HttpRequest`]: A request to be sent to the API
//! - [`HttpResponse`]: A parsed response from the API
//! - [`HttpMethod`]: Supported HTTP methods (GET, POST, PUT, DELETE)
//! - [`ReauthState`], [`ReauthEvent`]: The recovery state machine
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use a1french_api::{ApiBaseUrl, ClientConfig, TokenStore};
//! use a1french_api::clients::{HttpClient, HttpMethod, HttpRequest, ReauthClient};
//!
//! let config = ClientConfig::builder()
//!     .base_url(ApiBaseUrl::new("http://localhost:3000")?)
//!     .build()?;
//! let tokens = Arc::new(TokenStore::in_memory());
//! let client = ReauthClient::new(HttpClient::new(&config, tokens)?);
//!
//! let request = HttpRequest::builder(HttpMethod::Get, "/api/courses")
//!     .requires_auth(true)
//!     .build()?;
//!
//! let response = client.request(&request).await?;
//! ```
//!
//! # Retry Behavior
//!
//! Only `401` on an authenticated request is retried, and only once, after
//! a successful token refresh. Other status codes and network errors are
//! returned immediately.

mod errors;
mod http_client;
mod http_request;
mod http_response;
mod reauth;

pub use errors::{HttpError, HttpResponseError, InvalidHttpRequestError};
pub use http_client::{HttpClient, SDK_VERSION};
pub use http_request::{HttpMethod, HttpRequest, HttpRequestBuilder};
pub use http_response::HttpResponse;
pub use reauth::{
    ReauthClient, ReauthError, ReauthEvent, ReauthState, RefreshError, REFRESH_PATH,
};
