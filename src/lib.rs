//! # A1 French API Rust SDK
//!
//! A Rust client SDK for the A1 French Classes course platform, providing
//! typed configuration, persisted authentication state, and an HTTP client
//! that transparently recovers from expired access tokens.
//!
//! ## Overview
//!
//! This SDK provides:
//! - Type-safe configuration via [`ClientConfig`] and [`ClientConfigBuilder`]
//! - Access/refresh token persistence via [`TokenStore`] over pluggable
//!   [`SessionStorage`](auth::SessionStorage)
//! - The signed-in user and authenticated flag via [`AuthSession`]
//! - One refresh-and-retry on `401` via [`ReauthClient`]
//! - Typed operations for auth, profile, courses, reviews and cart via
//!   [`ApiClient`], with tag-based query caching
//! - Client-side form validation via [`validation`]
//! - Price and rating presentation via [`pricing`]
//!
//! ## Quick Start
//!
//! ```rust
//! use a1french_api::{ApiBaseUrl, ClientConfig, Environment};
//!
//! let config = ClientConfig::builder()
//!     .base_url(ApiBaseUrl::new("https://api.a1frenchclasses.com").unwrap())
//!     .environment(Environment::Prod)
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Signing In
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use a1french_api::{ApiClient, ClientConfig};
//! use a1french_api::auth::FileStorage;
//!
//! let storage = Arc::new(FileStorage::open("session.json")?);
//! let client = ApiClient::new(&ClientConfig::from_env()?, storage)?;
//!
//! // Validate whatever a previous run left behind
//! let state = client.restore_session().await?;
//! if !state.is_authenticated {
//!     client.login_with_email("amelie@example.com", "Secret12").await?;
//! }
//! ```
//!
//! ## Session Recovery
//!
//! Authenticated calls that get a `401` are retried once after exchanging
//! the refresh token for a new pair. Concurrent callers share a single
//! refresh. When the refresh cannot happen (no refresh token, or the
//! refresh call fails) the session is logged out and the call returns
//! [`ApiError::SessionExpired`]:
//!
//! ```rust,ignore
//! use a1french_api::ApiError;
//!
//! match client.get_cart().await {
//!     Ok(summary) => println!("{} items", summary.item_count()),
//!     Err(ApiError::SessionExpired) => show_login_screen(),
//!     Err(e) => eprintln!("{e}"),
//! }
//! ```
//!
//! ## Design Principles
//!
//! - **One source of truth**: tokens live only in [`TokenStore`]; the
//!   session and transport share it through an `Arc`
//! - **Fail-fast validation**: invalid config and form input are rejected
//!   before any request is sent
//! - **Thread-safe**: all client and session types are `Send + Sync`
//! - **Async-first**: designed for use with the Tokio async runtime

pub mod api;
pub mod auth;
pub mod clients;
pub mod config;
pub mod error;
pub mod pricing;
pub mod validation;

// Re-export public types at crate root for convenience
pub use config::{ApiBaseUrl, ClientConfig, ClientConfigBuilder, Environment};
pub use error::ConfigError;

// Re-export auth types
pub use auth::{AuthResponse, AuthSession, SessionState, TokenPair, TokenStore, User, UserId, UserPatch};

// Re-export HTTP client types
pub use clients::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpRequestBuilder, HttpResponse,
    HttpResponseError, InvalidHttpRequestError, ReauthClient, ReauthError,
};

// Re-export API types
pub use api::{ApiClient, ApiError, Cart, CartItem, CartSummary, Course, Review};
pub use validation::ValidationError;
