//! Typed operations against the course platform API.
//!
//! This module sits on top of [`clients`](crate::clients) and
//! [`auth`](crate::auth) and exposes one method per backend operation.
//!
//! # Overview
//!
//! - [`ApiClient`]: The client; one async method per operation
//! - [`Endpoint`], [`ENDPOINTS`]: The operation table (method, path, auth,
//!   cache tags)
//! - [`EndpointCall`]: One call to an endpoint, with path parameters and body
//! - [`QueryCache`], [`CacheTag`]: Tag-based caching of query results
//! - [`ApiError`]: Errors returned by every operation
//! - Resource types: [`Course`], [`Review`], [`Cart`], [`CartItem`], ...
//!
//! # Caching
//!
//! Queries provide tags (for example `Courses` or `Reviews:<course id>`) and
//! are served from [`QueryCache`] until a mutation invalidates a matching
//! tag. A tag without an id matches every tag of its kind.
//!
//! # Example
//!
//! ```rust,ignore
//! use a1french_api::{ApiClient, ClientConfig};
//! use a1french_api::api::NewReview;
//!
//! let client = ApiClient::with_memory_storage(&ClientConfig::from_env()?)?;
//! client.login_with_email("a@b.com", "Secret12").await?;
//!
//! let reviews = client.get_course_reviews("c-1").await?; // network
//! let reviews = client.get_course_reviews("c-1").await?; // cache
//!
//! client
//!     .create_review(&NewReview {
//!         course_id: "c-1".to_string(),
//!         rating: 5,
//!         comment: "Très bien".to_string(),
//!     })
//!     .await?;
//! let reviews = client.get_course_reviews("c-1").await?; // network again
//! ```

mod cache;
mod client;
mod endpoint;
mod errors;
mod models;

pub use cache::QueryCache;
pub use client::ApiClient;
pub use endpoint::{
    build_path, CacheTag, Endpoint, EndpointCall, EndpointDef, EndpointKind, TagType, ENDPOINTS,
};
pub use errors::ApiError;
pub use models::{
    AddToCart, Cart, CartItem, CartSummary, Course, EmailCredentials, NewReview, Review,
    ReviewUpdate, SignupRequest,
};
