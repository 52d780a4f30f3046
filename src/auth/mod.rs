//! Authentication state for the A1 French API SDK.
//!
//! This module provides the types that hold and persist "who is signed in".
//!
//! # Overview
//!
//! - [`SessionStorage`]: Pluggable key/value persistence, with
//!   [`MemoryStorage`] and [`FileStorage`] backends
//! - [`TokenStore`]: Access/refresh token pair and user snapshot persistence
//! - [`AuthSession`]: The current user and authenticated flag
//! - [`User`], [`UserId`], [`UserPatch`]: The signed-in user and profile updates
//! - [`TokenPair`], [`AuthResponse`]: Credentials returned by the auth endpoints
//!
//! # Session Lifecycle
//!
//! A session is built once from storage with
//! [`AuthSession::from_storage`]. Logging in calls
//! [`AuthSession::set_credentials`]; logging out, or a `401` that cannot be
//! recovered by refreshing, calls [`AuthSession::logout`].
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use a1french_api::auth::{AuthSession, MemoryStorage, TokenStore};
//!
//! let tokens = Arc::new(TokenStore::new(Arc::new(MemoryStorage::new())));
//! let session = AuthSession::from_storage(tokens);
//!
//! // Nothing persisted yet
//! assert!(!session.is_authenticated());
//! ```

pub mod session;
pub mod storage;
mod token_store;
mod tokens;
mod user;

pub use session::{AuthSession, SessionState};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
pub use token_store::{TokenStore, USER_KEY};
pub use tokens::{AuthResponse, TokenKind, TokenPair};
pub use user::{User, UserId, UserPatch};
