//! Top-level error type for API operations.
//!
//! # Example
//!
//! ```rust,ignore
//! use a1french_api::ApiError;
//!
//! match client.get_course("c-1").await {
//!     Ok(course) => println!("{}", course.name),
//!     Err(e) if e.is_not_found() => println!("No such course"),
//!     Err(ApiError::SessionExpired) => println!("Please sign in again"),
//!     Err(ApiError::Validation(e)) => println!("{}: {}", e.field, e),
//!     Err(e) => println!("Error: {e}"),
//! }
//! ```

use thiserror::Error;

use crate::auth::StorageError;
use crate::clients::{HttpError, InvalidHttpRequestError, ReauthError};
use crate::validation::ValidationError;

/// Errors returned by [`ApiClient`](crate::ApiClient) operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Input was rejected before any request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The server answered with an error, or could not be reached.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// The access token expired and could not be refreshed. The session has
    /// been logged out.
    #[error("Your session has expired. Please sign in again.")]
    SessionExpired,

    /// The response body did not have the expected shape.
    #[error("Unexpected response from {endpoint}: {source}")]
    Decode {
        /// Operation whose response failed to decode.
        endpoint: &'static str,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The operation needs tokens the server did not return.
    #[error("{endpoint} did not return a token pair")]
    MissingTokens {
        /// Operation that returned no tokens.
        endpoint: &'static str,
    },

    /// Session storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<InvalidHttpRequestError> for ApiError {
    fn from(error: InvalidHttpRequestError) -> Self {
        Self::Http(HttpError::InvalidRequest(error))
    }
}

impl From<ReauthError> for ApiError {
    fn from(error: ReauthError) -> Self {
        match error {
            ReauthError::Http(e) => Self::Http(e),
            ReauthError::SessionExpired { .. } => Self::SessionExpired,
        }
    }
}

impl ApiError {
    /// Returns the response status code, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http(e) => e.status(),
            _ => None,
        }
    }

    /// Returns `true` for a `401` that was surfaced as-is, or an expired
    /// session.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::SessionExpired) || matches!(self.status(), Some(401))
    }

    /// Returns `true` for a `404` response.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }
}
