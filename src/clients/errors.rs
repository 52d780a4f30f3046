//! HTTP-specific error types for the A1 French API SDK.
//!
//! # Error Handling
//!
//! - [`HttpResponseError`]: Non-2xx HTTP responses from the API
//! - [`InvalidHttpRequestError`]: When a request fails validation before sending
//! - [`HttpError`]: Unified error type encompassing all HTTP-related errors
//!
//! # Example
//!
//! ```rust,ignore
//! use a1french_api::clients::{HttpClient, HttpRequest, HttpMethod, HttpError};
//!
//! match client.request(&request).await {
//!     Ok(response) => println!("Success: {}", response.body),
//!     Err(HttpError::Response(e)) => {
//!         println!("API error {}: {}", e.code, e.message);
//!     }
//!     Err(HttpError::InvalidRequest(e)) => {
//!         println!("Invalid request: {}", e);
//!     }
//!     Err(HttpError::Network(e)) => {
//!         println!("Network error: {}", e);
//!     }
//! }
//! ```

use thiserror::Error;

use crate::clients::http_response::HttpResponse;

/// Error returned when an HTTP request receives a non-successful response.
///
/// The server writes errors either as plain text or as a JSON object with
/// an `error` or `message` field; `message` holds whichever was found.
///
/// # Example
///
/// ```rust
/// use a1french_api::clients::HttpResponseError;
///
/// let error = HttpResponseError {
///     code: 404,
///     message: "Course not found".to_string(),
/// };
///
/// assert_eq!(error.to_string(), "Course not found (status 404)");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message} (status {code})")]
pub struct HttpResponseError {
    /// The HTTP status code of the response.
    pub code: u16,
    /// Error message extracted from the response body.
    pub message: String,
}

impl HttpResponseError {
    /// Builds the error for a non-2xx response.
    #[must_use]
    pub fn from_response(response: &HttpResponse) -> Self {
        Self {
            code: response.code,
            message: error_message(response),
        }
    }
}

fn error_message(response: &HttpResponse) -> String {
    let body = &response.body;

    if let Some(text) = body.as_str() {
        let text = text.trim();
        if !text.is_empty() {
            return text.to_string();
        }
    }

    for field in ["error", "message", "errors"] {
        match body.get(field) {
            Some(serde_json::Value::String(s)) if !s.is_empty() => return s.clone(),
            Some(serde_json::Value::Null) | None => {}
            Some(other) => return other.to_string(),
        }
    }

    reqwest::StatusCode::from_u16(response.code)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("Request failed")
        .to_string()
}

/// Error returned when an HTTP request fails validation.
///
/// # Example
///
/// ```rust
/// use a1french_api::clients::InvalidHttpRequestError;
///
/// let error = InvalidHttpRequestError::MissingBody {
///     method: "post".to_string(),
/// };
///
/// assert_eq!(error.to_string(), "Cannot use post without specifying data.");
/// ```
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidHttpRequestError {
    /// A POST or PUT request was made without a body.
    #[error("Cannot use {method} without specifying data.")]
    MissingBody {
        /// The HTTP method that requires a body.
        method: String,
    },
}

/// Unified error type for all HTTP-related errors.
#[derive(Debug, Error)]
pub enum HttpError {
    /// An HTTP response error (non-2xx status code).
    #[error(transparent)]
    Response(#[from] HttpResponseError),

    /// Request validation failed.
    #[error(transparent)]
    InvalidRequest(#[from] InvalidHttpRequestError),

    /// Network or connection error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl HttpError {
    /// Returns the response status code, if the server answered.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Response(e) => Some(e.code),
            Self::InvalidRequest(_) | Self::Network(_) => None,
        }
    }

    /// Returns `true` for a `401 Unauthorized` response.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401))
    }
}
