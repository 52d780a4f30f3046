//! Configuration types for the A1 French API SDK.
//!
//! This module provides the core configuration types used to initialize
//! the SDK for API communication with the course platform backend.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`ClientConfig`]: The main configuration struct holding all SDK settings
//! - [`ClientConfigBuilder`]: A builder for constructing [`ClientConfig`] instances
//! - [`ApiBaseUrl`]: A validated API base URL
//! - [`Environment`]: The deployment environment (dev or prod)
//!
//! # Example
//!
//! ```rust
//! use a1french_api::{ClientConfig, ApiBaseUrl, Environment};
//!
//! let config = ClientConfig::builder()
//!     .base_url(ApiBaseUrl::new("https://api.example.com").unwrap())
//!     .environment(Environment::Prod)
//!     .build()
//!     .unwrap();
//! ```

mod environment;
mod newtypes;

pub use environment::Environment;
pub use newtypes::ApiBaseUrl;

use std::time::Duration;

use crate::error::ConfigError;

/// Variable holding an optional User-Agent prefix.
pub const USER_AGENT_PREFIX_VAR: &str = "A1F_USER_AGENT_PREFIX";

/// Configuration for the A1 French API SDK.
///
/// # Thread Safety
///
/// `ClientConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
///
/// # Example
///
/// ```rust
/// use a1french_api::{ClientConfig, ApiBaseUrl};
/// use std::time::Duration;
///
/// let config = ClientConfig::builder()
///     .base_url(ApiBaseUrl::new("http://localhost:3000").unwrap())
///     .timeout(Duration::from_secs(10))
///     .build()
///     .unwrap();
///
/// assert_eq!(config.timeout(), Some(Duration::from_secs(10)));
/// ```
#[derive(Clone, Debug)]
pub struct ClientConfig {
    base_url: ApiBaseUrl,
    environment: Environment,
    user_agent_prefix: Option<String>,
    timeout: Option<Duration>,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Builds a configuration from process environment variables.
    ///
    /// `A1F_ENV` selects the environment (`prod` or anything else for dev),
    /// then `A1F_API_URL_PROD` or `A1F_API_URL_DEV` provides the base URL.
    /// `A1F_USER_AGENT_PREFIX` is optional.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when the URL variable for the
    /// selected environment is unset, or [`ConfigError::InvalidBaseUrl`]
    /// when it does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable lookup.
    ///
    /// [`from_env`](Self::from_env) delegates here with `std::env::var`.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup(Environment::SELECTOR_VAR)
            .map_or_else(Environment::default, |name| Environment::from_name(&name));

        let url_var = environment.url_var();
        let url = lookup(url_var)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingEnvVar { name: url_var })?;

        let mut builder = Self::builder()
            .base_url(ApiBaseUrl::new(url)?)
            .environment(environment);

        if let Some(prefix) = lookup(USER_AGENT_PREFIX_VAR).filter(|p| !p.is_empty()) {
            builder = builder.user_agent_prefix(prefix);
        }

        builder.build()
    }

    /// Returns the API base URL.
    #[must_use]
    pub const fn base_url(&self) -> &ApiBaseUrl {
        &self.base_url
    }

    /// Returns the deployment environment.
    #[must_use]
    pub const fn environment(&self) -> Environment {
        self.environment
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }

    /// Returns the per-request timeout, if configured.
    ///
    /// `None` leaves the transport default in place.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// `base_url` is required. All other fields have defaults.
///
/// # Defaults
///
/// - `environment`: [`Environment::Dev`]
/// - `user_agent_prefix`: `None`
/// - `timeout`: `None`
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_url: Option<ApiBaseUrl>,
    environment: Option<Environment>,
    user_agent_prefix: Option<String>,
    timeout: Option<Duration>,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API base URL (required).
    #[must_use]
    pub fn base_url(mut self, url: ApiBaseUrl) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the deployment environment.
    #[must_use]
    pub const fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Sets a per-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the [`ClientConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `base_url` is not set.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let base_url = self
            .base_url
            .ok_or(ConfigError::MissingRequiredField { field: "base_url" })?;

        Ok(ClientConfig {
            base_url,
            environment: self.environment.unwrap_or_default(),
            user_agent_prefix: self.user_agent_prefix,
            timeout: self.timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_builder_requires_base_url() {
        let result = ClientConfigBuilder::new().build();

        assert!(matches!(
            result,
            Err(ConfigError::MissingRequiredField { field: "base_url" })
        ));
    }

    #[test]
    fn test_builder_provides_sensible_defaults() {
        let config = ClientConfig::builder()
            .base_url(ApiBaseUrl::new("https://api.example.com").unwrap())
            .build()
            .unwrap();

        assert_eq!(config.environment(), Environment::Dev);
        assert!(config.user_agent_prefix().is_none());
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_builder_with_all_optional_fields() {
        let config = ClientConfig::builder()
            .base_url(ApiBaseUrl::new("https://api.example.com").unwrap())
            .environment(Environment::Prod)
            .user_agent_prefix("CoursesApp/2.0")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(config.environment(), Environment::Prod);
        assert_eq!(config.user_agent_prefix(), Some("CoursesApp/2.0"));
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_from_lookup_defaults_to_dev_url() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("A1F_API_URL_DEV", "http://localhost:3000"),
            ("A1F_API_URL_PROD", "https://api.example.com"),
        ]))
        .unwrap();

        assert_eq!(config.environment(), Environment::Dev);
        assert_eq!(config.base_url().as_ref(), "http://localhost:3000");
    }

    #[test]
    fn test_from_lookup_selects_prod_url() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("A1F_ENV", "prod"),
            ("A1F_API_URL_DEV", "http://localhost:3000"),
            ("A1F_API_URL_PROD", "https://api.example.com"),
            ("A1F_USER_AGENT_PREFIX", "Kiosk/1.0"),
        ]))
        .unwrap();

        assert_eq!(config.environment(), Environment::Prod);
        assert_eq!(config.base_url().as_ref(), "https://api.example.com");
        assert_eq!(config.user_agent_prefix(), Some("Kiosk/1.0"));
    }

    #[test]
    fn test_from_lookup_reports_missing_url_var() {
        let result = ClientConfig::from_lookup(lookup_from(&[("A1F_ENV", "prod")]));

        assert_eq!(
            result.unwrap_err(),
            ConfigError::MissingEnvVar {
                name: "A1F_API_URL_PROD"
            }
        );
    }

    #[test]
    fn test_config_is_clone_and_debug() {
        let config = ClientConfig::builder()
            .base_url(ApiBaseUrl::new("https://api.example.com").unwrap())
            .build()
            .unwrap();

        let cloned = config.clone();
        assert_eq!(cloned.base_url(), config.base_url());
        assert!(format!("{config:?}").contains("ClientConfig"));
    }
}
