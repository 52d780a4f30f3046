//! Deployment environment selection.
//!
//! This module provides the [`Environment`] enum, which decides which API
//! base URL variable is consulted when building configuration from the
//! process environment.

use std::fmt;
use std::str::FromStr;

/// Deployment environment the client talks to.
///
/// Only the exact name `prod` selects production; every other value,
/// including an unset variable, selects development.
///
/// # Example
///
/// ```rust
/// use a1french_api::Environment;
///
/// assert_eq!(Environment::from_name("prod"), Environment::Prod);
/// assert_eq!(Environment::from_name("staging"), Environment::Dev);
/// assert_eq!(Environment::Prod.url_var(), "A1F_API_URL_PROD");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Environment {
    /// Development backend.
    #[default]
    Dev,
    /// Production backend.
    Prod,
}

impl Environment {
    /// Name of the variable that selects the environment.
    pub const SELECTOR_VAR: &'static str = "A1F_ENV";

    /// Resolves an environment from its name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        if name.trim() == "prod" {
            Self::Prod
        } else {
            Self::Dev
        }
    }

    /// Returns the variable holding the API base URL for this environment.
    #[must_use]
    pub const fn url_var(&self) -> &'static str {
        match self {
            Self::Dev => "A1F_API_URL_DEV",
            Self::Prod => "A1F_API_URL_PROD",
        }
    }

    /// Returns `true` for the production environment.
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Prod)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dev => f.write_str("dev"),
            Self::Prod => f.write_str("prod"),
        }
    }
}

impl FromStr for Environment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}
