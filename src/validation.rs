//! Client-side form validation.
//!
//! Each validator returns `Ok(())` or a [`ValidationError`] carrying the
//! message shown next to the form field. [`ApiClient`](crate::ApiClient)
//! runs the relevant validators before signup and login so that invalid
//! input never reaches the network.
//!
//! # Example
//!
//! ```rust
//! use a1french_api::validation;
//!
//! assert!(validation::email("a@b.com").is_ok());
//!
//! let err = validation::password("short").unwrap_err();
//! assert_eq!(err.field, "password");
//! assert_eq!(err.to_string(), "Password must be at least 8 characters long");
//! ```

use chrono::{Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static EMAIL_RE: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());
static NAME_RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[a-zA-Z\s]+$").ok());

/// A form field that failed validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    /// Name of the offending field.
    pub field: String,
    /// Message to display for the field.
    pub message: String,
}

impl ValidationError {
    /// Creates a validation error.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

fn matches(re: &Lazy<Option<Regex>>, value: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(value))
}

/// Validates an email address.
///
/// # Errors
///
/// Returns [`ValidationError`] if the email is empty or malformed.
pub fn email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::new("email", "Email is required"));
    }
    if !matches(&EMAIL_RE, email) {
        return Err(ValidationError::new(
            "email",
            "Please enter a valid email address",
        ));
    }
    Ok(())
}

/// Validates a new password.
///
/// A password needs at least 8 characters, an uppercase letter, a
/// lowercase letter, and a digit.
///
/// # Errors
///
/// Returns [`ValidationError`] naming the first rule the password breaks.
pub fn password(password: &str) -> Result<(), ValidationError> {
    let fail = |message: &str| Err(ValidationError::new("password", message));

    if password.is_empty() {
        return fail("Password is required");
    }
    if password.chars().count() < 8 {
        return fail("Password must be at least 8 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return fail("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return fail("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return fail("Password must contain at least one number");
    }
    Ok(())
}

/// Strength level reported by [`password_strength`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StrengthLevel {
    /// Empty password.
    None,
    /// Score of 2 or less.
    Weak,
    /// Score of 3 or 4.
    Medium,
    /// Score of 5 or 6.
    Strong,
}

/// Result of [`password_strength`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PasswordStrength {
    /// Strength bucket.
    pub level: StrengthLevel,
    /// Raw score from 0 to 6.
    pub score: u8,
}

/// Scores a password for the strength meter.
///
/// One point each for: 8+ characters, 12+ characters, a lowercase letter,
/// an uppercase letter, a digit, and any other character.
#[must_use]
pub fn password_strength(password: &str) -> PasswordStrength {
    if password.is_empty() {
        return PasswordStrength {
            level: StrengthLevel::None,
            score: 0,
        };
    }

    let len = password.chars().count();
    let checks = [
        len >= 8,
        len >= 12,
        password.chars().any(|c| c.is_ascii_lowercase()),
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ];
    let score = checks.iter().fold(0_u8, |acc, &hit| acc + u8::from(hit));

    let level = match score {
        0..=2 => StrengthLevel::Weak,
        3..=4 => StrengthLevel::Medium,
        _ => StrengthLevel::Strong,
    };
    PasswordStrength { level, score }
}

/// Validates the password confirmation field.
///
/// # Errors
///
/// Returns [`ValidationError`] if the confirmation is empty or differs.
pub fn confirm_password(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    if confirmation.is_empty() {
        return Err(ValidationError::new(
            "confirm_password",
            "Please confirm your password",
        ));
    }
    if password != confirmation {
        return Err(ValidationError::new(
            "confirm_password",
            "Passwords do not match",
        ));
    }
    Ok(())
}

/// Validates a display name: at least two characters, letters and spaces.
///
/// # Errors
///
/// Returns [`ValidationError`] if the name is empty, too short, or has
/// other characters.
pub fn name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::new("name", "Name is required"));
    }
    if name.trim().chars().count() < 2 {
        return Err(ValidationError::new(
            "name",
            "Name must be at least 2 characters long",
        ));
    }
    if !matches(&NAME_RE, name) {
        return Err(ValidationError::new(
            "name",
            "Name can only contain letters and spaces",
        ));
    }
    Ok(())
}

/// Validates an optional age field as typed into a form.
///
/// # Errors
///
/// Returns [`ValidationError`] if the value is not a number or is outside
/// 5 to 120.
pub fn age(age: &str) -> Result<(), ValidationError> {
    let age = age.trim();
    if age.is_empty() {
        return Ok(());
    }

    let Ok(years) = age.parse::<i64>() else {
        return Err(ValidationError::new("age", "Age must be a number"));
    };
    if !(5..=120).contains(&years) {
        return Err(ValidationError::new("age", "Please enter a valid age"));
    }
    Ok(())
}

/// Validates an optional `YYYY-MM-DD` date of birth relative to `today`.
///
/// # Errors
///
/// Returns [`ValidationError`] if the date does not parse, is after
/// `today`, or is less than five years before it.
pub fn date_of_birth(dob: &str, today: NaiveDate) -> Result<(), ValidationError> {
    let dob = dob.trim();
    if dob.is_empty() {
        return Ok(());
    }

    let Ok(date) = NaiveDate::parse_from_str(dob, "%Y-%m-%d") else {
        return Err(ValidationError::new(
            "date_of_birth",
            "Please enter a valid date",
        ));
    };
    if date > today {
        return Err(ValidationError::new(
            "date_of_birth",
            "Date of birth cannot be in the future",
        ));
    }

    let youngest = today.checked_sub_months(Months::new(60)).unwrap_or(today);
    if date > youngest {
        return Err(ValidationError::new(
            "date_of_birth",
            "You must be at least 5 years old",
        ));
    }
    Ok(())
}

/// Validates that a field is not blank.
///
/// # Errors
///
/// Returns [`ValidationError`] with `"{field} is required"`.
pub fn required(value: &str, field: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, format!("{field} is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_email_rules() {
        assert!(email("a@b.com").is_ok());
        assert_eq!(email("").unwrap_err().message, "Email is required");
        assert_eq!(
            email("not-an-email").unwrap_err().message,
            "Please enter a valid email address"
        );
        assert!(email("a b@c.com").is_err());
    }

    #[test]
    fn test_password_rules_in_order() {
        assert!(password("Secret12").is_ok());
        assert_eq!(password("").unwrap_err().message, "Password is required");
        assert_eq!(
            password("Sec1").unwrap_err().message,
            "Password must be at least 8 characters long"
        );
        assert_eq!(
            password("secret123").unwrap_err().message,
            "Password must contain at least one uppercase letter"
        );
        assert_eq!(
            password("SECRET123").unwrap_err().message,
            "Password must contain at least one lowercase letter"
        );
        assert_eq!(
            password("Secretpass").unwrap_err().message,
            "Password must contain at least one number"
        );
    }

    #[test]
    fn test_password_strength_levels() {
        assert_eq!(password_strength("").level, StrengthLevel::None);

        let weak = password_strength("abc");
        assert_eq!(weak.level, StrengthLevel::Weak);
        assert_eq!(weak.score, 1);

        let medium = password_strength("Secret12");
        assert_eq!(medium.score, 4);
        assert_eq!(medium.level, StrengthLevel::Medium);

        let strong = password_strength("Secret12!Longer");
        assert_eq!(strong.score, 6);
        assert_eq!(strong.level, StrengthLevel::Strong);
    }

    #[test]
    fn test_confirm_password() {
        assert!(confirm_password("Secret12", "Secret12").is_ok());
        assert_eq!(
            confirm_password("Secret12", "").unwrap_err().message,
            "Please confirm your password"
        );
        assert_eq!(
            confirm_password("Secret12", "Secret13").unwrap_err().message,
            "Passwords do not match"
        );
    }

    #[test]
    fn test_name_rules() {
        assert!(name("Amelie Poulain").is_ok());
        assert_eq!(name("").unwrap_err().message, "Name is required");
        assert_eq!(
            name(" a ").unwrap_err().message,
            "Name must be at least 2 characters long"
        );
        assert_eq!(
            name("R2D2").unwrap_err().message,
            "Name can only contain letters and spaces"
        );
    }

    #[test]
    fn test_age_is_optional_and_bounded() {
        assert!(age("").is_ok());
        assert!(age("34").is_ok());
        assert_eq!(age("abc").unwrap_err().message, "Age must be a number");
        assert_eq!(age("4").unwrap_err().message, "Please enter a valid age");
        assert_eq!(age("121").unwrap_err().message, "Please enter a valid age");
    }

    #[test]
    fn test_date_of_birth_rules() {
        let today = day(2024, 6, 15);

        assert!(date_of_birth("", today).is_ok());
        assert!(date_of_birth("1990-04-01", today).is_ok());
        assert!(date_of_birth("2019-06-15", today).is_ok());
        assert_eq!(
            date_of_birth("15/06/1990", today).unwrap_err().message,
            "Please enter a valid date"
        );
        assert_eq!(
            date_of_birth("2024-06-16", today).unwrap_err().message,
            "Date of birth cannot be in the future"
        );
        assert_eq!(
            date_of_birth("2019-06-16", today).unwrap_err().message,
            "You must be at least 5 years old"
        );
    }

    #[test]
    fn test_required_uses_field_name() {
        assert!(required("x", "Comment").is_ok());
        let err = required("   ", "Comment").unwrap_err();
        assert_eq!(err.field, "Comment");
        assert_eq!(err.to_string(), "Comment is required");
    }
}
