//! The authenticated user and partial profile updates.
//!
//! This module provides the [`User`] type held by the session, the
//! [`UserId`] identifier, and [`UserPatch`] for shallow profile updates.
//!
//! # Example
//!
//! ```rust
//! use a1french_api::{User, UserPatch};
//!
//! let mut user: User = serde_json::from_str(
//!     r#"{"id": 1, "name": "Amélie", "email": "amelie@example.com"}"#,
//! ).unwrap();
//!
//! user.apply(&UserPatch::default().name("Amélie Poulain"));
//! assert_eq!(user.name, "Amélie Poulain");
//! assert_eq!(user.email, "amelie@example.com");
//! ```

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a user.
///
/// The backend emits UUID strings while older payloads use integers, so
/// both are accepted. The id is always serialized back as a string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates an id from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for UserId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Unsigned(n) => Self(n.to_string()),
            RawId::Signed(n) => Self(n.to_string()),
        })
    }
}

/// A platform user.
///
/// Owned by the session; replaced wholesale on login and patched field by
/// field on profile updates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// The user id.
    pub id: UserId,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Email address.
    #[serde(default)]
    pub email: String,

    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,

    /// Age in years.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,

    /// Date of birth as `YYYY-MM-DD`.
    #[serde(
        default,
        alias = "dateOfBirth",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_of_birth: Option<String>,

    /// Gender, free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl User {
    /// Creates a user with only the required fields set.
    #[must_use]
    pub fn new(id: impl Into<UserId>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            picture: None,
            age: None,
            date_of_birth: None,
            gender: None,
        }
    }

    /// Shallow-merges the fields present in `patch` into this user.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(email) = &patch.email {
            self.email.clone_from(email);
        }
        if let Some(picture) = &patch.picture {
            self.picture = Some(picture.clone());
        }
        if let Some(age) = patch.age {
            self.age = Some(age);
        }
        if let Some(dob) = &patch.date_of_birth {
            self.date_of_birth = Some(dob.clone());
        }
        if let Some(gender) = &patch.gender {
            self.gender = Some(gender.clone());
        }
    }
}

/// A partial user update.
///
/// Absent fields are left untouched, both locally by [`User::apply`] and on
/// the wire (they are skipped when serialized as the profile update body).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPatch {
    /// New display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// New age.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    /// New date of birth (`YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    /// New gender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

impl UserPatch {
    /// Sets the name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the email.
    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the picture URL.
    #[must_use]
    pub fn picture(mut self, picture: impl Into<String>) -> Self {
        self.picture = Some(picture.into());
        self
    }

    /// Sets the age.
    #[must_use]
    pub const fn age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    /// Sets the date of birth.
    #[must_use]
    pub fn date_of_birth(mut self, dob: impl Into<String>) -> Self {
        self.date_of_birth = Some(dob.into());
        self
    }

    /// Sets the gender.
    #[must_use]
    pub fn gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    /// Returns `true` when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.picture.is_none()
            && self.age.is_none()
            && self.date_of_birth.is_none()
            && self.gender.is_none()
    }
}
