//! Resource types exchanged with the course platform API.
//!
//! Every field the server may omit has a serde default, so partially
//! populated payloads (and the zero-valued nested records the server
//! embeds) deserialize without error. Unknown fields such as
//! `created_at` are ignored.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::auth::User;
use crate::pricing::{round_cents, CourseLevel, StarRating};

/// Accepts a JSON string or number as an id and keeps it as a string.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Unsigned(u64),
        Signed(i64),
        Null(()),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Unsigned(n) => n.to_string(),
        RawId::Signed(n) => n.to_string(),
        RawId::Null(()) => String::new(),
    })
}

/// A course in the catalogue.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Course {
    /// Course id.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Title.
    pub name: String,
    /// Long description.
    pub description: String,
    /// Human readable duration, e.g. `"8 weeks"`.
    pub duration: String,
    /// Average rating, 0 to 5.
    pub rating: f64,
    /// Cover image URL.
    pub image_url: String,
    /// Difficulty label.
    pub difficulty: String,
    /// Link to the course content.
    pub course_url: String,
    /// The instructor, when embedded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<User>,
    /// List price.
    pub price: f64,
    /// Discount in percent.
    pub discount: f64,
    /// Number of lectures.
    pub num_lectures: u32,
    /// First class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    /// Last class.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    /// Class schedule, free text.
    pub class_timing: String,
    /// Reviews, when embedded.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reviews: Vec<Review>,
}

impl Course {
    /// Returns `true` when a positive discount applies.
    #[must_use]
    pub fn has_discount(&self) -> bool {
        self.discount > 0.0
    }

    /// Returns the price after discount, rounded to cents.
    ///
    /// ```rust
    /// use a1french_api::Course;
    ///
    /// let course = Course { price: 199.0, discount: 20.0, ..Course::default() };
    /// assert_eq!(course.discounted_price(), 159.2);
    /// ```
    #[must_use]
    pub fn discounted_price(&self) -> f64 {
        if self.has_discount() {
            round_cents(self.price * (1.0 - self.discount / 100.0))
        } else {
            self.price
        }
    }

    /// Returns the parsed difficulty level.
    #[must_use]
    pub fn level(&self) -> CourseLevel {
        CourseLevel::parse(&self.difficulty)
    }

    /// Returns the rating as stars.
    #[must_use]
    pub fn stars(&self) -> StarRating {
        StarRating::new(self.rating)
    }
}

/// A course review.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Review {
    /// Review id.
    pub id: u64,
    /// Rating, 1 to 5.
    pub rating: u8,
    /// Review text.
    pub comment: String,
    /// Reviewed course.
    #[serde(deserialize_with = "string_or_number")]
    pub course_id: String,
    /// Author.
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    /// Author details, when embedded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// Body of a new review.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NewReview {
    /// Reviewed course.
    pub course_id: String,
    /// Rating, 1 to 5.
    pub rating: u8,
    /// Review text.
    pub comment: String,
}

/// Body of a review update.
///
/// `course_id` scopes which cached review lists are refreshed afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReviewUpdate {
    /// Reviewed course.
    pub course_id: String,
    /// New rating.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    /// New text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// A shopping cart.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cart {
    /// Cart id.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Owner.
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    /// Line items.
    pub items: Vec<CartItem>,
}

/// A cart line item.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartItem {
    /// Item id.
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Owning cart.
    #[serde(deserialize_with = "string_or_number")]
    pub cart_id: String,
    /// Course in the cart.
    #[serde(deserialize_with = "string_or_number")]
    pub course_id: String,
    /// Course details, when embedded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course: Option<Course>,
    /// Number of seats.
    pub quantity: u32,
    /// Unit price at the time the item was added (discount applied).
    pub price: f64,
}

impl CartItem {
    /// Returns `price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// The cart together with the server-computed total.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CartSummary {
    /// The cart.
    pub cart: Cart,
    /// Server-computed total.
    pub total: f64,
}

impl CartSummary {
    /// Returns the number of seats across all items, saturating at `u32::MAX`.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.cart
            .items
            .iter()
            .map(|item| item.quantity)
            .fold(0_u32, u32::saturating_add)
    }

    /// Recomputes the total locally, rounded to cents.
    #[must_use]
    pub fn computed_total(&self) -> f64 {
        round_cents(self.cart.items.iter().map(CartItem::line_total).sum())
    }
}

/// Body of `POST /api/cart/items`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AddToCart {
    /// Course to add.
    pub course_id: String,
    /// Number of seats.
    pub quantity: u32,
}

/// Body of `POST /api/signup`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct SignupRequest {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"*****")
            .finish()
    }
}

/// Body of `POST /api/login/email`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct EmailCredentials {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

impl EmailCredentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for EmailCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailCredentials")
            .field("email", &self.email)
            .field("password", &"*****")
            .finish()
    }
}
