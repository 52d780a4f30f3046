//! Price, discount and rating presentation.
//!
//! # Example
//!
//! ```rust
//! use a1french_api::pricing::{format_price, Pricing, StarRating};
//!
//! assert_eq!(format_price(1299.0, "$"), "$1,299");
//!
//! let pricing = Pricing::new(199.0, Some(299.0), "$");
//! assert_eq!(pricing.savings.as_deref(), Some("Save $100"));
//!
//! assert_eq!(StarRating::new(3.0).stars, "★★★☆☆");
//! ```

use std::fmt;

/// Formats a whole-unit price with thousands separators, e.g. `$1,299`.
///
/// Fractions are rounded to the nearest unit; non-finite amounts format as
/// zero.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_price(amount: f64, currency: &str) -> String {
    if !amount.is_finite() {
        return format!("{currency}0");
    }

    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0 { "-" } else { "" };
    format!("{sign}{currency}{grouped}")
}

/// Rounds to cents.
#[must_use]
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// A current price compared with its original price.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pricing {
    /// Formatted current price.
    pub price: String,
    /// Formatted original price.
    pub original_price: String,
    /// Whether the original price is above the current one.
    pub has_discount: bool,
    /// Formatted difference, `$0` without a discount.
    pub discount_amount: String,
    /// Rounded percentage, e.g. `33%`.
    pub discount_percentage: String,
    /// `Save $100`, present only with a discount.
    pub savings: Option<String>,
}

impl Pricing {
    /// Compares `price` against `original`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new(price: f64, original: Option<f64>, currency: &str) -> Self {
        let original_price = original.unwrap_or(f64::NAN);
        let has_discount = original.is_some_and(|o| o > 0.0 && o > price);

        let discount = if has_discount { original_price - price } else { 0.0 };
        let percentage = if has_discount {
            (discount / original_price * 100.0).round() as i64
        } else {
            0
        };
        let discount_amount = format_price(discount, currency);

        Self {
            price: format_price(price, currency),
            original_price: format_price(original_price, currency),
            has_discount,
            savings: has_discount.then(|| format!("Save {discount_amount}")),
            discount_amount,
            discount_percentage: format!("{percentage}%"),
        }
    }
}

/// A 0 to 5 rating rendered as stars.
#[derive(Clone, Debug, PartialEq)]
pub struct StarRating {
    /// Rating clamped to 0..=5.
    pub rating: f64,
    /// Number of full stars.
    pub filled: u8,
    /// Number of empty stars.
    pub empty: u8,
    /// `★` repeated `filled` times, then `☆` repeated `empty` times.
    pub stars: String,
    /// Rating as a rounded percentage of 5.
    pub percentage: u8,
}

impl StarRating {
    /// Builds the display for `rating`. Non-finite ratings display as 0.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(rating: f64) -> Self {
        let rating = if rating.is_finite() {
            rating.clamp(0.0, 5.0)
        } else {
            0.0
        };
        let filled = rating.floor() as u8;
        let empty = 5 - filled;

        Self {
            rating,
            filled,
            empty,
            stars: "★".repeat(filled.into()) + &"☆".repeat(empty.into()),
            percentage: (rating / 5.0 * 100.0).round() as u8,
        }
    }
}

impl fmt::Display for StarRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/5", self.rating)
    }
}

/// A course difficulty level.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CourseLevel {
    /// Beginner.
    Beginner,
    /// Intermediate.
    Intermediate,
    /// Advanced.
    Advanced,
    /// Any other non-empty label, kept as written.
    Custom(String),
    /// Missing or blank.
    Unknown,
}

impl CourseLevel {
    /// Parses a level label, case-insensitively.
    ///
    /// ```rust
    /// use a1french_api::pricing::CourseLevel;
    ///
    /// assert_eq!(CourseLevel::parse("ADVANCED"), CourseLevel::Advanced);
    /// assert_eq!(CourseLevel::parse("Expert"), CourseLevel::Custom("Expert".into()));
    /// assert_eq!(CourseLevel::parse("  "), CourseLevel::Unknown);
    /// ```
    #[must_use]
    pub fn parse(level: &str) -> Self {
        let normalized = level.trim().to_lowercase();
        match normalized.as_str() {
            "" => Self::Unknown,
            "beginner" => Self::Beginner,
            "intermediate" => Self::Intermediate,
            "advanced" => Self::Advanced,
            _ => Self::Custom(level.to_string()),
        }
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
            Self::Custom(label) => label,
            Self::Unknown => "Unknown",
        }
    }

    /// Returns the CSS class used for the level badge.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self {
            Self::Beginner => "level-beginner",
            Self::Intermediate => "level-intermediate",
            Self::Advanced => "level-advanced",
            Self::Custom(_) => "level-custom",
            Self::Unknown => "level-unknown",
        }
    }
}

impl fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(199.0, "$"), "$199");
        assert_eq!(format_price(1299.0, "$"), "$1,299");
        assert_eq!(format_price(1_234_567.0, "€"), "€1,234,567");
        assert_eq!(format_price(0.0, "$"), "$0");
        assert_eq!(format_price(199.99, "$"), "$200");
        assert_eq!(format_price(199.49, "$"), "$199");
        assert_eq!(format_price(f64::NAN, "£"), "£0");
    }

    #[test]
    fn test_pricing_with_discount() {
        let pricing = Pricing::new(199.0, Some(299.0), "$");
        assert_eq!(pricing.price, "$199");
        assert_eq!(pricing.original_price, "$299");
        assert!(pricing.has_discount);
        assert_eq!(pricing.discount_amount, "$100");
        assert_eq!(pricing.discount_percentage, "33%");
        assert_eq!(pricing.savings.as_deref(), Some("Save $100"));
    }

    #[test]
    fn test_pricing_without_discount() {
        let same = Pricing::new(199.0, Some(199.0), "$");
        assert!(!same.has_discount);
        assert_eq!(same.discount_amount, "$0");
        assert_eq!(same.discount_percentage, "0%");
        assert!(same.savings.is_none());

        let none = Pricing::new(199.0, None, "$");
        assert!(!none.has_discount);
        assert_eq!(none.original_price, "$0");
    }

    #[test]
    fn test_star_rating() {
        let five = StarRating::new(5.0);
        assert_eq!(five.stars, "★★★★★");
        assert_eq!(five.percentage, 100);
        assert_eq!(five.to_string(), "5/5");

        let three = StarRating::new(3.0);
        assert_eq!(three.stars, "★★★☆☆");
        assert_eq!((three.filled, three.empty), (3, 2));
        assert_eq!(three.percentage, 60);

        let half = StarRating::new(4.5);
        assert_eq!(half.stars, "★★★★☆");
        assert_eq!(half.to_string(), "4.5/5");
    }

    #[test]
    fn test_star_rating_clamps() {
        assert_eq!(StarRating::new(10.0).rating, 5.0);
        assert_eq!(StarRating::new(-1.0).stars, "☆☆☆☆☆");
        assert_eq!(StarRating::new(f64::NAN).to_string(), "0/5");
    }

    #[test]
    fn test_course_level() {
        assert_eq!(CourseLevel::parse("Beginner"), CourseLevel::Beginner);
        assert_eq!(CourseLevel::parse("intermediate").css_class(), "level-intermediate");
        assert_eq!(CourseLevel::parse("Expert").label(), "Expert");
        assert_eq!(CourseLevel::parse("").to_string(), "Unknown");
    }
}
