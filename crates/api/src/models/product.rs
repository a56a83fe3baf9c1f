//! Catalog product and review domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tamarind_core::{ProductId, ReviewId, UserId};

/// Lowest accepted review rating.
pub const RATING_MIN: i32 = 1;
/// Highest accepted review rating.
pub const RATING_MAX: i32 = 5;

/// A customer review attached to a product.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    /// Unique review ID.
    pub id: ReviewId,
    /// The reviewing user.
    pub user: UserId,
    /// Reviewer display name, snapshotted at submission time. Later name
    /// changes do not retroactively alter past reviews.
    pub name: String,
    /// Integer rating in `[RATING_MIN, RATING_MAX]`.
    pub rating: i32,
    /// Free-text comment.
    pub comment: String,
    /// When the review was submitted.
    pub created_at: DateTime<Utc>,
}

impl Review {
    /// Whether a caller-supplied rating is in the accepted range.
    #[must_use]
    pub const fn rating_in_range(rating: i32) -> bool {
        RATING_MIN <= rating && rating <= RATING_MAX
    }
}

/// A catalog product with its reviews and running rating aggregate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Image URL or path.
    pub image: String,
    /// Brand name.
    pub brand: String,
    /// Category label.
    pub category: String,
    /// Long description.
    pub description: String,
    /// Unit price.
    pub price: Decimal,
    /// Units in stock.
    pub count_in_stock: i32,
    /// Mean of all review ratings; `0.0` when there are none.
    pub rating: f64,
    /// Number of reviews.
    pub num_reviews: i32,
    /// Reviews in submission order.
    pub reviews: Vec<Review>,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Catalog fields supplied when creating or updating a product.
///
/// The rating aggregate is never writable through this type; it only moves
/// through the review aggregator.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub count_in_stock: i32,
}

/// Recompute the (mean, count) aggregate for a set of review ratings.
///
/// The mean uses floating-point division and is stored unrounded; display
/// rounding is the caller's concern.
#[must_use]
#[allow(clippy::cast_precision_loss)] // rating sums stay far below f64 precision
pub fn aggregate_ratings(ratings: &[i32]) -> (f64, i32) {
    if ratings.is_empty() {
        return (0.0, 0);
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    let count = ratings.len();
    (sum as f64 / count as f64, count as i32)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn empty_product_has_zero_aggregate() {
        assert_eq!(aggregate_ratings(&[]), (0.0, 0));
    }

    #[test]
    fn mean_over_distinct_reviewers() {
        // A rates 4 -> 4.0/1, then B rates 2 -> 3.0/2.
        assert_eq!(aggregate_ratings(&[4]), (4.0, 1));
        assert_eq!(aggregate_ratings(&[4, 2]), (3.0, 2));
    }

    #[test]
    fn mean_is_not_rounded_for_storage() {
        let (mean, count) = aggregate_ratings(&[5, 4, 4]);
        assert_eq!(count, 3);
        assert!((mean - 13.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rating_range_bounds() {
        assert!(!Review::rating_in_range(0));
        assert!(Review::rating_in_range(1));
        assert!(Review::rating_in_range(5));
        assert!(!Review::rating_in_range(6));
    }
}
