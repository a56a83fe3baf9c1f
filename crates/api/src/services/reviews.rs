//! Product review service.
//!
//! Appends a review and recomputes the product's rating aggregate in one
//! transaction. A customer may review a product at most once; the
//! application-level check is backed by a unique constraint on
//! `(product_id, user_id)` so concurrent submissions cannot slip past it.

use sqlx::PgPool;

use tamarind_core::{ProductId, UserId};

use crate::db::{ProductRepository, RepositoryError};
use crate::models::product::{Product, RATING_MAX, RATING_MIN, Review, aggregate_ratings};

/// Errors from review operations.
#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    /// The rating is outside the accepted range.
    #[error("rating must be between {RATING_MIN} and {RATING_MAX}")]
    RatingOutOfRange,

    /// The product does not exist.
    #[error("product not found")]
    NotFound,

    /// The customer has already reviewed this product.
    #[error("product already reviewed")]
    Duplicate,

    /// Database failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Review service.
pub struct ReviewService<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewService<'a> {
    /// Create a new review service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add a review to a product and return the product with its refreshed
    /// rating aggregate.
    ///
    /// The reviewer's display name is snapshotted onto the review so later
    /// profile renames do not rewrite review history.
    ///
    /// # Errors
    ///
    /// Returns `ReviewError::RatingOutOfRange` for a rating outside 1..=5,
    /// `ReviewError::NotFound` if the product does not exist, and
    /// `ReviewError::Duplicate` if this customer already reviewed it.
    pub async fn add_review(
        &self,
        product_id: ProductId,
        user_id: UserId,
        user_name: &str,
        rating: i32,
        comment: &str,
    ) -> Result<Product, ReviewError> {
        if !Review::rating_in_range(rating) {
            return Err(ReviewError::RatingOutOfRange);
        }

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        if !ProductRepository::lock(&mut *tx, product_id).await? {
            return Err(ReviewError::NotFound);
        }

        if ProductRepository::has_review_by(&mut *tx, product_id, user_id).await? {
            return Err(ReviewError::Duplicate);
        }

        ProductRepository::insert_review(&mut *tx, product_id, user_id, user_name, rating, comment)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => ReviewError::Duplicate,
                other => ReviewError::Repository(other),
            })?;

        let ratings = ProductRepository::ratings(&mut *tx, product_id).await?;
        let (rating_avg, num_reviews) = aggregate_ratings(&ratings);
        ProductRepository::update_aggregate(&mut *tx, product_id, rating_avg, num_reviews).await?;

        tx.commit().await.map_err(RepositoryError::from)?;
        tracing::info!(product_id = %product_id, user_id = %user_id, rating, "review added");

        ProductRepository::new(self.pool)
            .get(product_id)
            .await?
            .ok_or(ReviewError::NotFound)
    }
}
