//! Product and review repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use tamarind_core::{ProductId, ReviewId, UserId};

use super::{RepositoryError, conflict_on_unique};
use crate::models::product::{Product, ProductDraft, Review};

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    image: String,
    brand: String,
    category: String,
    description: String,
    price: Decimal,
    count_in_stock: i32,
    rating: f64,
    num_reviews: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self, reviews: Vec<Review>) -> Product {
        Product {
            id: ProductId::new(self.id),
            name: self.name,
            image: self.image,
            brand: self.brand,
            category: self.category,
            description: self.description,
            price: self.price,
            count_in_stock: self.count_in_stock,
            rating: self.rating,
            num_reviews: self.num_reviews,
            reviews,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    product_id: Uuid,
    user_id: Uuid,
    user_name: String,
    rating: i32,
    comment: String,
    created_at: DateTime<Utc>,
}

impl ReviewRow {
    fn into_review(self) -> Review {
        Review {
            id: ReviewId::new(self.id),
            user: UserId::new(self.user_id),
            name: self.user_name,
            rating: self.rating,
            comment: self.comment,
            created_at: self.created_at,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, name, image, brand, category, description, price, \
                               count_in_stock, rating, num_reviews, created_at, updated_at";
const REVIEW_COLUMNS: &str = "id, product_id, user_id, user_name, rating, comment, created_at";

/// Repository for catalog products and their reviews.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products with their reviews, newest product first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut reviews = self.reviews_by_product(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let product_reviews = reviews.remove(&row.id).unwrap_or_default();
                row.into_product(product_reviews)
            })
            .collect())
    }

    /// Get one product with its reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut reviews = self.reviews_by_product(&[row.id]).await?;
        let product_reviews = reviews.remove(&row.id).unwrap_or_default();
        Ok(Some(row.into_product(product_reviews)))
    }

    /// Look up several products by ID for order pricing.
    ///
    /// Reviews are not loaded; callers only need the pricing fields. The
    /// result may be shorter than the input when some IDs do not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many_basic(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<Product>, RepositoryError> {
        let raw: Vec<Uuid> = ids.iter().map(|id| id.as_uuid()).collect();
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ANY($1)"
        ))
        .bind(&raw)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.into_product(Vec::new())).collect())
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, draft: &ProductDraft) -> Result<Product, RepositoryError> {
        let row: ProductRow = sqlx::query_as(&format!(
            "INSERT INTO products (name, image, brand, category, description, price, count_in_stock) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&draft.name)
        .bind(&draft.image)
        .bind(&draft.brand)
        .bind(&draft.category)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.count_in_stock)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into_product(Vec::new()))
    }

    /// Update a product's catalog fields. Reviews and the rating aggregate
    /// are untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn update(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "UPDATE products \
             SET name = $2, image = $3, brand = $4, category = $5, description = $6, \
                 price = $7, count_in_stock = $8, updated_at = now() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(&draft.name)
        .bind(&draft.image)
        .bind(&draft.brand)
        .bind(&draft.category)
        .bind(&draft.description)
        .bind(draft.price)
        .bind(draft.count_in_stock)
        .fetch_optional(self.pool)
        .await?;

        let row = row.ok_or(RepositoryError::NotFound)?;
        let mut reviews = self.reviews_by_product(&[row.id]).await?;
        let product_reviews = reviews.remove(&row.id).unwrap_or_default();
        Ok(row.into_product(product_reviews))
    }

    /// Delete a product (reviews cascade).
    ///
    /// # Returns
    ///
    /// `true` if a row was deleted, `false` if the product did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn reviews_by_product(
        &self,
        product_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<Review>>, RepositoryError> {
        if product_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<ReviewRow> = sqlx::query_as(&format!(
            "SELECT {REVIEW_COLUMNS} FROM product_reviews \
             WHERE product_id = ANY($1) \
             ORDER BY created_at ASC"
        ))
        .bind(product_ids)
        .fetch_all(self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<Review>> = HashMap::new();
        for row in rows {
            grouped
                .entry(row.product_id)
                .or_default()
                .push(row.into_review());
        }
        Ok(grouped)
    }

    // =========================================================================
    // Transaction-scoped helpers for the review aggregator
    // =========================================================================

    /// Lock a product row for a review append and return whether it exists.
    ///
    /// The lock serializes concurrent review submissions on the same
    /// product, so the duplicate check and aggregate update that follow see
    /// a consistent state.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lock(conn: &mut PgConnection, id: ProductId) -> Result<bool, RepositoryError> {
        let row: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM products WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(conn)
            .await?;
        Ok(row.is_some())
    }

    /// Whether `user_id` has already reviewed `product_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn has_review_by(
        conn: &mut PgConnection,
        product_id: ProductId,
        user_id: UserId,
    ) -> Result<bool, RepositoryError> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM product_reviews WHERE product_id = $1 AND user_id = $2",
        )
        .bind(product_id.as_uuid())
        .bind(user_id.as_uuid())
        .fetch_optional(conn)
        .await?;
        Ok(row.is_some())
    }

    /// Insert a review row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the (product, reviewer) pair
    /// already has a review - the unique constraint backs up the
    /// application-level check under concurrency.
    pub async fn insert_review(
        conn: &mut PgConnection,
        product_id: ProductId,
        user_id: UserId,
        user_name: &str,
        rating: i32,
        comment: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO product_reviews (product_id, user_id, user_name, rating, comment) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(product_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(user_name)
        .bind(rating)
        .bind(comment)
        .execute(conn)
        .await
        .map_err(|e| conflict_on_unique(e, "product already reviewed"))?;
        Ok(())
    }

    /// Load all ratings on a product, for aggregate recomputation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn ratings(
        conn: &mut PgConnection,
        product_id: ProductId,
    ) -> Result<Vec<i32>, RepositoryError> {
        let rows: Vec<(i32,)> =
            sqlx::query_as("SELECT rating FROM product_reviews WHERE product_id = $1")
                .bind(product_id.as_uuid())
                .fetch_all(conn)
                .await?;
        Ok(rows.into_iter().map(|(r,)| r).collect())
    }

    /// Store a recomputed rating aggregate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_aggregate(
        conn: &mut PgConnection,
        product_id: ProductId,
        rating: f64,
        num_reviews: i32,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE products SET rating = $2, num_reviews = $3, updated_at = now() WHERE id = $1",
        )
        .bind(product_id.as_uuid())
        .bind(rating)
        .bind(num_reviews)
        .execute(conn)
        .await?;
        Ok(())
    }
}
