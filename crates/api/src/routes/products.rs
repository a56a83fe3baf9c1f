//! Product catalog and review route handlers.
//!
//! Catalog reads are public; catalog writes are admin-only. Any
//! authenticated customer can submit one review per product.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use tamarind_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::{CurrentUser, RequireAdmin};
use crate::models::{Product, ProductDraft};
use crate::services::ReviewService;
use crate::state::AppState;

/// Review submission request body.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub rating: i32,
    pub comment: String,
}

/// `GET /api/products` - list the catalog.
pub async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(Json(products))
}

/// `GET /api/products/{id}` - one product with its reviews.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product".to_string()))?;

    Ok(Json(product))
}

/// `POST /api/products` - create a product (admin).
pub async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Json(draft): Json<ProductDraft>,
) -> Result<Response> {
    let product = ProductRepository::new(state.pool()).create(&draft).await?;

    tracing::info!(product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)).into_response())
}

/// `PUT /api/products/{id}` - update a product's catalog fields (admin).
pub async fn update_product(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(draft): Json<ProductDraft>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool()).update(id, &draft).await?;
    Ok(Json(product))
}

/// `DELETE /api/products/{id}` - delete a product and its reviews (admin).
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<Json<serde_json::Value>> {
    if !ProductRepository::new(state.pool()).delete(id).await? {
        return Err(AppError::NotFound("Product".to_string()));
    }

    tracing::info!(product_id = %id, "product deleted");
    Ok(Json(json!({ "message": "Product removed" })))
}

/// `POST /api/products/{id}/reviews` - add a review (one per customer).
pub async fn create_review(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<ProductId>,
    Json(body): Json<ReviewRequest>,
) -> Result<Response> {
    let product = ReviewService::new(state.pool())
        .add_review(id, user.id, &user.name, body.rating, &body.comment)
        .await?;

    Ok((StatusCode::CREATED, Json(product)).into_response())
}
