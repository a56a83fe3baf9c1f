//! Order lifecycle service.
//!
//! Creates orders from re-priced line items and drives the
//! `created -> paid -> delivered` transitions. The transition decisions are
//! pure methods on [`Order`]; this service wraps them in a transaction that
//! holds the order row `FOR UPDATE` so concurrent calls serialize.

use std::collections::HashMap;

use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;

use tamarind_core::{OrderId, ProductId, UserId};

use crate::db::{OrderRepository, ProductRepository, RepositoryError};
use crate::models::order::{
    DeliveryError, DeliveryOutcome, NewOrder, Order, OrderItem, OrderTotals, PaymentCapture,
    ShippingAddress,
};

/// One line of a checkout request: which product, how many.
///
/// Deliberately carries no price; unit prices are always re-derived from
/// the catalog so a tampered request body cannot set its own.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub product: ProductId,
    pub qty: i32,
}

/// A checkout request body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub order_items: Vec<CheckoutItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
}

/// Errors from order operations.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// Checkout with no line items.
    #[error("no order items")]
    EmptyOrder,

    /// A line item's quantity is below 1.
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    /// A line item references a product that does not exist.
    #[error("product {0} not found")]
    UnknownProduct(ProductId),

    /// The order does not exist.
    #[error("order not found")]
    NotFound,

    /// Delivery requested before payment was captured.
    #[error("order has not been paid")]
    NotPaid,

    /// Database failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<DeliveryError> for OrderError {
    fn from(e: DeliveryError) -> Self {
        match e {
            DeliveryError::NotPaid => Self::NotPaid,
        }
    }
}

/// Order lifecycle service.
pub struct OrderService<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order for `user` from a checkout request.
    ///
    /// Every line is re-priced from the catalog: the product's current
    /// name, image, and price are snapshotted into the order, and totals
    /// are computed server-side.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::EmptyOrder` for an empty item list,
    /// `OrderError::InvalidQuantity` for a quantity below 1, and
    /// `OrderError::UnknownProduct` when a referenced product is missing.
    pub async fn create(
        &self,
        user_id: UserId,
        request: CheckoutRequest,
    ) -> Result<Order, OrderError> {
        if request.order_items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        if request.order_items.iter().any(|line| line.qty < 1) {
            return Err(OrderError::InvalidQuantity);
        }

        let ids: Vec<ProductId> = request.order_items.iter().map(|line| line.product).collect();
        let products = ProductRepository::new(self.pool).get_many_basic(&ids).await?;
        let by_id: HashMap<ProductId, _> = products.into_iter().map(|p| (p.id, p)).collect();

        let mut items = Vec::with_capacity(request.order_items.len());
        for line in &request.order_items {
            let product = by_id
                .get(&line.product)
                .ok_or(OrderError::UnknownProduct(line.product))?;
            items.push(OrderItem {
                product: product.id,
                name: product.name.clone(),
                image: product.image.clone(),
                price: product.price,
                qty: line.qty,
            });
        }

        let totals = OrderTotals::from_items(&items);
        let order = OrderRepository::new(self.pool)
            .create(&NewOrder {
                user_id,
                items,
                shipping_address: request.shipping_address,
                payment_method: request.payment_method,
                totals,
            })
            .await?;

        tracing::info!(order_id = %order.id, user_id = %user_id, total = %order.total_price, "order created");
        Ok(order)
    }

    /// Capture payment for an order, storing the processor's result record
    /// verbatim. Idempotent: an already-paid order is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order does not exist.
    pub async fn capture_payment(
        &self,
        id: OrderId,
        payment_result: serde_json::Value,
    ) -> Result<Order, OrderError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let mut order = OrderRepository::lock(&mut *tx, id)
            .await?
            .ok_or(OrderError::NotFound)?;

        match order.capture_payment(payment_result, Utc::now()) {
            PaymentCapture::Applied => {
                let paid_at = order.paid_at.unwrap_or_else(Utc::now);
                let result = order
                    .payment_result
                    .clone()
                    .unwrap_or(serde_json::Value::Null);
                OrderRepository::store_payment(&mut *tx, id, paid_at, &result).await?;
                tx.commit().await.map_err(RepositoryError::from)?;
                tracing::info!(order_id = %id, "payment captured");
            }
            PaymentCapture::AlreadyPaid => {
                tx.rollback().await.map_err(RepositoryError::from)?;
                tracing::debug!(order_id = %id, "payment capture repeated, no-op");
            }
        }

        Ok(order)
    }

    /// Mark an order delivered. Idempotent, and requires payment first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order does not exist and
    /// `OrderError::NotPaid` if payment has not been captured.
    pub async fn mark_delivered(&self, id: OrderId) -> Result<Order, OrderError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let mut order = OrderRepository::lock(&mut *tx, id)
            .await?
            .ok_or(OrderError::NotFound)?;

        match order.mark_delivered(Utc::now())? {
            DeliveryOutcome::Applied => {
                let delivered_at = order.delivered_at.unwrap_or_else(Utc::now);
                OrderRepository::store_delivery(&mut *tx, id, delivered_at).await?;
                tx.commit().await.map_err(RepositoryError::from)?;
                tracing::info!(order_id = %id, "order delivered");
            }
            DeliveryOutcome::AlreadyDelivered => {
                tx.rollback().await.map_err(RepositoryError::from)?;
                tracing::debug!(order_id = %id, "delivery repeated, no-op");
            }
        }

        Ok(order)
    }

    /// Get one order with its owner resolved for display.
    ///
    /// Visibility (owner-or-admin) is enforced by the route layer, which
    /// has the requesting identity at hand.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order does not exist.
    pub async fn get(&self, id: OrderId) -> Result<Order, OrderError> {
        OrderRepository::new(self.pool)
            .get(id)
            .await?
            .ok_or(OrderError::NotFound)
    }

    /// All orders owned by `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` on database failure.
    pub async fn list_mine(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        Ok(OrderRepository::new(self.pool).list_for_user(user_id).await?)
    }

    /// All orders in the store, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` on database failure.
    pub async fn list_all(&self) -> Result<Vec<Order>, OrderError> {
        Ok(OrderRepository::new(self.pool).list_all().await?)
    }
}
