//! Order repository.
//!
//! Reads always join the owning user for display, and line items come back
//! in the position they were submitted at checkout. Lifecycle mutations
//! (payment capture, delivery marking) are connection-scoped so the service
//! can run them inside a transaction that holds the order row `FOR UPDATE`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use tamarind_core::{Email, OrderId, ProductId, UserId};

use super::RepositoryError;
use crate::models::order::{NewOrder, Order, OrderItem, OrderOwner, ShippingAddress};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    user_name: String,
    user_email: String,
    shipping_address: serde_json::Value,
    payment_method: String,
    items_price: Decimal,
    tax_price: Decimal,
    shipping_price: Decimal,
    total_price: Decimal,
    is_paid: bool,
    paid_at: Option<DateTime<Utc>>,
    payment_result: Option<serde_json::Value>,
    is_delivered: bool,
    delivered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        let email = Email::parse(&self.user_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let shipping_address: ShippingAddress = serde_json::from_value(self.shipping_address)
            .map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid shipping address: {e}"))
            })?;

        Ok(Order {
            id: OrderId::new(self.id),
            user: OrderOwner {
                id: UserId::new(self.user_id),
                name: self.user_name,
                email,
            },
            items,
            shipping_address,
            payment_method: self.payment_method,
            items_price: self.items_price,
            tax_price: self.tax_price,
            shipping_price: self.shipping_price,
            total_price: self.total_price,
            is_paid: self.is_paid,
            paid_at: self.paid_at,
            payment_result: self.payment_result,
            is_delivered: self.is_delivered,
            delivered_at: self.delivered_at,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: Uuid,
    product_id: Uuid,
    name: String,
    image: String,
    price: Decimal,
    qty: i32,
}

impl OrderItemRow {
    fn into_item(self) -> OrderItem {
        OrderItem {
            product: ProductId::new(self.product_id),
            name: self.name,
            image: self.image,
            price: self.price,
            qty: self.qty,
        }
    }
}

const ORDER_SELECT: &str = "SELECT o.id, o.user_id, u.name AS user_name, u.email AS user_email, \
                            o.shipping_address, o.payment_method, \
                            o.items_price, o.tax_price, o.shipping_price, o.total_price, \
                            o.is_paid, o.paid_at, o.payment_result, \
                            o.is_delivered, o.delivered_at, o.created_at \
                            FROM orders o JOIN users u ON u.id = o.user_id";

const ITEM_SELECT: &str =
    "SELECT order_id, product_id, name, image, price, qty FROM order_items WHERE order_id = ANY($1) ORDER BY line_no ASC";

/// Repository for orders and their line items.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order with its line items and return the stored order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn create(&self, draft: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let shipping = serde_json::to_value(&draft.shipping_address).map_err(|e| {
            RepositoryError::DataCorruption(format!("unserializable shipping address: {e}"))
        })?;

        let (order_id,): (Uuid,) = sqlx::query_as(
            "INSERT INTO orders (user_id, shipping_address, payment_method, \
                                 items_price, tax_price, shipping_price, total_price) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id",
        )
        .bind(draft.user_id.as_uuid())
        .bind(shipping)
        .bind(&draft.payment_method)
        .bind(draft.totals.items_price)
        .bind(draft.totals.tax_price)
        .bind(draft.totals.shipping_price)
        .bind(draft.totals.total_price)
        .fetch_one(&mut *tx)
        .await?;

        for (line_no, item) in (0_i32..).zip(&draft.items) {
            sqlx::query(
                "INSERT INTO order_items (order_id, line_no, product_id, name, image, price, qty) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(order_id)
            .bind(line_no)
            .bind(item.product.as_uuid())
            .bind(&item.name)
            .bind(&item.image)
            .bind(item.price)
            .bind(item.qty)
            .execute(&mut *tx)
            .await?;
        }

        let order = Self::fetch_one(&mut *tx, OrderId::new(order_id), false)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        tx.commit().await?;

        Ok(order)
    }

    /// Get one order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_one(&mut conn, id, false).await
    }

    /// All orders owned by `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "{ORDER_SELECT} WHERE o.user_id = $1 ORDER BY o.created_at DESC"
        ))
        .bind(user_id.as_uuid())
        .fetch_all(self.pool)
        .await?;

        self.assemble(rows).await
    }

    /// All orders in the store, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> =
            sqlx::query_as(&format!("{ORDER_SELECT} ORDER BY o.created_at DESC"))
                .fetch_all(self.pool)
                .await?;

        self.assemble(rows).await
    }

    /// Load an order inside a transaction, locking its row `FOR UPDATE`.
    ///
    /// This is the entry point for lifecycle transitions: the lock
    /// serializes concurrent capture/deliver calls on the same order so the
    /// idempotence check is race-free.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn lock(
        conn: &mut PgConnection,
        id: OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        Self::fetch_one(conn, id, true).await
    }

    /// Persist a payment capture decided by [`Order::capture_payment`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn store_payment(
        conn: &mut PgConnection,
        id: OrderId,
        paid_at: DateTime<Utc>,
        payment_result: &serde_json::Value,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE orders SET is_paid = TRUE, paid_at = $2, payment_result = $3 WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(paid_at)
        .bind(payment_result)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// Persist a delivery decided by [`Order::mark_delivered`].
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn store_delivery(
        conn: &mut PgConnection,
        id: OrderId,
        delivered_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE orders SET is_delivered = TRUE, delivered_at = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(delivered_at)
            .execute(conn)
            .await?;
        Ok(())
    }

    async fn fetch_one(
        conn: &mut PgConnection,
        id: OrderId,
        for_update: bool,
    ) -> Result<Option<Order>, RepositoryError> {
        let lock_clause = if for_update { " FOR UPDATE OF o" } else { "" };
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("{ORDER_SELECT} WHERE o.id = $1{lock_clause}"))
                .bind(id.as_uuid())
                .fetch_optional(&mut *conn)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let item_rows: Vec<OrderItemRow> = sqlx::query_as(ITEM_SELECT)
            .bind(vec![row.id])
            .fetch_all(conn)
            .await?;
        let items = item_rows.into_iter().map(OrderItemRow::into_item).collect();

        Ok(Some(row.into_order(items)?))
    }

    async fn assemble(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let item_rows: Vec<OrderItemRow> = sqlx::query_as(ITEM_SELECT)
            .bind(&ids)
            .fetch_all(self.pool)
            .await?;

        let mut grouped: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for item in item_rows {
            grouped
                .entry(item.order_id)
                .or_default()
                .push(item.into_item());
        }

        rows.into_iter()
            .map(|row| {
                let items = grouped.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect()
    }
}
