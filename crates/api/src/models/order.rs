//! Order domain types and the order lifecycle state machine.
//!
//! An order moves `created -> paid -> delivered`. Both transitions are
//! idempotent: re-applying one to an order already past that state returns
//! the order unchanged instead of re-stamping timestamps. Delivery requires
//! payment first.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tamarind_core::{Email, OrderId, ProductId, UserId, round_currency};

/// Orders at or above this items subtotal ship free.
pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(100, 0, 0, false, 0);
/// Flat shipping price below the free-shipping threshold.
pub const SHIPPING_FLAT: Decimal = Decimal::from_parts(1000, 0, 0, false, 2);
/// Sales tax rate applied to the items subtotal (15%).
pub const TAX_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// Shipping destination captured at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// A priced quantity of a product, snapshotted into an order at checkout.
///
/// `name`, `image`, and `price` are copies of the product row at order time,
/// not live references; later product edits never alter historical orders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// The product this line was priced from.
    pub product: ProductId,
    /// Product name at order time.
    pub name: String,
    /// Product image at order time.
    pub image: String,
    /// Unit price at order time, re-derived server-side from the catalog.
    pub price: Decimal,
    /// Quantity, at least 1.
    pub qty: i32,
}

/// The owning user's identity, resolved for display.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderOwner {
    pub id: UserId,
    pub name: String,
    pub email: Email,
}

/// Computed order totals, each rounded to currency precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub items_price: Decimal,
    pub shipping_price: Decimal,
    pub tax_price: Decimal,
    pub total_price: Decimal,
}

impl OrderTotals {
    /// Compute totals from priced line items.
    ///
    /// Items subtotal is the sum of `price * qty`; shipping is flat below
    /// [`FREE_SHIPPING_THRESHOLD`] and free at or above it; tax is
    /// [`TAX_RATE`] of the subtotal.
    #[must_use]
    pub fn from_items(items: &[OrderItem]) -> Self {
        let items_price = round_currency(
            items
                .iter()
                .map(|item| item.price * Decimal::from(item.qty))
                .sum(),
        );
        let shipping_price = round_currency(if items_price >= FREE_SHIPPING_THRESHOLD {
            Decimal::ZERO
        } else {
            SHIPPING_FLAT
        });
        let tax_price = round_currency(items_price * TAX_RATE);
        let total_price = round_currency(items_price + shipping_price + tax_price);

        Self {
            items_price,
            shipping_price,
            tax_price,
            total_price,
        }
    }
}

/// A fully priced order ready for insertion, produced by the order service
/// after re-pricing every line from the catalog.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    pub totals: OrderTotals,
}

/// Outcome of a payment capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentCapture {
    /// The order transitioned to paid.
    Applied,
    /// The order was already paid; nothing changed.
    AlreadyPaid,
}

/// Outcome of marking an order delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The order transitioned to delivered.
    Applied,
    /// The order was already delivered; nothing changed.
    AlreadyDelivered,
}

/// Why a delivery transition was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The order has not been paid yet.
    #[error("order has not been paid")]
    NotPaid,
}

/// A purchase order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order ID.
    pub id: OrderId,
    /// Owning user, with name/email resolved for display.
    pub user: OrderOwner,
    /// Snapshotted line items.
    #[serde(rename = "orderItems")]
    pub items: Vec<OrderItem>,
    /// Shipping destination.
    pub shipping_address: ShippingAddress,
    /// Payment method label (e.g. "paypal").
    pub payment_method: String,
    /// Items subtotal.
    pub items_price: Decimal,
    /// Tax amount.
    pub tax_price: Decimal,
    /// Shipping amount.
    pub shipping_price: Decimal,
    /// Grand total.
    pub total_price: Decimal,
    /// Whether payment has been captured.
    pub is_paid: bool,
    /// When payment was captured; set exactly once.
    pub paid_at: Option<DateTime<Utc>>,
    /// Opaque payment-processor record, stored verbatim.
    pub payment_result: Option<serde_json::Value>,
    /// Whether the order has been delivered.
    pub is_delivered: bool,
    /// When the order was delivered; set exactly once.
    pub delivered_at: Option<DateTime<Utc>>,
    /// When the order was placed.
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Apply a payment capture.
    ///
    /// Idempotent: an already-paid order is left untouched (including its
    /// original `paid_at` and payment result) and `AlreadyPaid` is returned.
    pub fn capture_payment(
        &mut self,
        payment_result: serde_json::Value,
        now: DateTime<Utc>,
    ) -> PaymentCapture {
        if self.is_paid {
            return PaymentCapture::AlreadyPaid;
        }
        self.is_paid = true;
        self.paid_at = Some(now);
        self.payment_result = Some(payment_result);
        PaymentCapture::Applied
    }

    /// Mark the order delivered.
    ///
    /// Idempotent, and requires the order to be paid first.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError::NotPaid`] if payment has not been captured.
    pub fn mark_delivered(&mut self, now: DateTime<Utc>) -> Result<DeliveryOutcome, DeliveryError> {
        if self.is_delivered {
            return Ok(DeliveryOutcome::AlreadyDelivered);
        }
        if !self.is_paid {
            return Err(DeliveryError::NotPaid);
        }
        self.is_delivered = true;
        self.delivered_at = Some(now);
        Ok(DeliveryOutcome::Applied)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn item(price: &str, qty: i32) -> OrderItem {
        OrderItem {
            product: ProductId::generate(),
            name: "Widget".to_owned(),
            image: "/images/widget.jpg".to_owned(),
            price: price.parse().unwrap(),
            qty,
        }
    }

    fn order(items: Vec<OrderItem>) -> Order {
        let totals = OrderTotals::from_items(&items);
        Order {
            id: OrderId::generate(),
            user: OrderOwner {
                id: UserId::generate(),
                name: "Ana".to_owned(),
                email: Email::parse("ana@example.com").unwrap(),
            },
            items,
            shipping_address: ShippingAddress {
                address: "1 Harbor Rd".to_owned(),
                city: "Porto".to_owned(),
                postal_code: "4000".to_owned(),
                country: "PT".to_owned(),
            },
            payment_method: "paypal".to_owned(),
            items_price: totals.items_price,
            tax_price: totals.tax_price,
            shipping_price: totals.shipping_price,
            total_price: totals.total_price,
            is_paid: false,
            paid_at: None,
            payment_result: None,
            is_delivered: false,
            delivered_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn totals_for_ten_plus_twenty() {
        let totals = OrderTotals::from_items(&[item("10.00", 1), item("20.00", 1)]);
        assert_eq!(totals.items_price.to_string(), "30.00");
        assert_eq!(totals.shipping_price.to_string(), "10.00");
        assert_eq!(totals.tax_price.to_string(), "4.50");
        assert_eq!(totals.total_price.to_string(), "44.50");
    }

    #[test]
    fn totals_respect_quantity_and_free_shipping() {
        let totals = OrderTotals::from_items(&[item("60.00", 2)]);
        assert_eq!(totals.items_price.to_string(), "120.00");
        assert_eq!(totals.shipping_price.to_string(), "0.00");
    }

    #[test]
    fn capture_payment_sets_flag_and_timestamp_once() {
        let mut order = order(vec![item("10.00", 1)]);
        let now = Utc::now();

        let outcome = order.capture_payment(serde_json::json!({"id": "PAY-1"}), now);
        assert_eq!(outcome, PaymentCapture::Applied);
        assert!(order.is_paid);
        assert_eq!(order.paid_at, Some(now));
        assert!(!order.is_delivered);
    }

    #[test]
    fn capture_payment_is_idempotent() {
        let mut order = order(vec![item("10.00", 1)]);
        let first = Utc::now();
        order.capture_payment(serde_json::json!({"id": "PAY-1"}), first);

        let later = first + Duration::hours(1);
        let outcome = order.capture_payment(serde_json::json!({"id": "PAY-2"}), later);

        assert_eq!(outcome, PaymentCapture::AlreadyPaid);
        assert_eq!(order.paid_at, Some(first), "paid_at must not be re-stamped");
        assert_eq!(
            order.payment_result,
            Some(serde_json::json!({"id": "PAY-1"})),
            "original payment result must be kept"
        );
    }

    #[test]
    fn delivery_requires_payment() {
        let mut order = order(vec![item("10.00", 1)]);
        assert_eq!(order.mark_delivered(Utc::now()), Err(DeliveryError::NotPaid));
        assert!(!order.is_delivered);
        assert_eq!(order.delivered_at, None);
    }

    #[test]
    fn delivery_after_payment_then_idempotent() {
        let mut order = order(vec![item("10.00", 1)]);
        order.capture_payment(serde_json::json!({}), Utc::now());

        let first = Utc::now();
        assert_eq!(order.mark_delivered(first), Ok(DeliveryOutcome::Applied));
        assert!(order.is_delivered);

        let later = first + Duration::hours(2);
        assert_eq!(
            order.mark_delivered(later),
            Ok(DeliveryOutcome::AlreadyDelivered)
        );
        assert_eq!(
            order.delivered_at,
            Some(first),
            "delivered_at must not be re-stamped"
        );
    }
}
