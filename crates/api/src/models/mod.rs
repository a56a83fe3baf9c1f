//! Domain types for the storefront API.
//!
//! These are validated domain objects, separate from database row types.
//! State transitions that must be correct (payment capture, delivery
//! marking, review aggregation) live here as pure methods so they can be
//! unit-tested without a database; the services layer loads a row, applies
//! the transition, and persists the result.

pub mod order;
pub mod product;
pub mod user;

pub use order::{
    DeliveryError, DeliveryOutcome, NewOrder, Order, OrderItem, OrderOwner, OrderTotals,
    PaymentCapture, ShippingAddress,
};
pub use product::{Product, ProductDraft, RATING_MAX, RATING_MIN, Review, aggregate_ratings};
pub use user::User;
