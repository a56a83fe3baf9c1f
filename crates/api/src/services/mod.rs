//! Application services.
//!
//! Services own the domain rules; repositories own the SQL. Each service
//! borrows the pool, is constructed per-request, and returns its own error
//! type which the unified [`crate::error::AppError`] knows how to map to a
//! response.

pub mod auth;
pub mod orders;
pub mod reviews;

pub use auth::{AuthError, AuthService};
pub use orders::{OrderError, OrderService};
pub use reviews::{ReviewError, ReviewService};
