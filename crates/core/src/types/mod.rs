//! Newtype wrappers for domain values.
//!
//! These types exist so the rest of the workspace cannot confuse a
//! `UserId` with an `OrderId`, or a raw string with a validated email.

pub mod email;
pub mod id;
pub mod money;
pub mod role;

pub use email::{Email, EmailError};
pub use id::{OrderId, ProductId, ReviewId, UserId};
pub use money::round_currency;
pub use role::Role;
