//! Currency arithmetic helpers.
//!
//! Prices are plain [`rust_decimal::Decimal`] values in the store currency.
//! The one rule everything must agree on is rounding: two decimal places,
//! midpoint away from zero, applied when a value is *stored*, never midway
//! through a computation.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round a decimal amount to two-place currency precision.
///
/// The result always carries exactly two fractional digits, so `5` becomes
/// `5.00` and serializes the way a price should read.
#[must_use]
pub fn round_currency(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}
