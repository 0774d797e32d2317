//! Guarded decimal arithmetic.
//!
//! Every division in the pricing engine goes through [`safe_div`] so a drained
//! reserve or a zero anchor price never reaches persisted state as a domain
//! error.

use bigdecimal::BigDecimal;
use num_traits::Zero;

/// Divide `numerator` by `denominator`, returning `None` when the denominator is zero.
#[inline]
pub fn safe_div(numerator: &BigDecimal, denominator: &BigDecimal) -> Option<BigDecimal> {
    if denominator.is_zero() {
        None
    } else {
        Some(numerator / denominator)
    }
}

/// Divide, falling back to zero when the denominator is zero.
#[inline]
pub fn div_or_zero(numerator: &BigDecimal, denominator: &BigDecimal) -> BigDecimal {
    safe_div(numerator, denominator).unwrap_or_else(BigDecimal::zero)
}
