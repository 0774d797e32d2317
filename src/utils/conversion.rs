//! Numeric conversion utilities.
//!
//! Raw on-chain integer amounts are converted to decimal token units with
//! `BigDecimal` so no precision is lost on the way into the pricing engine.

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::Signed;
use once_cell::sync::Lazy;

// ============================================
// Raw Amount Conversions
// ============================================

/// Convert a raw integer token amount to decimal units.
///
/// # Arguments
/// * `raw` - The raw on-chain amount (no decimal point applied)
/// * `decimals` - The token's decimal places
///
/// # Example
/// ```ignore
/// let raw = BigDecimal::from(1_500_000u64);
/// let amount = raw_to_decimal(&raw, 6); // 1.5
/// ```
pub fn raw_to_decimal(raw: &BigDecimal, decimals: u8) -> BigDecimal {
    if decimals == 0 {
        return raw.clone();
    }

    raw / big_pow10(decimals)
}

/// Check that a value is a valid raw on-chain amount: a non-negative integer.
///
/// Reserves and transfer amounts are unsigned integers on chain, so anything
/// else is malformed input.
pub fn is_raw_amount(raw: &BigDecimal) -> bool {
    raw.is_integer() && !raw.is_negative()
}

// ============================================
// Internal Helpers
// ============================================

static POW10_CACHE: Lazy<[BigDecimal; 25]> =
    Lazy::new(|| std::array::from_fn(|i| BigDecimal::from(BigInt::from(10u32).pow(i as u32))));

/// Compute 10^exp as BigDecimal.
pub(crate) fn big_pow10(exp: u8) -> BigDecimal {
    if (exp as usize) < POW10_CACHE.len() {
        POW10_CACHE[exp as usize].clone()
    } else {
        BigDecimal::from(BigInt::from(10u32).pow(exp as u32))
    }
}
