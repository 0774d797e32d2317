//! Utility functions for the pricing engine.
//!
//! - [`conversion`] - Raw on-chain amounts to decimal token units
//! - [`math`] - Zero-guarded decimal arithmetic

mod conversion;
mod math;

// ============================================
// Re-exports
// ============================================

pub use conversion::{is_raw_amount, raw_to_decimal};

pub use math::{div_or_zero, safe_div};
