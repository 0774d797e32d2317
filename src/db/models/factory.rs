use bigdecimal::BigDecimal;
use num_traits::Zero;

/// DEX-wide aggregate statistics (singleton).
///
/// Tracked values only count whitelisted liquidity and volume; untracked
/// volume counts every trade at its derived price.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Factory {
    pub pair_count: u64,
    pub tx_count: u64,

    pub total_volume_usd: BigDecimal,
    pub total_volume_native: BigDecimal,
    pub untracked_volume_usd: BigDecimal,

    pub total_liquidity_native: BigDecimal,
    pub total_liquidity_usd: BigDecimal,
}

impl Factory {
    pub fn new() -> Self {
        Self {
            pair_count: 0,
            tx_count: 0,
            total_volume_usd: BigDecimal::zero(),
            total_volume_native: BigDecimal::zero(),
            untracked_volume_usd: BigDecimal::zero(),
            total_liquidity_native: BigDecimal::zero(),
            total_liquidity_usd: BigDecimal::zero(),
        }
    }
}

impl Default for Factory {
    fn default() -> Self {
        Self::new()
    }
}
