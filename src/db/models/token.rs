use alloy::primitives::Address;
use bigdecimal::BigDecimal;
use num_traits::Zero;

/// Token metadata and current derived price.
///
/// Primary Key: address
/// Query Pattern: "Get the native-asset price of token X"
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Token {
    // Primary key
    pub address: Address,

    // On-chain metadata (immutable after creation)
    pub symbol: String,
    pub name: String,
    pub decimals: u8,

    // Price in native-asset units.
    // None = never resolved, or resolved through an anchor whose own price was unknown.
    pub derived_native: Option<BigDecimal>,

    // Lifetime stats
    pub trade_volume: BigDecimal,
    pub trade_volume_usd: BigDecimal,
    pub untracked_volume_usd: BigDecimal,
    pub total_liquidity: BigDecimal,
    pub tx_count: u64,
}

impl Token {
    pub fn new(address: Address, symbol: String, name: String, decimals: u8) -> Self {
        Self {
            address,
            symbol,
            name,
            decimals,
            derived_native: None,
            trade_volume: BigDecimal::zero(),
            trade_volume_usd: BigDecimal::zero(),
            untracked_volume_usd: BigDecimal::zero(),
            total_liquidity: BigDecimal::zero(),
            tx_count: 0,
        }
    }

    /// Derived native price, counting an unknown price as zero value.
    ///
    /// Only for aggregate value math; price resolution must branch on
    /// `derived_native` directly so absence is not mistaken for a real zero.
    pub fn derived_native_or_zero(&self) -> BigDecimal {
        self.derived_native.clone().unwrap_or_else(BigDecimal::zero)
    }
}
