use bigdecimal::BigDecimal;
use num_traits::Zero;

/// Global native-asset price anchor (singleton).
///
/// Holds the USD price of the native asset (WETH, WFTM, WBNB, ...) derived
/// from the configured stablecoin pools. Created once with a zero price and
/// overwritten in full every time the anchor aggregator runs.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Bundle {
    pub native_price_usd: BigDecimal,
}

impl Bundle {
    pub fn new() -> Self {
        Self {
            native_price_usd: BigDecimal::zero(),
        }
    }

    /// USD price of a token whose native-asset price is `derived_native`.
    ///
    /// An unknown derived price has no USD value.
    pub fn price_usd(&self, derived_native: Option<&BigDecimal>) -> BigDecimal {
        match derived_native {
            Some(derived) => derived * &self.native_price_usd,
            None => BigDecimal::zero(),
        }
    }
}

impl Default for Bundle {
    fn default() -> Self {
        Self::new()
    }
}
