use bigdecimal::BigDecimal;
use num_traits::Zero;

use crate::{
    config::PricingConfig,
    db::models::{Bundle, Token},
};

/// Whitelist membership of a token pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhitelistCoverage {
    Both,
    Token0Only,
    Token1Only,
    Neither,
}

impl WhitelistCoverage {
    pub fn classify(config: &PricingConfig, token0: &Token, token1: &Token) -> Self {
        match (
            config.is_whitelisted(&token0.address),
            config.is_whitelisted(&token1.address),
        ) {
            (true, true) => WhitelistCoverage::Both,
            (true, false) => WhitelistCoverage::Token0Only,
            (false, true) => WhitelistCoverage::Token1Only,
            (false, false) => WhitelistCoverage::Neither,
        }
    }
}

/// Decides how much of a trade or of a pool's liquidity counts toward USD aggregates.
///
/// Uses the Uniswap whitelist approach: only amounts of whitelisted tokens
/// are trusted, so scam tokens paired with each other never produce tracked
/// value.
pub struct ValueTracker<'a> {
    config: &'a PricingConfig,
    bundle: &'a Bundle,
}

impl<'a> ValueTracker<'a> {
    pub fn new(config: &'a PricingConfig, bundle: &'a Bundle) -> Self {
        Self { config, bundle }
    }

    /// USD value of `amount` units of `token`.
    fn value_usd(&self, amount: &BigDecimal, token: &Token) -> BigDecimal {
        amount * self.bundle.price_usd(token.derived_native.as_ref())
    }

    /// Tracked USD volume of a trade.
    ///
    /// - Both whitelisted → average of both sides
    /// - One whitelisted → full value of that side
    /// - Neither → 0
    pub fn tracked_volume_usd(
        &self,
        amount0: &BigDecimal,
        token0: &Token,
        amount1: &BigDecimal,
        token1: &Token,
    ) -> BigDecimal {
        match WhitelistCoverage::classify(self.config, token0, token1) {
            WhitelistCoverage::Both => {
                (self.value_usd(amount0, token0) + self.value_usd(amount1, token1))
                    / BigDecimal::from(2)
            },
            WhitelistCoverage::Token0Only => self.value_usd(amount0, token0),
            WhitelistCoverage::Token1Only => self.value_usd(amount1, token1),
            WhitelistCoverage::Neither => BigDecimal::zero(),
        }
    }

    /// Tracked USD liquidity of a pool snapshot.
    ///
    /// - Both whitelisted → sum of both sides
    /// - One whitelisted → double that side (the unpriced side is assumed equal)
    /// - Neither → 0
    pub fn tracked_liquidity_usd(
        &self,
        amount0: &BigDecimal,
        token0: &Token,
        amount1: &BigDecimal,
        token1: &Token,
    ) -> BigDecimal {
        match WhitelistCoverage::classify(self.config, token0, token1) {
            WhitelistCoverage::Both => {
                self.value_usd(amount0, token0) + self.value_usd(amount1, token1)
            },
            WhitelistCoverage::Token0Only => self.value_usd(amount0, token0) * BigDecimal::from(2),
            WhitelistCoverage::Token1Only => self.value_usd(amount1, token1) * BigDecimal::from(2),
            WhitelistCoverage::Neither => BigDecimal::zero(),
        }
    }
}
