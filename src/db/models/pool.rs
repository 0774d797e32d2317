use alloy::primitives::Address;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::{
    db::models::Token,
    utils::{raw_to_decimal, safe_div},
};

/// Which constituent slot of a pool a token occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolSide {
    Token0,
    Token1,
}

impl PoolSide {
    pub fn opposite(self) -> Self {
        match self {
            PoolSide::Token0 => PoolSide::Token1,
            PoolSide::Token1 => PoolSide::Token0,
        }
    }
}

/// Constant-product liquidity pool and its current state.
///
/// Primary Key: address
/// Query Pattern: "Get reserves and spot prices of pair X"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pool {
    // Primary key
    pub address: Address,

    // Token pair (ordered, fixed at creation)
    pub token0: Address,
    pub token1: Address,
    pub token0_decimals: u8,
    pub token1_decimals: u8,

    // Reserves in decimal token units
    pub reserve0: BigDecimal,
    pub reserve1: BigDecimal,

    // Spot prices (Uniswap V2 convention)
    // token0_price = token0 per token1 (reserve0 / reserve1)
    // token1_price = token1 per token0 (reserve1 / reserve0)
    // None whenever the divisor reserve is zero
    pub token0_price: Option<BigDecimal>,
    pub token1_price: Option<BigDecimal>,

    // Reserves re-expressed in native / USD units
    pub reserve_native: BigDecimal,
    pub reserve_usd: BigDecimal,
    pub tracked_reserve_native: BigDecimal,

    // Lifetime stats
    pub volume_token0: BigDecimal,
    pub volume_token1: BigDecimal,
    pub volume_usd: BigDecimal,
    pub untracked_volume_usd: BigDecimal,
    pub tx_count: u64,

    // Last update reference
    pub created_at_block: u64,
    pub block_number: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Pool {
    pub fn new(
        address: Address,
        token0: &Token,
        token1: &Token,
        block_number: u64,
        timestamp: u64,
    ) -> Self {
        Self {
            address,
            token0: token0.address,
            token1: token1.address,
            token0_decimals: token0.decimals,
            token1_decimals: token1.decimals,
            reserve0: BigDecimal::zero(),
            reserve1: BigDecimal::zero(),
            token0_price: None,
            token1_price: None,
            reserve_native: BigDecimal::zero(),
            reserve_usd: BigDecimal::zero(),
            tracked_reserve_native: BigDecimal::zero(),
            volume_token0: BigDecimal::zero(),
            volume_token1: BigDecimal::zero(),
            volume_usd: BigDecimal::zero(),
            untracked_volume_usd: BigDecimal::zero(),
            tx_count: 0,
            created_at_block: block_number,
            block_number,
            updated_at: DateTime::from_timestamp(timestamp as i64, 0),
        }
    }

    /// Which slot `token` occupies in this pool, if any.
    pub fn side_of(&self, token: &Address) -> Option<PoolSide> {
        if self.token0 == *token {
            Some(PoolSide::Token0)
        } else if self.token1 == *token {
            Some(PoolSide::Token1)
        } else {
            None
        }
    }

    pub fn token_at(&self, side: PoolSide) -> Address {
        match side {
            PoolSide::Token0 => self.token0,
            PoolSide::Token1 => self.token1,
        }
    }

    pub fn reserve_at(&self, side: PoolSide) -> &BigDecimal {
        match side {
            PoolSide::Token0 => &self.reserve0,
            PoolSide::Token1 => &self.reserve1,
        }
    }

    /// Spot price of the `side` token quoted in the opposite token.
    ///
    /// `price_at(Token0)` is `token0_price`: how much token0 one token1 buys.
    pub fn price_at(&self, side: PoolSide) -> Option<&BigDecimal> {
        match side {
            PoolSide::Token0 => self.token0_price.as_ref(),
            PoolSide::Token1 => self.token1_price.as_ref(),
        }
    }

    /// Set reserves in decimal units and recompute spot prices.
    pub fn set_reserves(&mut self, reserve0: BigDecimal, reserve1: BigDecimal) {
        self.token0_price = safe_div(&reserve0, &reserve1);
        self.token1_price = safe_div(&reserve1, &reserve0);
        self.reserve0 = reserve0;
        self.reserve1 = reserve1;
    }

    /// Update pool reserves from a Sync event carrying raw integer reserves.
    ///
    /// Stale events (older block than the last applied one) are ignored.
    /// Returns true if the reserves were updated.
    pub fn apply_sync(
        &mut self,
        raw_reserve0: &BigDecimal,
        raw_reserve1: &BigDecimal,
        block_number: u64,
        timestamp: u64,
    ) -> bool {
        if block_number < self.block_number {
            return false;
        }

        self.block_number = block_number;
        self.updated_at = DateTime::from_timestamp(timestamp as i64, 0);

        let reserve0 = raw_to_decimal(raw_reserve0, self.token0_decimals);
        let reserve1 = raw_to_decimal(raw_reserve1, self.token1_decimals);
        self.set_reserves(reserve0, reserve1);
        true
    }
}
