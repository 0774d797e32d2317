use alloy::primitives::Address;
use bigdecimal::BigDecimal;
use log::debug;
use num_traits::{One, Zero};

use crate::{
    config::PricingConfig,
    db::{EntityStore, PairRegistry},
};

/// Resolves a token's price in native-asset units from the pool graph.
///
/// Walks the whitelist in configured order and prices the token through the
/// first pairing with enough native liquidity (one hop):
/// 1. Native asset → 1
/// 2. First whitelist pool with `reserve_native > threshold` → spot price × anchor's derived price
/// 3. Nothing qualifies → 0
///
/// The search is greedy and order-biased on purpose: the first qualifying
/// pool wins, not the deepest one. Reading from the store on every call keeps
/// results identical for identical snapshots.
pub struct PriceResolver<'a, S: ?Sized> {
    store: &'a S,
    config: &'a PricingConfig,
}

impl<'a, S> PriceResolver<'a, S>
where
    S: EntityStore + PairRegistry + ?Sized,
{
    pub fn new(store: &'a S, config: &'a PricingConfig) -> Self {
        Self { store, config }
    }

    /// Native-asset price of `token`.
    ///
    /// Returns `None` when the first qualifying pool prices the token through
    /// an anchor whose own derived price is unknown. The search does not move
    /// on to the next whitelist entry in that case.
    pub fn resolve_native_price(&self, token: &Address) -> Option<BigDecimal> {
        if self.config.is_native(token) {
            return Some(BigDecimal::one());
        }

        for candidate in self.config.whitelist.iter() {
            let Some(pair_address) = self.store.find_pair(token, candidate) else {
                continue;
            };

            // Registry knows the pair but the entity is not stored yet
            let Some(pool) = self.store.load_pool(&pair_address) else {
                debug!("Pair {pair_address} registered but not stored, skipping");
                continue;
            };

            let Some(side) = pool.side_of(token) else {
                continue;
            };

            if pool.reserve_native <= self.config.minimum_liquidity_threshold {
                debug!(
                    "Pair {} below liquidity threshold ({} native), skipping",
                    pair_address, pool.reserve_native
                );
                continue;
            }

            // Token in slot 0 → token1_price (token1 per token0) × token1's native price
            let other_side = side.opposite();
            let Some(rate) = pool.price_at(other_side) else {
                continue;
            };

            let other = pool.token_at(other_side);
            let Some(other_derived) = self
                .store
                .load_token(&other)
                .and_then(|t| t.derived_native)
            else {
                debug!("Anchor {other} has no derived price, {token} stays unresolved");
                return None;
            };

            return Some(rate * other_derived);
        }

        Some(BigDecimal::zero())
    }
}
