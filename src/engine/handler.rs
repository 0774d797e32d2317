use alloy::primitives::Address;
use anyhow::{ensure, Context};
use bigdecimal::BigDecimal;
use log::{debug, info, warn};

use crate::{
    config::PricingConfig,
    db::{
        models::{Bundle, Pool, Token},
        EntityStore, PairRegistry,
    },
    engine::events::{PoolEvent, TokenInfo},
    pricing::{native_price_usd, PriceResolver, ValueTracker},
    utils::{div_or_zero, is_raw_amount, raw_to_decimal},
};

/// Result of applying one event, for logging and inspection.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    PairCreated {
        pair: Address,
    },
    Synced {
        pair: Address,
        native_price_usd: BigDecimal,
        token0_derived_native: Option<BigDecimal>,
        token1_derived_native: Option<BigDecimal>,
        tracked_reserve_native: BigDecimal,
    },
    Swapped {
        pair: Address,
        tracked_volume_usd: BigDecimal,
        untracked_volume_usd: BigDecimal,
    },
    LiquidityChanged {
        pair: Address,
        amount_usd: BigDecimal,
    },
    Skipped {
        pair: Address,
        reason: &'static str,
    },
}

/// Applies pair events to the store and keeps prices and aggregates current.
///
/// On every Sync the order is fixed: pool reserves, then the anchor price
/// (committed), then both tokens' derived prices (committed), then tracked
/// liquidity and aggregates. Swaps and liquidity events read the prices
/// committed by the latest Sync.
pub struct EventHandler<S> {
    store: S,
    config: PricingConfig,
}

impl<S> EventHandler<S>
where
    S: EntityStore + PairRegistry,
{
    /// Create the handler, initialising the anchor record and the DEX-wide aggregates.
    pub fn new(mut store: S, config: PricingConfig) -> Self {
        store.load_or_create_bundle();
        store.load_or_create_factory();
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Apply one event.
    ///
    /// Events for unknown pairs, duplicate creations and stale syncs are
    /// skipped. Malformed amounts and pools whose tokens are missing from the
    /// store are errors, and leave the store untouched.
    pub fn handle(&mut self, event: &PoolEvent) -> anyhow::Result<EventOutcome> {
        for (field, value) in event.raw_amounts() {
            ensure!(
                is_raw_amount(value),
                "Invalid {} {} in {} for pair {}: expected a non-negative integer",
                field,
                value,
                event.event_type(),
                event.pair()
            );
        }

        match event {
            PoolEvent::PairCreated {
                pair,
                token0,
                token1,
                block_number,
                timestamp,
            } => Ok(self.handle_pair_created(*pair, token0, token1, *block_number, *timestamp)),
            PoolEvent::Sync {
                pair,
                reserve0,
                reserve1,
                block_number,
                timestamp,
            } => self.handle_sync(*pair, reserve0, reserve1, *block_number, *timestamp),
            PoolEvent::Swap {
                pair,
                amount0_in,
                amount1_in,
                amount0_out,
                amount1_out,
                ..
            } => {
                let amount0 = amount0_in + amount0_out;
                let amount1 = amount1_in + amount1_out;
                self.handle_swap(*pair, &amount0, &amount1)
            },
            PoolEvent::Mint {
                pair,
                amount0,
                amount1,
                ..
            }
            | PoolEvent::Burn {
                pair,
                amount0,
                amount1,
                ..
            } => self.handle_liquidity(*pair, amount0, amount1),
        }
    }

    fn get_or_create_token(&mut self, info: &TokenInfo) -> Token {
        match self.store.load_token(&info.address) {
            Some(token) => token,
            None => {
                let token = Token::new(
                    info.address,
                    info.symbol.clone(),
                    info.name.clone(),
                    info.decimals,
                );
                self.store.save_token(token.clone());
                token
            },
        }
    }

    fn handle_pair_created(
        &mut self,
        pair: Address,
        token0: &TokenInfo,
        token1: &TokenInfo,
        block_number: u64,
        timestamp: u64,
    ) -> EventOutcome {
        if self.store.load_pool(&pair).is_some() {
            warn!("Pair {pair} created twice, ignoring");
            return EventOutcome::Skipped {
                pair,
                reason: "pair already exists",
            };
        }

        let t0 = self.get_or_create_token(token0);
        let t1 = self.get_or_create_token(token1);

        self.store.register_pair(t0.address, t1.address, pair);
        self.store
            .save_pool(Pool::new(pair, &t0, &t1, block_number, timestamp));

        let mut factory = self.store.load_or_create_factory();
        factory.pair_count += 1;
        self.store.save_factory(factory);

        info!(
            "New pair {} ({}/{}) at block {}",
            pair, t0.symbol, t1.symbol, block_number
        );

        EventOutcome::PairCreated { pair }
    }

    /// Load both constituent tokens of a stored pool.
    fn load_pair_tokens(&self, pool: &Pool) -> anyhow::Result<(Token, Token)> {
        let token0 = self
            .store
            .load_token(&pool.token0)
            .with_context(|| format!("Token0 {} of pair {} not stored", pool.token0, pool.address))?;
        let token1 = self
            .store
            .load_token(&pool.token1)
            .with_context(|| format!("Token1 {} of pair {} not stored", pool.token1, pool.address))?;
        Ok((token0, token1))
    }

    fn handle_sync(
        &mut self,
        pair: Address,
        raw_reserve0: &BigDecimal,
        raw_reserve1: &BigDecimal,
        block_number: u64,
        timestamp: u64,
    ) -> anyhow::Result<EventOutcome> {
        let Some(mut pool) = self.store.load_pool(&pair) else {
            warn!("Sync for unknown pair {pair}, skipping");
            return Ok(EventOutcome::Skipped {
                pair,
                reason: "unknown pair",
            });
        };
        let (mut token0, mut token1) = self.load_pair_tokens(&pool)?;
        let mut factory = self.store.load_or_create_factory();

        let old_tracked_reserve = pool.tracked_reserve_native.clone();
        let old_reserve0 = pool.reserve0.clone();
        let old_reserve1 = pool.reserve1.clone();

        if !pool.apply_sync(raw_reserve0, raw_reserve1, block_number, timestamp) {
            debug!("Stale sync for pair {pair} at block {block_number}, skipping");
            return Ok(EventOutcome::Skipped {
                pair,
                reason: "stale block",
            });
        }

        // Remove the pool's previous contribution; re-added below from the new state
        factory.total_liquidity_native -= &old_tracked_reserve;
        token0.total_liquidity -= &old_reserve0;
        token1.total_liquidity -= &old_reserve1;

        self.store.save_pool(pool.clone());

        // Anchor price first: token prices and tracked values read it
        let bundle = Bundle {
            native_price_usd: native_price_usd(&self.store, &self.config),
        };
        self.store.save_bundle(bundle.clone());

        // Both tokens resolve against the same snapshot
        let resolver = PriceResolver::new(&self.store, &self.config);
        token0.derived_native = resolver.resolve_native_price(&token0.address);
        token1.derived_native = resolver.resolve_native_price(&token1.address);
        self.store.save_token(token0.clone());
        self.store.save_token(token1.clone());

        let tracker = ValueTracker::new(&self.config, &bundle);
        let tracked_liquidity_usd =
            tracker.tracked_liquidity_usd(&pool.reserve0, &token0, &pool.reserve1, &token1);
        let tracked_reserve_native = div_or_zero(&tracked_liquidity_usd, &bundle.native_price_usd);

        pool.tracked_reserve_native = tracked_reserve_native.clone();
        pool.reserve_native = &pool.reserve0 * token0.derived_native_or_zero()
            + &pool.reserve1 * token1.derived_native_or_zero();
        pool.reserve_usd = &pool.reserve_native * &bundle.native_price_usd;

        factory.total_liquidity_native += &tracked_reserve_native;
        factory.total_liquidity_usd = &factory.total_liquidity_native * &bundle.native_price_usd;

        token0.total_liquidity += &pool.reserve0;
        token1.total_liquidity += &pool.reserve1;

        debug!(
            "Sync {}: native ${} | {} = {:?} | {} = {:?}",
            pair,
            bundle.native_price_usd,
            token0.symbol,
            token0.derived_native,
            token1.symbol,
            token1.derived_native
        );

        let outcome = EventOutcome::Synced {
            pair,
            native_price_usd: bundle.native_price_usd,
            token0_derived_native: token0.derived_native.clone(),
            token1_derived_native: token1.derived_native.clone(),
            tracked_reserve_native,
        };

        self.store.save_pool(pool);
        self.store.save_token(token0);
        self.store.save_token(token1);
        self.store.save_factory(factory);

        Ok(outcome)
    }

    fn handle_swap(
        &mut self,
        pair: Address,
        raw_amount0: &BigDecimal,
        raw_amount1: &BigDecimal,
    ) -> anyhow::Result<EventOutcome> {
        let Some(mut pool) = self.store.load_pool(&pair) else {
            warn!("Swap for unknown pair {pair}, skipping");
            return Ok(EventOutcome::Skipped {
                pair,
                reason: "unknown pair",
            });
        };
        let (mut token0, mut token1) = self.load_pair_tokens(&pool)?;
        let mut factory = self.store.load_or_create_factory();
        let bundle = self.store.load_or_create_bundle();

        let amount0 = raw_to_decimal(raw_amount0, token0.decimals);
        let amount1 = raw_to_decimal(raw_amount1, token1.decimals);

        // Untracked: average of both sides at derived prices, whitelist or not
        let derived_amount_native = (&amount0 * token0.derived_native_or_zero()
            + &amount1 * token1.derived_native_or_zero())
            / BigDecimal::from(2);
        let untracked_volume_usd = &derived_amount_native * &bundle.native_price_usd;

        let tracker = ValueTracker::new(&self.config, &bundle);
        let tracked_volume_usd = tracker.tracked_volume_usd(&amount0, &token0, &amount1, &token1);
        let tracked_volume_native = div_or_zero(&tracked_volume_usd, &bundle.native_price_usd);

        token0.trade_volume += &amount0;
        token0.trade_volume_usd += &tracked_volume_usd;
        token0.untracked_volume_usd += &untracked_volume_usd;
        token0.tx_count += 1;

        token1.trade_volume += &amount1;
        token1.trade_volume_usd += &tracked_volume_usd;
        token1.untracked_volume_usd += &untracked_volume_usd;
        token1.tx_count += 1;

        pool.volume_token0 += &amount0;
        pool.volume_token1 += &amount1;
        pool.volume_usd += &tracked_volume_usd;
        pool.untracked_volume_usd += &untracked_volume_usd;
        pool.tx_count += 1;

        factory.total_volume_usd += &tracked_volume_usd;
        factory.total_volume_native += &tracked_volume_native;
        factory.untracked_volume_usd += &untracked_volume_usd;
        factory.tx_count += 1;

        self.store.save_pool(pool);
        self.store.save_token(token0);
        self.store.save_token(token1);
        self.store.save_factory(factory);

        Ok(EventOutcome::Swapped {
            pair,
            tracked_volume_usd,
            untracked_volume_usd,
        })
    }

    fn handle_liquidity(
        &mut self,
        pair: Address,
        raw_amount0: &BigDecimal,
        raw_amount1: &BigDecimal,
    ) -> anyhow::Result<EventOutcome> {
        let Some(mut pool) = self.store.load_pool(&pair) else {
            warn!("Liquidity event for unknown pair {pair}, skipping");
            return Ok(EventOutcome::Skipped {
                pair,
                reason: "unknown pair",
            });
        };
        let (mut token0, mut token1) = self.load_pair_tokens(&pool)?;
        let mut factory = self.store.load_or_create_factory();
        let bundle = self.store.load_or_create_bundle();

        let amount0 = raw_to_decimal(raw_amount0, token0.decimals);
        let amount1 = raw_to_decimal(raw_amount1, token1.decimals);

        let amount_usd = (&amount0 * token0.derived_native_or_zero()
            + &amount1 * token1.derived_native_or_zero())
            * &bundle.native_price_usd;

        token0.tx_count += 1;
        token1.tx_count += 1;
        pool.tx_count += 1;
        factory.tx_count += 1;

        self.store.save_pool(pool);
        self.store.save_token(token0);
        self.store.save_token(token1);
        self.store.save_factory(factory);

        Ok(EventOutcome::LiquidityChanged { pair, amount_usd })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::MemoryStore, pricing::fixtures::*};
    use num_traits::{One, Zero};

    /// Whole-token amount as a raw 18-decimal integer.
    fn raw(units: &str) -> BigDecimal {
        dec(units) * dec("1000000000000000000")
    }

    fn info(address: Address, symbol: &str) -> TokenInfo {
        TokenInfo {
            address,
            symbol: symbol.to_string(),
            name: String::new(),
            decimals: 18,
        }
    }

    fn created(pair: Address, token0: TokenInfo, token1: TokenInfo) -> PoolEvent {
        PoolEvent::PairCreated {
            pair,
            token0,
            token1,
            block_number: 1,
            timestamp: 1_700_000_000,
        }
    }

    fn sync(pair: Address, reserve0: &str, reserve1: &str, block_number: u64) -> PoolEvent {
        PoolEvent::Sync {
            pair,
            reserve0: raw(reserve0),
            reserve1: raw(reserve1),
            block_number,
            timestamp: 1_700_000_000 + block_number,
        }
    }

    /// Native priced at 2 USD through the primary anchor, X priced at 0.5 native.
    fn priced_handler() -> EventHandler<MemoryStore> {
        let mut handler = EventHandler::new(MemoryStore::new(), test_config());

        handler
            .handle(&created(PRIMARY_POOL, info(STABLE, "USD"), info(NATIVE, "WNATIVE")))
            .unwrap();
        handler.handle(&sync(PRIMARY_POOL, "2000", "1000", 2)).unwrap();
        handler.handle(&sync(PRIMARY_POOL, "2000", "1000", 3)).unwrap();

        handler
            .handle(&created(POOL_X_NATIVE, info(TOKEN_X, "X"), info(NATIVE, "WNATIVE")))
            .unwrap();
        handler.handle(&sync(POOL_X_NATIVE, "200", "100", 4)).unwrap();
        handler.handle(&sync(POOL_X_NATIVE, "200", "100", 5)).unwrap();

        handler
    }

    #[test]
    fn test_new_handler_initialises_singletons() {
        let handler = EventHandler::new(MemoryStore::new(), test_config());
        assert_eq!(handler.store().load_bundle().unwrap().native_price_usd, BigDecimal::zero());
        assert_eq!(handler.store().load_factory().unwrap().pair_count, 0);
    }

    #[test]
    fn test_pair_created_registers_pair_and_tokens() {
        let mut handler = EventHandler::new(MemoryStore::new(), test_config());
        let outcome = handler
            .handle(&created(POOL_X_NATIVE, info(TOKEN_X, "X"), info(NATIVE, "WNATIVE")))
            .unwrap();

        assert_eq!(outcome, EventOutcome::PairCreated { pair: POOL_X_NATIVE });
        let store = handler.store();
        assert_eq!(store.get_pair(&NATIVE, &TOKEN_X), POOL_X_NATIVE);
        assert!(store.load_token(&TOKEN_X).unwrap().derived_native.is_none());
        assert_eq!(store.load_factory().unwrap().pair_count, 1);
    }

    #[test]
    fn test_duplicate_pair_created_is_skipped() {
        let mut handler = EventHandler::new(MemoryStore::new(), test_config());
        let event = created(POOL_X_NATIVE, info(TOKEN_X, "X"), info(NATIVE, "WNATIVE"));
        handler.handle(&event).unwrap();

        let outcome = handler.handle(&event).unwrap();
        assert!(matches!(outcome, EventOutcome::Skipped { .. }));
        assert_eq!(handler.store().load_factory().unwrap().pair_count, 1);
    }

    #[test]
    fn test_first_sync_prices_anchor_and_native() {
        let mut handler = EventHandler::new(MemoryStore::new(), test_config());
        handler
            .handle(&created(PRIMARY_POOL, info(STABLE, "USD"), info(NATIVE, "WNATIVE")))
            .unwrap();

        let outcome = handler.handle(&sync(PRIMARY_POOL, "2000", "1000", 2)).unwrap();
        let EventOutcome::Synced {
            native_price_usd,
            token0_derived_native,
            token1_derived_native,
            tracked_reserve_native,
            ..
        } = outcome
        else {
            panic!("unexpected outcome");
        };

        assert_eq!(native_price_usd, dec("2"));
        // Pool had no native reserve before this sync, so the stablecoin is not priced yet
        assert_eq!(token0_derived_native, Some(BigDecimal::zero()));
        assert_eq!(token1_derived_native, Some(BigDecimal::one()));
        // Both whitelisted: 0 + 1000 native × 2 USD = 2000 USD = 1000 native
        assert_eq!(tracked_reserve_native, dec("1000"));
    }

    #[test]
    fn test_second_sync_prices_stablecoin() {
        let handler = priced_handler();
        let store = handler.store();

        assert_eq!(store.load_bundle().unwrap().native_price_usd, dec("2"));
        assert_eq!(store.load_token(&STABLE).unwrap().derived_native, Some(dec("0.5")));
        assert_eq!(store.load_token(&TOKEN_X).unwrap().derived_native, Some(dec("0.5")));

        let anchor = store.load_pool(&PRIMARY_POOL).unwrap();
        assert_eq!(anchor.reserve_native, dec("2000"));
        assert_eq!(anchor.reserve_usd, dec("4000"));
        assert_eq!(anchor.tracked_reserve_native, dec("2000"));
    }

    #[test]
    fn test_sync_keeps_factory_liquidity_consistent() {
        let handler = priced_handler();
        let store = handler.store();

        // Anchor: 2000 native tracked; X pool: only native side → 100 × 2 = 200 native
        let factory = store.load_factory().unwrap();
        assert_eq!(factory.total_liquidity_native, dec("2200"));
        assert_eq!(factory.total_liquidity_usd, dec("4400"));
        assert_eq!(factory.pair_count, 2);

        let x_pool = store.load_pool(&POOL_X_NATIVE).unwrap();
        assert_eq!(x_pool.tracked_reserve_native, dec("200"));
        assert_eq!(x_pool.reserve_native, dec("200"));

        // Native liquidity counted once per pool, not per sync
        assert_eq!(store.load_token(&NATIVE).unwrap().total_liquidity, dec("1100"));
    }

    #[test]
    fn test_swap_updates_tracked_and_untracked_volume() {
        let mut handler = priced_handler();
        let outcome = handler
            .handle(&PoolEvent::Swap {
                pair: POOL_X_NATIVE,
                amount0_in: raw("10"),
                amount1_in: BigDecimal::zero(),
                amount0_out: BigDecimal::zero(),
                amount1_out: raw("5"),
                block_number: 6,
                timestamp: 0,
            })
            .unwrap();

        // Only native is whitelisted: 5 native × 2 USD
        // Untracked: (10 × 0.5 + 5 × 1) / 2 × 2 USD
        assert_eq!(
            outcome,
            EventOutcome::Swapped {
                pair: POOL_X_NATIVE,
                tracked_volume_usd: dec("10"),
                untracked_volume_usd: dec("10"),
            }
        );

        let store = handler.store();
        let pool = store.load_pool(&POOL_X_NATIVE).unwrap();
        assert_eq!(pool.volume_token0, dec("10"));
        assert_eq!(pool.volume_token1, dec("5"));
        assert_eq!(pool.volume_usd, dec("10"));
        assert_eq!(pool.tx_count, 1);

        let factory = store.load_factory().unwrap();
        assert_eq!(factory.total_volume_usd, dec("10"));
        assert_eq!(factory.total_volume_native, dec("5"));
        assert_eq!(factory.tx_count, 1);

        let x = store.load_token(&TOKEN_X).unwrap();
        assert_eq!(x.trade_volume, dec("10"));
        assert_eq!(x.trade_volume_usd, dec("10"));
    }

    #[test]
    fn test_swap_between_unlisted_tokens_is_untracked() {
        let mut handler = priced_handler();
        handler
            .handle(&created(POOL_X_Y, info(TOKEN_X, "X"), info(TOKEN_Y, "Y")))
            .unwrap();
        handler.handle(&sync(POOL_X_Y, "10", "10", 6)).unwrap();

        let outcome = handler
            .handle(&PoolEvent::Swap {
                pair: POOL_X_Y,
                amount0_in: raw("4"),
                amount1_in: BigDecimal::zero(),
                amount0_out: BigDecimal::zero(),
                amount1_out: raw("4"),
                block_number: 7,
                timestamp: 0,
            })
            .unwrap();

        let EventOutcome::Swapped {
            tracked_volume_usd,
            untracked_volume_usd,
            ..
        } = outcome
        else {
            panic!("unexpected outcome");
        };
        assert_eq!(tracked_volume_usd, BigDecimal::zero());
        // Y has no whitelist pairing, so it resolves to 0: (4 × 0.5 + 0) / 2 × 2 USD
        assert_eq!(untracked_volume_usd, dec("2"));
    }

    #[test]
    fn test_mint_values_both_sides() {
        let mut handler = priced_handler();
        let outcome = handler
            .handle(&PoolEvent::Mint {
                pair: POOL_X_NATIVE,
                amount0: raw("2"),
                amount1: raw("1"),
                block_number: 6,
                timestamp: 0,
            })
            .unwrap();

        assert_eq!(
            outcome,
            EventOutcome::LiquidityChanged {
                pair: POOL_X_NATIVE,
                amount_usd: dec("4"),
            }
        );
        assert_eq!(handler.store().load_pool(&POOL_X_NATIVE).unwrap().tx_count, 1);
    }

    #[test]
    fn test_events_for_unknown_pair_are_skipped() {
        let mut handler = EventHandler::new(MemoryStore::new(), test_config());
        let outcome = handler.handle(&sync(POOL_X_NATIVE, "1", "1", 1)).unwrap();
        assert!(matches!(outcome, EventOutcome::Skipped { .. }));

        let outcome = handler
            .handle(&PoolEvent::Burn {
                pair: POOL_X_NATIVE,
                amount0: raw("1"),
                amount1: raw("1"),
                block_number: 1,
                timestamp: 0,
            })
            .unwrap();
        assert!(matches!(outcome, EventOutcome::Skipped { .. }));
    }

    #[test]
    fn test_stale_sync_is_skipped() {
        let mut handler = priced_handler();
        let outcome = handler.handle(&sync(POOL_X_NATIVE, "1", "1", 4)).unwrap();
        assert!(matches!(outcome, EventOutcome::Skipped { .. }));
        assert_eq!(handler.store().load_pool(&POOL_X_NATIVE).unwrap().reserve0, dec("200"));
    }

    #[test]
    fn test_negative_reserve_is_rejected() {
        let mut handler = priced_handler();
        let event = PoolEvent::Sync {
            pair: POOL_X_NATIVE,
            reserve0: -raw("100"),
            reserve1: raw("300"),
            block_number: 6,
            timestamp: 0,
        };

        assert!(handler.handle(&event).is_err());

        let store = handler.store();
        assert_eq!(store.load_token(&TOKEN_X).unwrap().derived_native, Some(dec("0.5")));
        let pool = store.load_pool(&POOL_X_NATIVE).unwrap();
        assert_eq!(pool.reserve0, dec("200"));
        assert_eq!(pool.block_number, 5);
    }

    #[test]
    fn test_fractional_or_negative_amounts_are_rejected() {
        let mut handler = priced_handler();
        let swap = PoolEvent::Swap {
            pair: POOL_X_NATIVE,
            amount0_in: dec("1.5"),
            amount1_in: BigDecimal::zero(),
            amount0_out: BigDecimal::zero(),
            amount1_out: raw("1"),
            block_number: 6,
            timestamp: 0,
        };
        assert!(handler.handle(&swap).is_err());

        let burn = PoolEvent::Burn {
            pair: POOL_X_NATIVE,
            amount0: raw("1"),
            amount1: -raw("1"),
            block_number: 6,
            timestamp: 0,
        };
        assert!(handler.handle(&burn).is_err());

        let store = handler.store();
        assert_eq!(store.load_pool(&POOL_X_NATIVE).unwrap().tx_count, 0);
        assert_eq!(store.load_factory().unwrap().tx_count, 0);
    }

    #[test]
    fn test_pool_without_stored_tokens_is_an_error() {
        let (mut store, config) = empty_fixture();
        add_pool(&mut store, POOL_X_NATIVE, TOKEN_X, NATIVE, "20", "10", "10");
        let mut handler = EventHandler::new(store, config);

        assert!(handler.handle(&sync(POOL_X_NATIVE, "1", "1", 2)).is_err());
    }
}
