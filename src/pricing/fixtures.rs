//! Store fixtures shared by the pricing and engine tests.

use std::str::FromStr;

use alloy::primitives::Address;
use bigdecimal::BigDecimal;
use num_traits::One;

use crate::{
    config::{AnchorPool, PricingConfig, Whitelist},
    db::{
        models::{Pool, PoolSide, Token},
        EntityStore, MemoryStore, PairRegistry,
    },
};

pub const NATIVE: Address = Address::repeat_byte(0x11);
pub const STABLE: Address = Address::repeat_byte(0x22);
pub const TOKEN_X: Address = Address::repeat_byte(0x51);
pub const TOKEN_Y: Address = Address::repeat_byte(0x52);

pub const PRIMARY_POOL: Address = Address::repeat_byte(0xa1);
pub const SECONDARY_POOL: Address = Address::repeat_byte(0xa2);
pub const AUXILIARY_POOL: Address = Address::repeat_byte(0xa3);
pub const POOL_X_NATIVE: Address = Address::repeat_byte(0xb1);
pub const POOL_X_STABLE: Address = Address::repeat_byte(0xb2);
pub const POOL_X_Y: Address = Address::repeat_byte(0xb3);

pub fn dec(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).unwrap()
}

/// Whitelist: native, stable (in that order). Threshold 2.
pub fn test_config() -> PricingConfig {
    PricingConfig {
        native_token: NATIVE,
        whitelist: Whitelist::new(vec![NATIVE, STABLE]),
        primary_anchor: AnchorPool {
            address: PRIMARY_POOL,
            stable_side: PoolSide::Token0,
        },
        secondary_anchor: AnchorPool {
            address: SECONDARY_POOL,
            stable_side: PoolSide::Token0,
        },
        auxiliary_anchor: AnchorPool {
            address: AUXILIARY_POOL,
            stable_side: PoolSide::Token1,
        },
        minimum_liquidity_threshold: BigDecimal::from(2),
    }
}

pub fn empty_fixture() -> (MemoryStore, PricingConfig) {
    (MemoryStore::new(), test_config())
}

/// Store holding the native token (priced at 1) plus unpriced stable, X and Y tokens.
pub fn whitelist_fixture() -> (MemoryStore, PricingConfig) {
    let (mut store, config) = empty_fixture();

    let mut native = Token::new(NATIVE, "WNATIVE".into(), "Wrapped Native".into(), 18);
    native.derived_native = Some(BigDecimal::one());
    store.save_token(native);
    store.save_token(Token::new(STABLE, "USD".into(), "Stable USD".into(), 18));
    store.save_token(Token::new(TOKEN_X, "X".into(), "Token X".into(), 18));
    store.save_token(Token::new(TOKEN_Y, "Y".into(), "Token Y".into(), 18));

    (store, config)
}

pub fn set_derived(store: &mut MemoryStore, token: Address, derived: &str) {
    let mut entity = store
        .load_token(&token)
        .unwrap_or_else(|| Token::new(token, "T".into(), "Token".into(), 18));
    entity.derived_native = Some(dec(derived));
    store.save_token(entity);
}

/// Register and store a pool with the given decimal reserves and native reserve.
pub fn add_pool(
    store: &mut MemoryStore,
    address: Address,
    token0: Address,
    token1: Address,
    reserve0: &str,
    reserve1: &str,
    reserve_native: &str,
) {
    let t0 = Token::new(token0, "T0".into(), "Token 0".into(), 18);
    let t1 = Token::new(token1, "T1".into(), "Token 1".into(), 18);
    let mut pool = Pool::new(address, &t0, &t1, 1, 0);
    pool.set_reserves(dec(reserve0), dec(reserve1));
    pool.reserve_native = dec(reserve_native);

    store.register_pair(token0, token1, address);
    store.save_pool(pool);
}

/// Store an anchor pool holding `stable` stablecoins against `native` native units.
pub fn add_anchor_pool(store: &mut MemoryStore, anchor: &AnchorPool, stable: &str, native: &str) {
    let (token0, token1, reserve0, reserve1) = match anchor.stable_side {
        PoolSide::Token0 => (STABLE, NATIVE, stable, native),
        PoolSide::Token1 => (NATIVE, STABLE, native, stable),
    };
    add_pool(store, anchor.address, token0, token1, reserve0, reserve1, native);
}
