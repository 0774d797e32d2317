use bigdecimal::BigDecimal;
use log::debug;
use num_traits::Zero;

use crate::{
    config::{AnchorPool, PricingConfig},
    db::EntityStore,
    utils::safe_div,
};

/// Native-side reserve and stable-per-native price of one loaded anchor pool.
struct AnchorQuote {
    native_reserve: BigDecimal,
    stable_price: Option<BigDecimal>,
}

fn load_quote<S: EntityStore + ?Sized>(store: &S, anchor: &AnchorPool) -> Option<AnchorQuote> {
    let pool = store.load_pool(&anchor.address)?;

    // Stable-per-native: the price field named after the stable side.
    // Stable = token0 → token0_price = token0 per token1 = stable per native.
    Some(AnchorQuote {
        native_reserve: pool.reserve_at(anchor.stable_side.opposite()).clone(),
        stable_price: pool.price_at(anchor.stable_side).cloned(),
    })
}

/// Liquidity-weighted average of stable prices.
///
/// A pool with no native reserve has weight zero and is left out. Returns
/// `None` when the total native reserve is zero, so the caller falls through
/// to the next rule.
fn weighted_price(quotes: &[&AnchorQuote]) -> Option<BigDecimal> {
    let total = quotes
        .iter()
        .fold(BigDecimal::zero(), |acc, q| acc + &q.native_reserve);

    let mut price = BigDecimal::zero();
    for quote in quotes.iter().filter(|q| !q.native_reserve.is_zero()) {
        let weight = safe_div(&quote.native_reserve, &total)?;
        price += quote.stable_price.as_ref()? * weight;
    }
    Some(price)
}

/// Estimate the native asset's USD price from the three anchor pools.
///
/// Cascade:
/// 1. All three pools exist → weighted average over all three
/// 2. Primary and secondary exist → weighted average over those two
/// 3. Primary exists → its spot price
/// 4. Secondary exists → its spot price
/// 5. Otherwise → 0
///
/// A step whose arithmetic is degenerate (zero total reserve, undefined spot
/// price) is skipped in favour of the next one.
pub fn native_price_usd<S: EntityStore + ?Sized>(store: &S, config: &PricingConfig) -> BigDecimal {
    let primary = load_quote(store, &config.primary_anchor);
    let secondary = load_quote(store, &config.secondary_anchor);
    let auxiliary = load_quote(store, &config.auxiliary_anchor);

    if let (Some(p), Some(s), Some(a)) = (&primary, &secondary, &auxiliary) {
        if let Some(price) = weighted_price(&[p, s, a]) {
            return price;
        }
        debug!("Anchor pools hold no native liquidity, falling back to primary/secondary");
    }

    if let (Some(p), Some(s)) = (&primary, &secondary) {
        if let Some(price) = weighted_price(&[p, s]) {
            return price;
        }
    }

    if let Some(price) = primary.and_then(|p| p.stable_price) {
        return price;
    }

    if let Some(price) = secondary.and_then(|s| s.stable_price) {
        return price;
    }

    BigDecimal::zero()
}
