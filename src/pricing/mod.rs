//! Price derivation and tracked-value engine.
//!
//! - [`anchor`] - Native asset USD price from the stablecoin anchor pools
//! - [`resolver`] - Token price in native units via the whitelist pool graph
//! - [`tracked`] - Whitelist rules for tracked volume and liquidity
//!
//! Everything here is a pure read of the store snapshot it is given; the
//! caller commits results before the next dependent computation runs.

mod anchor;
mod resolver;
mod tracked;

#[cfg(test)]
pub(crate) mod fixtures;

pub use anchor::native_price_usd;
pub use resolver::PriceResolver;
pub use tracked::{ValueTracker, WhitelistCoverage};
