pub mod config;
pub mod db;
pub mod engine;
pub mod pricing;
pub mod utils;

pub use config::{PricingConfig, Settings};
pub use db::{EntityStore, MemoryStore, PairRegistry};
pub use engine::{EventHandler, EventOutcome, PoolEvent, Replay};
pub use pricing::{native_price_usd, PriceResolver, ValueTracker};
