#[allow(clippy::module_inception)]
mod config;

pub use config::{
    AnchorPool, AnchorPoolSettings, AnchorPoolsSettings, LoggingSettings, PricingConfig,
    PricingSettings, Settings, Whitelist,
};
