use std::str::FromStr;

use alloy::primitives::Address;
use anyhow::Context;
use bigdecimal::BigDecimal;
use config::{Config, ConfigError, File};
use log::LevelFilter;
use num_traits::Signed;
use serde::Deserialize;

use crate::db::models::PoolSide;

/// One stablecoin/native-asset pool used to anchor the native USD price.
///
/// `stable_side` names the slot holding the stablecoin; the opposite slot is
/// the native asset.
#[derive(Debug, Deserialize, Clone)]
pub struct AnchorPoolSettings {
    pub address: String,
    pub stable_side: PoolSide,
}

/// The three anchor pools.
///
/// `primary` and `secondary` are the two most liquid pools and are the only
/// ones used when the full set does not exist yet.
#[derive(Debug, Deserialize, Clone)]
pub struct AnchorPoolsSettings {
    pub primary: AnchorPoolSettings,
    pub secondary: AnchorPoolSettings,
    pub auxiliary: AnchorPoolSettings,
}

/// Price derivation configuration.
///
/// Fixed at deployment: changing the whitelist or the anchor pools changes
/// historical output.
#[derive(Debug, Deserialize, Clone)]
pub struct PricingSettings {
    pub native_token: String,
    /// Ordered: the first qualifying whitelist pairing wins.
    pub whitelist: Vec<String>,
    pub anchor_pools: AnchorPoolsSettings,
    /// Minimum pool reserve (native units) for a pool to be a price source.
    #[serde(default = "default_minimum_liquidity_threshold")]
    pub minimum_liquidity_threshold: String,
}

fn default_minimum_liquidity_threshold() -> String {
    "2".to_string()
}

/// Logger configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingSettings {
    pub fn level_filter(&self) -> anyhow::Result<LevelFilter> {
        LevelFilter::from_str(&self.level)
            .with_context(|| format!("Invalid log level '{}'", self.level))
    }
}

/// Root application configuration.
///
/// Loaded at startup from the file named on the command line (`config.yaml` by default).
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub pricing: PricingSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl Settings {
    /// Load settings from a file name (extension optional, as accepted by `config`).
    pub fn from_file(name: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(name))
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }
}

/// A resolved anchor pool.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorPool {
    pub address: Address,
    pub stable_side: PoolSide,
}

/// Ordered set of trusted price-anchor tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct Whitelist(Vec<Address>);

impl Whitelist {
    pub fn new(tokens: Vec<Address>) -> Self {
        Self(tokens)
    }

    pub fn contains(&self, token: &Address) -> bool {
        self.0.contains(token)
    }

    /// Tokens in configured order.
    pub fn iter(&self) -> impl Iterator<Item = &Address> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Immutable pricing configuration, built once from [`PricingSettings`] and
/// passed explicitly to the resolver, aggregator and trackers.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig {
    pub native_token: Address,
    pub whitelist: Whitelist,
    pub primary_anchor: AnchorPool,
    pub secondary_anchor: AnchorPool,
    pub auxiliary_anchor: AnchorPool,
    pub minimum_liquidity_threshold: BigDecimal,
}

impl PricingConfig {
    pub fn is_native(&self, token: &Address) -> bool {
        self.native_token == *token
    }

    pub fn is_whitelisted(&self, token: &Address) -> bool {
        self.whitelist.contains(token)
    }
}

fn parse_address(value: &str, field: &str) -> anyhow::Result<Address> {
    Address::from_str(value.trim()).with_context(|| format!("Invalid address for {field}: '{value}'"))
}

fn parse_anchor(settings: &AnchorPoolSettings, field: &str) -> anyhow::Result<AnchorPool> {
    Ok(AnchorPool {
        address: parse_address(&settings.address, field)?,
        stable_side: settings.stable_side,
    })
}

impl TryFrom<&PricingSettings> for PricingConfig {
    type Error = anyhow::Error;

    fn try_from(settings: &PricingSettings) -> anyhow::Result<Self> {
        let native_token = parse_address(&settings.native_token, "native_token")?;

        let mut whitelist = Vec::with_capacity(settings.whitelist.len());
        for (i, entry) in settings.whitelist.iter().enumerate() {
            let address = parse_address(entry, &format!("whitelist[{i}]"))?;
            if whitelist.contains(&address) {
                anyhow::bail!("Duplicate whitelist entry: {entry}");
            }
            whitelist.push(address);
        }

        let minimum_liquidity_threshold =
            BigDecimal::from_str(settings.minimum_liquidity_threshold.trim()).with_context(|| {
                format!(
                    "Invalid minimum_liquidity_threshold '{}'",
                    settings.minimum_liquidity_threshold
                )
            })?;
        if minimum_liquidity_threshold.is_negative() {
            anyhow::bail!("minimum_liquidity_threshold must not be negative");
        }

        Ok(Self {
            native_token,
            whitelist: Whitelist::new(whitelist),
            primary_anchor: parse_anchor(&settings.anchor_pools.primary, "anchor_pools.primary")?,
            secondary_anchor: parse_anchor(
                &settings.anchor_pools.secondary,
                "anchor_pools.secondary",
            )?,
            auxiliary_anchor: parse_anchor(
                &settings.anchor_pools.auxiliary,
                "anchor_pools.auxiliary",
            )?,
            minimum_liquidity_threshold,
        })
    }
}
