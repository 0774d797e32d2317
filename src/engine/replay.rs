use std::{
    io::BufRead,
    time::{Duration, Instant},
};

use alloy::primitives::Address;
use anyhow::Context;
use bigdecimal::BigDecimal;
use log::{info, warn};
use serde::Serialize;

use crate::{
    db::{
        models::{Factory, Token},
        EntityStore, MemoryStore,
    },
    engine::{EventHandler, EventOutcome, PoolEvent},
};

/// Interval for logging progress updates (10 seconds)
const PROGRESS_LOG_INTERVAL: Duration = Duration::from_secs(10);

/// Counters for one replay run.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ReplayStats {
    pub events: u64,
    pub applied: u64,
    pub skipped: u64,
    pub failed: u64,
    pub last_block: u64,
}

/// Replays JSON-lines pair events through an [`EventHandler`].
///
/// Blank lines and lines starting with `#` are ignored. A line that cannot be
/// decoded aborts the replay; an event that fails to apply is logged and
/// counted, and the replay continues with the next one.
pub struct Replay {
    handler: EventHandler<MemoryStore>,
    stats: ReplayStats,
}

impl Replay {
    pub fn new(handler: EventHandler<MemoryStore>) -> Self {
        Self {
            handler,
            stats: ReplayStats::default(),
        }
    }

    pub fn run<R: BufRead>(&mut self, reader: R) -> anyhow::Result<&ReplayStats> {
        let mut last_progress_log = Instant::now();

        for (index, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("Failed to read line {}", index + 1))?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let event: PoolEvent = serde_json::from_str(trimmed)
                .with_context(|| format!("Invalid event on line {}", index + 1))?;
            self.apply(&event);

            if last_progress_log.elapsed() >= PROGRESS_LOG_INTERVAL {
                info!(
                    "Replayed {} events up to block {}",
                    self.stats.events, self.stats.last_block
                );
                last_progress_log = Instant::now();
            }
        }

        Ok(&self.stats)
    }

    fn apply(&mut self, event: &PoolEvent) {
        self.stats.events += 1;
        self.stats.last_block = self.stats.last_block.max(event.block_number());

        match self.handler.handle(event) {
            Ok(EventOutcome::Skipped { .. }) => self.stats.skipped += 1,
            Ok(_) => self.stats.applied += 1,
            Err(e) => {
                self.stats.failed += 1;
                warn!(
                    "Failed to apply {} for pair {}: {:#}",
                    event.event_type(),
                    event.pair(),
                    e
                );
            },
        }
    }

    /// Snapshot of the current prices and aggregates.
    pub fn summary(&self) -> Summary {
        let store = self.handler.store();
        let bundle = store.load_bundle().unwrap_or_default();

        let mut tokens: Vec<TokenSummary> = store
            .tokens()
            .map(|token| TokenSummary::new(token, &bundle.native_price_usd))
            .collect();
        // Stable output order
        tokens.sort_by(|a, b| a.address.cmp(&b.address));

        Summary {
            native_price_usd: bundle.native_price_usd.to_string(),
            pools: store.pool_count(),
            tokens,
            factory: store.load_factory().unwrap_or_default(),
            stats: self.stats.clone(),
        }
    }
}

/// Per-token line of the replay summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenSummary {
    pub address: Address,
    pub symbol: String,
    /// `None` when the token's price is unknown.
    pub derived_native: Option<String>,
    pub price_usd: Option<String>,
    pub trade_volume_usd: String,
}

impl TokenSummary {
    fn new(token: &Token, native_price_usd: &BigDecimal) -> Self {
        Self {
            address: token.address,
            symbol: token.symbol.clone(),
            derived_native: token.derived_native.as_ref().map(|d| d.normalized().to_string()),
            price_usd: token
                .derived_native
                .as_ref()
                .map(|d| (d * native_price_usd).normalized().to_string()),
            trade_volume_usd: token.trade_volume_usd.normalized().to_string(),
        }
    }
}

/// Replay output, printed as JSON by the binary.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub native_price_usd: String,
    pub pools: usize,
    pub tokens: Vec<TokenSummary>,
    pub factory: Factory,
    pub stats: ReplayStats,
}
