use std::{
    fs::File,
    io::{self, BufReader},
};

use anyhow::Context;
use jemallocator::Jemalloc;
use log::info;
use simple_logger::SimpleLogger;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use pricewalk::{EventHandler, MemoryStore, PricingConfig, Replay, Settings};

const USAGE: &str = "usage: pricewalk <events.jsonl | -> [config]";

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let events_path = args.next().context(USAGE)?;
    let config_name = args.next().unwrap_or_else(|| "config".to_string());

    // Load configuration
    let settings = Settings::from_file(&config_name).with_context(|| {
        format!("Failed to load {config_name}.yaml. Please ensure it exists and is valid")
    })?;

    SimpleLogger::new()
        .with_level(settings.logging.level_filter()?)
        .init()
        .context("Failed to initialise logger")?;

    let config = PricingConfig::try_from(&settings.pricing).context("Invalid pricing settings")?;
    info!(
        "Pricing config loaded: native {}, {} whitelisted tokens, liquidity threshold {}",
        config.native_token,
        config.whitelist.len(),
        config.minimum_liquidity_threshold
    );

    let mut replay = Replay::new(EventHandler::new(MemoryStore::new(), config));

    let stats = if events_path == "-" {
        replay.run(io::stdin().lock())?
    } else {
        let file = File::open(&events_path)
            .with_context(|| format!("Failed to open events file {events_path}"))?;
        replay.run(BufReader::new(file))?
    };

    info!(
        "Replay finished: {} events ({} applied, {} skipped, {} failed), last block {}",
        stats.events, stats.applied, stats.skipped, stats.failed, stats.last_block
    );

    let summary = replay.summary();
    info!("Native asset price: ${} USD", summary.native_price_usd);
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("Failed to encode summary")?
    );

    Ok(())
}
