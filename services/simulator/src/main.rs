//! Console load harness for the exchange core.
//!
//! Spawns a configurable number of worker threads that hammer a shared
//! registry with instrument creation, trade appends and metric reads, then
//! prints the all-instruments status dump, the closing all-share index and
//! the elapsed time. Everything here is driver scaffolding; the invariants
//! live in `market-state`.

mod config;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use rand::Rng;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use config::SimulatorConfig;
use exchange_types::time::now_ns;
use market_state::{InstrumentClass, InstrumentRegistry, TradeSide};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = SimulatorConfig::from_env().context("failed to load simulator config")?;
    config.validate().context("invalid simulator config")?;

    info!(
        workers = config.workers,
        trades_per_worker = config.trades_per_worker,
        symbols = config.symbols.len(),
        "starting exchange simulator"
    );

    let registry = Arc::new(InstrumentRegistry::new());
    let started = Instant::now();

    let mut handles = Vec::with_capacity(config.workers);
    for worker_id in 0..config.workers {
        let registry = Arc::clone(&registry);
        let config = config.clone();
        handles.push(thread::spawn(move || {
            run_worker(worker_id, &config, &registry);
        }));
    }
    for handle in handles {
        if handle.join().is_err() {
            warn!("worker panicked");
        }
    }

    display_market_status(&registry);

    match registry.all_share_index(now_ns()) {
        Ok(index) => info!(%index, "closing all-share index"),
        Err(error) => info!(%error, "no closing all-share index"),
    }

    info!(
        workers = config.workers,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "simulation finished"
    );
    Ok(())
}

/// One worker's life: stagger, pick a symbol, try to list it, then trade it
/// and read its metrics. Every failure is reported and survived; workers
/// racing to create the same symbol is the point of the exercise.
fn run_worker(worker_id: usize, config: &SimulatorConfig, registry: &InstrumentRegistry) {
    let mut rng = rand::thread_rng();

    thread::sleep(Duration::from_millis(
        rng.gen_range(0..=config.max_start_jitter_ms),
    ));

    let symbol = &config.symbols[rng.gen_range(0..config.symbols.len())];

    let last_dividend = Decimal::from(rng.gen_range(0..config.max_dividend));
    let par_value = Decimal::from(rng.gen_range(0..config.max_par_value));
    match registry.add(
        symbol,
        InstrumentClass::Common,
        last_dividend,
        Decimal::ZERO,
        par_value,
    ) {
        Ok(_) => info!(worker_id, %symbol, %par_value, "listed instrument"),
        Err(error) => debug!(worker_id, %symbol, %error, "instrument not listed"),
    }

    // Whoever won the creation race, the instrument exists now.
    let instrument = match registry.get(symbol) {
        Ok(instrument) => instrument,
        Err(error) => {
            warn!(worker_id, %symbol, %error, "lookup failed");
            return;
        }
    };

    for _ in 0..config.trades_per_worker {
        let quantity = rng.gen_range(1..=config.max_quantity);
        let price = Decimal::from(rng.gen_range(1..=config.max_price));
        let side = if rng.gen_bool(0.5) {
            TradeSide::Buy
        } else {
            TradeSide::Sell
        };
        match instrument.record_trade(quantity, side, price) {
            Ok(()) => debug!(worker_id, %symbol, quantity, %price, "recorded trade"),
            Err(error) => warn!(worker_id, %symbol, %error, "trade rejected"),
        }
    }

    match instrument.volume_weighted_price(now_ns()) {
        Ok(price) => info!(worker_id, %symbol, %price, "volume-weighted price"),
        Err(error) => debug!(worker_id, %symbol, %error, "no volume-weighted price yet"),
    }
    match instrument.dividend_yield() {
        Ok(value) => info!(worker_id, %symbol, dividend_yield = %value, "dividend yield"),
        Err(error) => debug!(worker_id, %symbol, %error, "no dividend yield"),
    }
}

/// Non-authoritative diagnostic dump; it may race with late mutation and
/// show values a moment stale, which is acceptable for a console report.
fn display_market_status(registry: &InstrumentRegistry) {
    let now = now_ns();
    info!("*** status for all instruments ***");
    let mut statuses: Vec<_> = registry
        .all()
        .iter()
        .map(|instrument| instrument.status(now))
        .collect();
    statuses.sort_by(|a, b| a.symbol.cmp(&b.symbol));
    for status in statuses {
        info!("{status}");
    }
}
