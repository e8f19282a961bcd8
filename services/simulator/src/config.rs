//! Simulator configuration
//!
//! Runtime parameters for the load harness: how many workers run, which
//! symbols they pick from and the bounds on the trades they invent. The
//! defaults work out of the box; a JSON file replaces them wholesale and
//! environment variables override individual fields on top.

use serde::{Deserialize, Serialize};

/// Complete configuration for one simulator run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Number of worker threads driving the exchange concurrently
    pub workers: usize,
    /// Trades each worker attempts against its chosen instrument
    pub trades_per_worker: u32,
    /// Symbols workers pick from at random
    pub symbols: Vec<String>,
    /// Inclusive upper bound for random trade quantities
    pub max_quantity: u64,
    /// Inclusive upper bound for random whole-number trade prices
    pub max_price: u32,
    /// Exclusive upper bound for random last-dividend values at creation
    pub max_dividend: u32,
    /// Exclusive upper bound for random par values at creation (a zero par
    /// is possible and exercises the no-yield path)
    pub max_par_value: u32,
    /// Upper bound for the random startup jitter, in milliseconds
    pub max_start_jitter_ms: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            workers: 64,
            trades_per_worker: 4,
            symbols: [
                "TEA", "POP", "ALE", "GIN", "JOE", "ABC", "BCD", "CDE", "DEF", "EFG",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            max_quantity: 100,
            max_price: 200,
            max_dividend: 10,
            max_par_value: 100,
            max_start_jitter_ms: 50,
        }
    }
}

impl SimulatorConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the environment with defaults, starting from
    /// `SIMULATOR_CONFIG` (a JSON file path) when set
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = match std::env::var("SIMULATOR_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };

        if let Ok(workers) = std::env::var("SIMULATOR_WORKERS") {
            if let Ok(value) = workers.parse() {
                config.workers = value;
            }
        }
        if let Ok(trades) = std::env::var("SIMULATOR_TRADES_PER_WORKER") {
            if let Ok(value) = trades.parse() {
                config.trades_per_worker = value;
            }
        }
        if let Ok(symbols) = std::env::var("SIMULATOR_SYMBOLS") {
            let parsed: Vec<String> = symbols
                .split(',')
                .map(str::trim)
                .filter(|symbol| !symbol.is_empty())
                .map(String::from)
                .collect();
            if !parsed.is_empty() {
                config.symbols = parsed;
            }
        }
        if let Ok(quantity) = std::env::var("SIMULATOR_MAX_QUANTITY") {
            if let Ok(value) = quantity.parse() {
                config.max_quantity = value;
            }
        }
        if let Ok(price) = std::env::var("SIMULATOR_MAX_PRICE") {
            if let Ok(value) = price.parse() {
                config.max_price = value;
            }
        }

        Ok(config)
    }

    /// Validate that a run with these parameters can do anything useful
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.workers == 0 {
            anyhow::bail!("workers must be greater than 0");
        }
        if self.trades_per_worker == 0 {
            anyhow::bail!("trades_per_worker must be greater than 0");
        }
        if self.symbols.is_empty() {
            anyhow::bail!("at least one symbol is required");
        }
        if self.symbols.iter().any(|symbol| symbol.is_empty()) {
            anyhow::bail!("symbols must not be empty strings");
        }
        if self.max_quantity == 0 {
            anyhow::bail!("max_quantity must be greater than 0");
        }
        if self.max_price == 0 {
            anyhow::bail!("max_price must be greater than 0 (trades need a positive price)");
        }
        if self.max_dividend == 0 || self.max_par_value == 0 {
            anyhow::bail!("max_dividend and max_par_value bound non-empty random ranges");
        }
        Ok(())
    }
}
