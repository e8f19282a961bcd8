//! Registry of instruments keyed by symbol.
//!
//! The map is the third lock domain, sharded so that create, remove and
//! lookup synchronize with each other without ever serializing against an
//! instrument's own locks. Membership and lifetime are separate concerns:
//! `remove` only drops the map entry, and a handle obtained from `get`
//! before the removal stays fully usable afterwards. Nothing broadcasts an
//! invalidation to such holders; that weak-consistency window is the
//! intended lifetime model, not an oversight.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use exchange_types::precision;
use exchange_types::{InstrumentClass, MarketError, MarketResult};

use crate::instrument::Instrument;

/// Concurrent collection of all listed instruments, with sole authority over
/// creation and removal.
#[derive(Debug, Default)]
pub struct InstrumentRegistry {
    instruments: DashMap<String, Arc<Instrument>>,
}

impl InstrumentRegistry {
    pub fn new() -> Self {
        Self {
            instruments: DashMap::new(),
        }
    }

    /// Create an instrument and list it under `symbol`.
    ///
    /// The existence check and the insert are one critical section on the
    /// symbol's shard, so two callers racing to create the same symbol get
    /// exactly one winner; the loser's arguments never touch the existing
    /// entry.
    pub fn add(
        &self,
        symbol: &str,
        class: InstrumentClass,
        last_dividend: Decimal,
        fixed_dividend_percent: Decimal,
        par_value: Decimal,
    ) -> MarketResult<Arc<Instrument>> {
        if symbol.is_empty() {
            warn!("rejecting add: symbol must not be empty");
            return Err(MarketError::InvalidArgument {
                field: "symbol",
                reason: "must not be empty",
            });
        }
        match self.instruments.entry(symbol.to_string()) {
            Entry::Occupied(_) => {
                warn!(symbol, "instrument already exists");
                Err(MarketError::AlreadyExists(symbol.to_string()))
            }
            Entry::Vacant(entry) => {
                let instrument = Arc::new(Instrument::new(
                    symbol,
                    class,
                    last_dividend,
                    fixed_dividend_percent,
                    par_value,
                ));
                entry.insert(Arc::clone(&instrument));
                debug!(symbol, "instrument listed");
                Ok(instrument)
            }
        }
    }

    /// Delist `symbol`, returning the removed instrument.
    ///
    /// Outstanding handles keep working; only new lookups stop finding it.
    pub fn remove(&self, symbol: &str) -> MarketResult<Arc<Instrument>> {
        if symbol.is_empty() {
            warn!("rejecting remove: symbol must not be empty");
            return Err(MarketError::InvalidArgument {
                field: "symbol",
                reason: "must not be empty",
            });
        }
        match self.instruments.remove(symbol) {
            Some((_, instrument)) => {
                debug!(symbol, "instrument delisted");
                Ok(instrument)
            }
            None => {
                warn!(symbol, "no instrument found");
                Err(MarketError::NotFound(symbol.to_string()))
            }
        }
    }

    /// Shared handle to the listed instrument, a reference rather than a copy;
    /// mutations through it are visible to every other holder.
    pub fn get(&self, symbol: &str) -> MarketResult<Arc<Instrument>> {
        if symbol.is_empty() {
            warn!("rejecting get: symbol must not be empty");
            return Err(MarketError::InvalidArgument {
                field: "symbol",
                reason: "must not be empty",
            });
        }
        match self.instruments.get(symbol) {
            Some(entry) => Ok(Arc::clone(entry.value())),
            None => {
                warn!(symbol, "no instrument found");
                Err(MarketError::NotFound(symbol.to_string()))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Snapshot of current membership.
    ///
    /// Shard locks are held only while the handles are collected; whatever
    /// callers then do with them does not block the map.
    pub fn all(&self) -> Vec<Arc<Instrument>> {
        self.instruments
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    /// Geometric mean of every listed instrument's volume-weighted price at
    /// `now_ns`, at metric scale.
    ///
    /// Instruments without a qualifying trade are skipped and logged, not
    /// counted as zero. An index over zero qualifying instruments is
    /// `NoData`, the empty-market signal, which callers must keep distinct
    /// from a computed index. Each VWAP runs under its own instrument's
    /// ledger lock, outside the map's shard locks.
    pub fn all_share_index(&self, now_ns: u64) -> MarketResult<Decimal> {
        let mut product = Decimal::ONE;
        let mut priced: u32 = 0;
        for instrument in self.all() {
            match instrument.volume_weighted_price(now_ns) {
                Ok(price) => {
                    product *= price;
                    priced += 1;
                }
                Err(error) => {
                    debug!(
                        symbol = instrument.symbol(),
                        %error,
                        "skipping instrument without a price"
                    );
                }
            }
        }
        if priced == 0 {
            debug!("all-share index unavailable: no instrument has a qualifying trade");
            return Err(MarketError::NoData("no instrument has a qualifying trade"));
        }
        precision::nth_root(product, priced).map(precision::round_metric)
    }
}
