//! Single-instrument state: static attributes, the append-only trade ledger
//! and the metrics derived from both.
//!
//! Two lock domains live here and stay independent. The attribute lock
//! guards the class and dividend fields so a yield computation never sees a
//! torn combination of them; the ledger lock guards the trade vector
//! together with the ticker price so an append and its price update form one
//! atomic step against concurrent appends and price reads.
//!
//! Ticker price follows ledger-lock acquisition order, not trade timestamp
//! order: a trade carrying an older timestamp that acquires the lock later
//! still overwrites the price. Callers rely on this compatibility behaviour;
//! do not "correct" it to max-timestamp semantics.

use std::fmt;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use exchange_types::precision;
use exchange_types::time::now_ns;
use exchange_types::{InstrumentClass, MarketError, MarketResult, TradeRecord, TradeSide};

/// Trailing window over which the volume-weighted price is computed.
pub const TRADE_WINDOW: Duration = Duration::from_secs(15 * 60);

/// Fields sharing the attribute lock. `class` is mutable but rarely changed;
/// it rides with the dividend fields because the yield formula branches on
/// it.
#[derive(Debug, Clone)]
struct Attributes {
    class: InstrumentClass,
    last_dividend: Decimal,
    fixed_dividend_percent: Decimal,
    par_value: Decimal,
}

/// The ledger and the ticker price share one lock; the price is defined as
/// "the last accepted trade's price", so the two cannot be observed out of
/// step.
#[derive(Debug)]
struct Ledger {
    trades: Vec<TradeRecord>,
    ticker_price: Decimal,
}

/// One tradable instrument: identity, dividend attributes, trade ledger and
/// derived metrics. Safe to share across threads behind an `Arc`; all
/// mutation goes through `&self`.
#[derive(Debug)]
pub struct Instrument {
    symbol: String,
    attributes: RwLock<Attributes>,
    ledger: Mutex<Ledger>,
}

impl Instrument {
    /// Create an instrument with an empty ledger.
    ///
    /// The ticker price starts at the par value and tracks the most recently
    /// recorded trade from then on.
    pub fn new(
        symbol: impl Into<String>,
        class: InstrumentClass,
        last_dividend: Decimal,
        fixed_dividend_percent: Decimal,
        par_value: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            attributes: RwLock::new(Attributes {
                class,
                last_dividend,
                fixed_dividend_percent,
                par_value,
            }),
            ledger: Mutex::new(Ledger {
                trades: Vec::new(),
                ticker_price: par_value,
            }),
        }
    }

    /// Symbol never changes after construction; it is the registry key.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn class(&self) -> InstrumentClass {
        self.attributes.read().class
    }

    pub fn set_class(&self, class: InstrumentClass) {
        self.attributes.write().class = class;
    }

    pub fn last_dividend(&self) -> Decimal {
        self.attributes.read().last_dividend
    }

    pub fn set_last_dividend(&self, value: Decimal) {
        self.attributes.write().last_dividend = value;
    }

    /// Only meaningful for preferred instruments; common instruments carry
    /// it along unused.
    pub fn fixed_dividend_percent(&self) -> Decimal {
        self.attributes.read().fixed_dividend_percent
    }

    pub fn set_fixed_dividend(&self, percent: Decimal) {
        self.attributes.write().fixed_dividend_percent = percent;
    }

    pub fn par_value(&self) -> Decimal {
        self.attributes.read().par_value
    }

    pub fn set_par_value(&self, value: Decimal) {
        self.attributes.write().par_value = value;
    }

    /// Price of the most recently recorded trade, or the par value before
    /// any trade has been accepted.
    pub fn ticker_price(&self) -> Decimal {
        self.ledger.lock().ticker_price
    }

    pub fn trade_count(&self) -> usize {
        self.ledger.lock().trades.len()
    }

    /// Snapshot of the ledger in append order. Cloned so the ledger can keep
    /// growing underneath; the records themselves are immutable.
    pub fn trades(&self) -> Vec<TradeRecord> {
        self.ledger.lock().trades.clone()
    }

    /// Record a trade stamped with the current wall clock.
    pub fn record_trade(&self, quantity: u64, side: TradeSide, price: Decimal) -> MarketResult<()> {
        self.append(
            TradeRecord {
                timestamp_ns: now_ns(),
                quantity,
                side,
                price,
            },
            false,
        )
    }

    /// Record a trade with a caller-supplied timestamp.
    ///
    /// The ledger keeps append order, so an explicit timestamp may land out
    /// of timestamp order; the ticker price still follows the append.
    pub fn record_trade_at(
        &self,
        timestamp_ns: u64,
        quantity: u64,
        side: TradeSide,
        price: Decimal,
    ) -> MarketResult<()> {
        self.append(
            TradeRecord {
                timestamp_ns,
                quantity,
                side,
                price,
            },
            true,
        )
    }

    fn append(&self, trade: TradeRecord, caller_timestamp: bool) -> MarketResult<()> {
        // Every offending field is reported before the call fails; a
        // rejected trade leaves no trace in the ledger or the price.
        let mut violation = None;
        if caller_timestamp && trade.timestamp_ns == 0 {
            warn!(
                symbol = %self.symbol,
                "rejecting trade: timestamp must be greater than 0"
            );
            violation.get_or_insert(MarketError::InvalidArgument {
                field: "timestamp",
                reason: "must be greater than 0",
            });
        }
        if trade.quantity == 0 {
            warn!(
                symbol = %self.symbol,
                "rejecting trade: quantity must be greater than 0"
            );
            violation.get_or_insert(MarketError::InvalidArgument {
                field: "quantity",
                reason: "must be greater than 0",
            });
        }
        if trade.price <= Decimal::ZERO {
            warn!(
                symbol = %self.symbol,
                "rejecting trade: price must be greater than 0"
            );
            violation.get_or_insert(MarketError::InvalidArgument {
                field: "price",
                reason: "must be greater than 0",
            });
        }
        if let Some(error) = violation {
            return Err(error);
        }

        let mut ledger = self.ledger.lock();
        ledger.trades.push(trade);
        ledger.ticker_price = trade.price;
        Ok(())
    }

    /// Dividend yield under the current class's formula, at metric scale.
    ///
    /// `NoData` when the ticker price is not positive. The price is positive
    /// for any accepted trade, but a zero par value leaves a zero price
    /// until the first trade, so the check is required rather than
    /// decorative.
    pub fn dividend_yield(&self) -> MarketResult<Decimal> {
        let attributes = self.attributes.read();
        let price = self.ticker_price();
        if price <= Decimal::ZERO {
            warn!(
                symbol = %self.symbol,
                "dividend yield unavailable: ticker price is not positive"
            );
            return Err(MarketError::NoData("ticker price is not positive"));
        }
        let result = match attributes.class {
            InstrumentClass::Common => precision::div_metric(attributes.last_dividend, price),
            InstrumentClass::Preferred => {
                // The fixed dividend arrives as a percentage; it is scaled
                // down before being applied to par, and both divisions round
                // under the shared policy.
                let fixed = precision::div_metric(
                    attributes.fixed_dividend_percent,
                    Decimal::ONE_HUNDRED,
                );
                precision::div_metric(fixed * attributes.par_value, price)
            }
        };
        Ok(result)
    }

    /// Price/earnings ratio against the last dividend, at metric scale.
    ///
    /// `NoData` when the last dividend is zero.
    pub fn price_earnings_ratio(&self) -> MarketResult<Decimal> {
        let attributes = self.attributes.read();
        if attributes.last_dividend.is_zero() {
            warn!(
                symbol = %self.symbol,
                "P/E ratio unavailable: last dividend is zero"
            );
            return Err(MarketError::NoData("last dividend is zero"));
        }
        Ok(precision::div_metric(
            self.ticker_price(),
            attributes.last_dividend,
        ))
    }

    /// Volume-weighted price over the default trailing window.
    pub fn volume_weighted_price(&self, now_ns: u64) -> MarketResult<Decimal> {
        self.volume_weighted_price_within(now_ns, TRADE_WINDOW)
    }

    /// Volume-weighted price over trades whose age at `now_ns` is at most
    /// `window`. A trade stamped in the future counts as age zero.
    ///
    /// `NoData` when no trade qualifies: the "no trades yet" signal callers
    /// filter on, not a fault.
    pub fn volume_weighted_price_within(
        &self,
        now_ns: u64,
        window: Duration,
    ) -> MarketResult<Decimal> {
        let window_ns = window.as_nanos() as u64;
        let mut quantity_sum: u64 = 0;
        let mut weighted_sum = Decimal::ZERO;
        {
            let ledger = self.ledger.lock();
            for trade in &ledger.trades {
                if now_ns.saturating_sub(trade.timestamp_ns) <= window_ns {
                    quantity_sum += trade.quantity;
                    weighted_sum += trade.price * Decimal::from(trade.quantity);
                }
            }
        }
        if quantity_sum == 0 {
            debug!(symbol = %self.symbol, "no trades inside the window");
            return Err(MarketError::NoData("no trades inside the window"));
        }
        Ok(precision::div_metric(
            weighted_sum,
            Decimal::from(quantity_sum),
        ))
    }

    /// Read-only snapshot for diagnostics.
    ///
    /// Each field is read under its own lock one at a time, so a concurrent
    /// writer can interleave between them; the dump is a stale-tolerant
    /// view, not a consistency point.
    pub fn status(&self, now_ns: u64) -> InstrumentStatus {
        let (class, last_dividend, fixed_dividend_percent, par_value) = {
            let attributes = self.attributes.read();
            (
                attributes.class,
                attributes.last_dividend,
                attributes.fixed_dividend_percent,
                attributes.par_value,
            )
        };
        let (ticker_price, trade_count) = {
            let ledger = self.ledger.lock();
            (ledger.ticker_price, ledger.trades.len())
        };
        InstrumentStatus {
            symbol: self.symbol.clone(),
            class,
            last_dividend,
            fixed_dividend_percent,
            par_value,
            ticker_price,
            trade_count,
            volume_weighted_price: self.volume_weighted_price(now_ns).ok(),
        }
    }
}

/// Point-in-time view of one instrument, shaped for console reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentStatus {
    pub symbol: String,
    pub class: InstrumentClass,
    pub last_dividend: Decimal,
    pub fixed_dividend_percent: Decimal,
    pub par_value: Decimal,
    pub ticker_price: Decimal,
    pub trade_count: usize,
    /// Current VWAP, absent when no trade is inside the window.
    pub volume_weighted_price: Option<Decimal>,
}

impl fmt::Display for InstrumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] last_dividend={} fixed_dividend={}% par={} ticker={} trades={} vwap=",
            self.symbol,
            self.class,
            precision::round_metric(self.last_dividend),
            precision::round_metric(self.fixed_dividend_percent),
            precision::round_metric(self.par_value),
            precision::round_metric(self.ticker_price),
            self.trade_count,
        )?;
        match self.volume_weighted_price {
            Some(price) => write!(f, "{price}"),
            None => write!(f, "n/a"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const MINUTE_NS: u64 = 60 * 1_000_000_000;
    const NOW_NS: u64 = 1_700_000_000_000_000_000;

    fn common_stock() -> Instrument {
        Instrument::new(
            "ABC",
            InstrumentClass::Common,
            dec!(5),
            dec!(2),
            dec!(100),
        )
    }

    #[test]
    fn ticker_starts_at_par_value() {
        let stock = common_stock();
        assert_eq!(stock.ticker_price(), dec!(100));
        assert_eq!(stock.trade_count(), 0);
    }

    #[test]
    fn setters_replace_attributes() {
        let stock = common_stock();
        stock.set_class(InstrumentClass::Preferred);
        stock.set_last_dividend(dec!(8));
        stock.set_fixed_dividend(dec!(5));
        stock.set_par_value(dec!(10));
        assert_eq!(stock.class(), InstrumentClass::Preferred);
        assert_eq!(stock.last_dividend(), dec!(8));
        assert_eq!(stock.fixed_dividend_percent(), dec!(5));
        assert_eq!(stock.par_value(), dec!(10));
        // A par change after construction does not rewrite the ticker.
        assert_eq!(stock.ticker_price(), dec!(100));
    }

    #[test]
    fn accepted_trade_appends_and_moves_the_ticker() {
        let stock = common_stock();
        stock
            .record_trade_at(NOW_NS, 100, TradeSide::Buy, dec!(50.5))
            .unwrap();
        assert_eq!(stock.trade_count(), 1);
        assert_eq!(stock.ticker_price(), dec!(50.5));

        let trades = stock.trades();
        assert_eq!(trades[0].quantity, 100);
        assert_eq!(trades[0].side, TradeSide::Buy);
        assert_eq!(trades[0].price, dec!(50.5));

        stock
            .record_trade_at(NOW_NS, 500, TradeSide::Sell, dec!(60))
            .unwrap();
        assert_eq!(stock.trade_count(), 2);
        assert_eq!(stock.ticker_price(), dec!(60));
    }

    #[test]
    fn rejected_trade_mutates_nothing() {
        let stock = common_stock();

        let err = stock
            .record_trade_at(NOW_NS, 0, TradeSide::Buy, dec!(10))
            .unwrap_err();
        assert_eq!(
            err,
            MarketError::InvalidArgument {
                field: "quantity",
                reason: "must be greater than 0"
            }
        );

        let err = stock
            .record_trade_at(NOW_NS, 10, TradeSide::Buy, dec!(0))
            .unwrap_err();
        assert_eq!(
            err,
            MarketError::InvalidArgument {
                field: "price",
                reason: "must be greater than 0"
            }
        );

        let err = stock
            .record_trade_at(0, 10, TradeSide::Buy, dec!(10))
            .unwrap_err();
        assert_eq!(
            err,
            MarketError::InvalidArgument {
                field: "timestamp",
                reason: "must be greater than 0"
            }
        );

        assert_eq!(stock.trade_count(), 0);
        assert_eq!(stock.ticker_price(), dec!(100));
    }

    #[test]
    fn ticker_follows_append_order_not_timestamp_order() {
        let stock = common_stock();
        stock
            .record_trade_at(NOW_NS, 10, TradeSide::Buy, dec!(90))
            .unwrap();
        // Backdated trade appended afterwards still wins the ticker.
        stock
            .record_trade_at(NOW_NS - 10 * MINUTE_NS, 10, TradeSide::Sell, dec!(40))
            .unwrap();
        assert_eq!(stock.ticker_price(), dec!(40));
    }

    #[test]
    fn dividend_yield_common() {
        let stock = common_stock();
        assert_eq!(stock.dividend_yield().unwrap(), dec!(0.050));
    }

    #[test]
    fn dividend_yield_preferred() {
        let stock = common_stock();
        stock.set_class(InstrumentClass::Preferred);
        assert_eq!(stock.dividend_yield().unwrap(), dec!(0.020));

        stock
            .record_trade_at(NOW_NS, 100, TradeSide::Buy, dec!(95.55))
            .unwrap();
        assert_eq!(stock.dividend_yield().unwrap(), dec!(0.021));
    }

    #[test]
    fn dividend_yield_requires_a_positive_price() {
        let stock = Instrument::new(
            "ZRO",
            InstrumentClass::Common,
            dec!(5),
            dec!(0),
            dec!(0),
        );
        assert_eq!(
            stock.dividend_yield().unwrap_err(),
            MarketError::NoData("ticker price is not positive")
        );
    }

    #[test]
    fn price_earnings_ratio_tracks_the_ticker() {
        let stock = common_stock();
        assert_eq!(stock.price_earnings_ratio().unwrap(), dec!(20.000));

        stock
            .record_trade_at(NOW_NS, 100, TradeSide::Buy, dec!(95.55))
            .unwrap();
        assert_eq!(stock.price_earnings_ratio().unwrap(), dec!(19.110));
    }

    #[test]
    fn price_earnings_ratio_requires_a_dividend() {
        let stock = common_stock();
        stock.set_last_dividend(dec!(0));
        assert_eq!(
            stock.price_earnings_ratio().unwrap_err(),
            MarketError::NoData("last dividend is zero")
        );
    }

    #[test]
    fn vwap_weights_by_quantity() {
        let stock = common_stock();
        stock
            .record_trade_at(NOW_NS - MINUTE_NS, 100, TradeSide::Buy, dec!(80))
            .unwrap();
        stock
            .record_trade_at(NOW_NS, 100, TradeSide::Sell, dec!(90))
            .unwrap();
        assert_eq!(stock.volume_weighted_price(NOW_NS).unwrap(), dec!(85));
    }

    #[test]
    fn vwap_excludes_trades_older_than_the_window() {
        let stock = common_stock();
        stock
            .record_trade_at(NOW_NS - 20 * MINUTE_NS, 300, TradeSide::Buy, dec!(200))
            .unwrap();
        assert_eq!(
            stock.volume_weighted_price(NOW_NS).unwrap_err(),
            MarketError::NoData("no trades inside the window")
        );

        // The same trade qualifies under a wider window.
        let widened = stock
            .volume_weighted_price_within(NOW_NS, Duration::from_secs(30 * 60))
            .unwrap();
        assert_eq!(widened, dec!(200));
    }

    #[test]
    fn vwap_counts_future_stamped_trades() {
        let stock = common_stock();
        stock
            .record_trade_at(NOW_NS + MINUTE_NS, 50, TradeSide::Buy, dec!(70))
            .unwrap();
        assert_eq!(stock.volume_weighted_price(NOW_NS).unwrap(), dec!(70));
    }

    #[test]
    fn status_reflects_current_state() {
        let stock = common_stock();
        stock
            .record_trade_at(NOW_NS, 100, TradeSide::Buy, dec!(80))
            .unwrap();
        let status = stock.status(NOW_NS);
        assert_eq!(status.symbol, "ABC");
        assert_eq!(status.ticker_price, dec!(80));
        assert_eq!(status.trade_count, 1);
        assert_eq!(status.volume_weighted_price, Some(dec!(80)));
        let line = status.to_string();
        assert!(line.contains("ABC [COMMON]"));
        assert!(line.contains("vwap=80"));
    }
}
