//! Trade value types
//!
//! A trade is immutable once recorded; only read access exists, since
//! changing an executed trade has no meaning. Ledgers hand out copies, never
//! live references into their storage.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Classification of an instrument, selecting its dividend-yield formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstrumentClass {
    Common,
    Preferred,
}

impl fmt::Display for InstrumentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstrumentClass::Common => write!(f, "COMMON"),
            InstrumentClass::Preferred => write!(f, "PREFERRED"),
        }
    }
}

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "BUY"),
            TradeSide::Sell => write!(f, "SELL"),
        }
    }
}

/// One executed trade against a single instrument.
///
/// Field validity (positive quantity, positive price, non-zero timestamp) is
/// enforced where records enter a ledger, so a record read back out of a
/// ledger is always well formed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// Nanoseconds since the Unix epoch; caller-supplied or captured at
    /// append time.
    pub timestamp_ns: u64,
    /// Number of shares traded.
    pub quantity: u64,
    pub side: TradeSide,
    /// Price per share.
    pub price: Decimal,
}

impl fmt::Display for TradeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} @ {} (ts={})",
            self.side, self.quantity, self.price, self.timestamp_ns
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn display_forms() {
        assert_eq!(InstrumentClass::Common.to_string(), "COMMON");
        assert_eq!(InstrumentClass::Preferred.to_string(), "PREFERRED");
        assert_eq!(TradeSide::Buy.to_string(), "BUY");
        assert_eq!(TradeSide::Sell.to_string(), "SELL");

        let trade = TradeRecord {
            timestamp_ns: 1,
            quantity: 100,
            side: TradeSide::Buy,
            price: dec!(50.5),
        };
        assert_eq!(trade.to_string(), "BUY 100 @ 50.5 (ts=1)");
    }
}
