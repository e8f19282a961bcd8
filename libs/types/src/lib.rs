//! # Exchange Shared Types
//!
//! Leaf types shared by the exchange state core and its harnesses: the error
//! taxonomy, the fixed decimal rounding policy, trade value types and the
//! wall-clock helper.
//!
//! ## Design Philosophy
//!
//! - **No floating point**: every financial value is a
//!   [`rust_decimal::Decimal`]; binary floats never carry a result.
//! - **One rounding policy**: every rounded metric in the system goes through
//!   [`precision`] (scale 3, half-up), so yields, ratios and index values
//!   agree digit for digit wherever they are computed.
//! - **Immutable trade values**: a [`TradeRecord`] never changes after it has
//!   been accepted into a ledger.

pub mod errors;
pub mod precision;
pub mod time;
pub mod trade;

pub use errors::{MarketError, MarketResult};
pub use trade::{InstrumentClass, TradeRecord, TradeSide};
