//! # Market State - Concurrent Instrument and Registry Core
//!
//! ## Purpose
//!
//! In-memory market state: a registry of tradable instruments, each
//! accumulating an append-only trade ledger from many threads at once and
//! exposing the derived metrics (dividend yield, P/E ratio, volume-weighted
//! price over a trailing window), plus a registry-wide all-share index over
//! a consistent membership snapshot.
//!
//! ## Architecture Role
//!
//! ```text
//! Worker Threads → [InstrumentRegistry] → [Instrument] → Derived Metrics
//!       ↓                  ↓                   ↓               ↓
//! add/remove/get     Sharded symbol map   Attribute lock   Dividend yield
//! Trade appends      Atomic create        Ledger lock      P/E ratio
//! Index reads        Snapshot iteration   Ticker price     VWAP / index
//! ```
//!
//! ## Locking Model
//!
//! Three mutual-exclusion domains, deliberately independent; coarsening
//! them into one lock would serialize unrelated operations:
//!
//! 1. Per-instrument attribute lock: class and the dividend fields. A yield
//!    reader never observes a torn half-updated combination of them.
//! 2. Per-instrument ledger lock: the trade vector and the ticker price. An
//!    append and the price update it implies are one atomic step, and VWAP
//!    reads a stable ledger.
//! 3. Registry map sharding: create/remove/lookup and the membership
//!    snapshot taken for iteration.
//!
//! A dividend update and a trade append on the same instrument do not
//! contend, and no registry operation blocks an instrument's metrics. No
//! lock is ever held across I/O or a sleep; every operation either completes
//! or fails synchronously with a validation error.

pub mod instrument;
pub mod registry;

pub use instrument::{Instrument, InstrumentStatus, TRADE_WINDOW};
pub use registry::InstrumentRegistry;

// Re-export the leaf types callers need alongside the core.
pub use exchange_types::{InstrumentClass, MarketError, MarketResult, TradeRecord, TradeSide};
