//! Error types for exchange state operations
//!
//! Every failure the core can report is local and recoverable, and is handed
//! back to the caller as a value. Nothing here terminates the process, and a
//! rejected call never leaves shared state partially mutated; validation
//! precedes mutation in every operation.

use thiserror::Error;

/// Failures reported by registry and instrument operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// Input rejected before any mutation took place
    #[error("invalid argument {field}: {reason}")]
    InvalidArgument {
        field: &'static str,
        reason: &'static str,
    },

    /// Operation referenced a symbol the registry does not hold
    #[error("no instrument found for symbol '{0}'")]
    NotFound(String),

    /// Create lost a race, or repeated, against an existing symbol
    #[error("instrument '{0}' already exists")]
    AlreadyExists(String),

    /// A derived metric had no qualifying inputs or a zero divisor
    #[error("no data: {0}")]
    NoData(&'static str),
}

/// Convenience alias used throughout the core.
pub type MarketResult<T> = Result<T, MarketError>;
