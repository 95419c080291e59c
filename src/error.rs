//! Error handling for the cost basis engine
//!
//! Engine failures are typed (`CalculationError`) so callers can tell an
//! unsupported transaction kind apart from an oversold position. Everything
//! above the engine (file import, config, CLI) uses anyhow for context chaining.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by `calculate`. Every variant is fatal to the whole call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalculationError {
    /// Kind is outside the classification table, or outside the subset
    /// supported by the method in use.
    #[error("unknown transaction kind: {0}")]
    UnknownTransactionKind(String),

    /// A disposal needs more quantity than is currently held.
    #[error("insufficient balance for {symbol}: held {held}, requested {requested}")]
    InsufficientBalance {
        symbol: String,
        held: Decimal,
        requested: Decimal,
    },

    /// An intermediate amount left the range `Decimal` can represent.
    #[error("arithmetic overflow while processing {symbol}")]
    ArithmeticOverflow { symbol: String },
}

impl CalculationError {
    pub(crate) fn overflow(symbol: &str) -> Self {
        CalculationError::ArithmeticOverflow {
            symbol: symbol.to_string(),
        }
    }
}
