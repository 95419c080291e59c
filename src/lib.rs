//! Zeitan - crypto-asset capital gains calculator
//!
//! This library computes realized capital gains/losses and misc. income for a
//! stream of normalized crypto-asset transactions, using either the moving
//! average or the total (yearly) average cost method.

pub mod config;
pub mod error;
pub mod importers;
pub mod models;
pub mod reports;
pub mod tax;
pub mod utils;

pub use error::CalculationError;
pub use models::{NormalizedTransaction, TradeResult, TransactionKind};
pub use tax::{calculate, CalculationMethod, CalculationReport, CostBasisCalculator};
