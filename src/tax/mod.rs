// Tax module - cost basis methods (moving average, total average) and summaries

pub mod classification;
pub mod moving_average;
pub mod summary;
pub mod total_average;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::error::CalculationError;
use crate::models::{NormalizedTransaction, TradeResult};

pub use classification::{
    acquisition_cost, disposal_revenue, income_value, realized_gain, Direction, KindRole, Taxation,
};
pub use moving_average::{HoldingState, MovingAverageCalculator};
pub use summary::{summarize, YearlySummary};
pub use total_average::{TotalAverageCalculator, YearlyAverageCost};

/// Cost basis accounting method
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMethod {
    #[default]
    MovingAverage,
    TotalAverage,
}

impl CalculationMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationMethod::MovingAverage => "moving_average",
            CalculationMethod::TotalAverage => "total_average",
        }
    }
}

impl fmt::Display for CalculationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalculationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "moving_average" | "moving" => Ok(CalculationMethod::MovingAverage),
            "total_average" | "total" => Ok(CalculationMethod::TotalAverage),
            other => Err(format!(
                "invalid calculation method: {} (expected moving_average or total_average)",
                other
            )),
        }
    }
}

/// A cost basis method turning transactions into per-transaction results.
///
/// `calculate` resets any state left by a previous call, so one instance
/// can be reused for independent inputs.
pub trait CostBasisCalculator {
    fn method(&self) -> CalculationMethod;

    fn calculate(
        &mut self,
        transactions: &[NormalizedTransaction],
    ) -> Result<Vec<TradeResult>, CalculationError>;

    fn total_profit_loss(&self, results: &[TradeResult]) -> Result<Decimal, CalculationError> {
        results.iter().try_fold(Decimal::ZERO, |total, r| {
            total
                .checked_add(r.profit_loss)
                .ok_or_else(|| CalculationError::overflow(&r.transaction.symbol))
        })
    }
}

/// Full output of one calculation run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalculationReport {
    pub method: CalculationMethod,
    pub results: Vec<TradeResult>,
    pub total_profit_loss: Decimal,
    #[serde(default)]
    pub yearly_summary: Vec<YearlySummary>,
}

/// Run `method` over `transactions` with a fresh calculator
pub fn calculate(
    method: CalculationMethod,
    transactions: &[NormalizedTransaction],
) -> Result<CalculationReport, CalculationError> {
    let mut calculator: Box<dyn CostBasisCalculator> = match method {
        CalculationMethod::MovingAverage => Box::new(MovingAverageCalculator::new()),
        CalculationMethod::TotalAverage => Box::new(TotalAverageCalculator::new()),
    };

    let results = calculator.calculate(transactions)?;
    let total_profit_loss = calculator.total_profit_loss(&results)?;
    let yearly_summary = summarize(&results)?;

    info!(
        "Calculated {} transactions with {} (total profit/loss: {})",
        results.len(),
        method,
        total_profit_loss
    );

    Ok(CalculationReport {
        method,
        results,
        total_profit_loss,
        yearly_summary,
    })
}

/// Stable sort by timestamp; equal timestamps keep input order
pub(crate) fn sorted_by_time(transactions: &[NormalizedTransaction]) -> Vec<&NormalizedTransaction> {
    let mut sorted: Vec<&NormalizedTransaction> = transactions.iter().collect();
    sorted.sort_by_key(|tx| tx.timestamp);
    sorted
}
