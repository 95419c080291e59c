//! Total average cost method
//!
//! Yearly average acquisition cost per symbol:
//!   average_cost = total acquisition cost of the year / total acquired quantity
//! Every sale in that year is valued against that single average, no matter
//! where it falls relative to the purchases.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::classification::{acquisition_cost, income_value, realized_gain};
use super::{sorted_by_time, CalculationMethod, CostBasisCalculator};
use crate::error::CalculationError;
use crate::models::{NormalizedTransaction, TradeResult, TransactionKind};

/// Aggregated acquisitions of one symbol in one calendar year
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearlyAverageCost {
    pub year: i32,
    pub symbol: String,
    pub total_purchase_amount: Decimal,
    pub total_purchase_cost: Decimal, // Fees included for buys
    pub average_cost: Decimal,
}

impl YearlyAverageCost {
    fn new(year: i32, symbol: &str) -> Self {
        Self {
            year,
            symbol: symbol.to_string(),
            total_purchase_amount: Decimal::ZERO,
            total_purchase_cost: Decimal::ZERO,
            average_cost: Decimal::ZERO,
        }
    }

    fn add(&mut self, amount: Decimal, cost: Decimal) -> Result<(), CalculationError> {
        self.total_purchase_amount = self
            .total_purchase_amount
            .checked_add(amount)
            .ok_or_else(|| CalculationError::overflow(&self.symbol))?;
        self.total_purchase_cost = self
            .total_purchase_cost
            .checked_add(cost)
            .ok_or_else(|| CalculationError::overflow(&self.symbol))?;
        Ok(())
    }

    fn finalize(&mut self) -> Result<(), CalculationError> {
        self.average_cost = if self.total_purchase_amount > Decimal::ZERO {
            self.total_purchase_cost
                .checked_div(self.total_purchase_amount)
                .ok_or_else(|| CalculationError::overflow(&self.symbol))?
        } else {
            Decimal::ZERO
        };
        Ok(())
    }
}

/// Total average calculator; keyed by (year, symbol)
#[derive(Debug, Default)]
pub struct TotalAverageCalculator {
    yearly_avg_costs: BTreeMap<(i32, String), YearlyAverageCost>,
}

impl TotalAverageCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kinds this method accepts. Swaps, liquidity, lending and NFT kinds
    /// are rejected with `UnknownTransactionKind`.
    pub fn supports(&self, kind: TransactionKind) -> bool {
        matches!(
            kind,
            TransactionKind::Buy
                | TransactionKind::Sell
                | TransactionKind::Airdrop
                | TransactionKind::Fork
                | TransactionKind::Reward
                | TransactionKind::TransferIn
                | TransactionKind::TransferOut
        )
    }

    /// Supported acquisitions feed the yearly average
    fn enters_yearly_average(&self, kind: TransactionKind) -> bool {
        self.supports(kind) && kind.role().is_acquisition()
    }

    /// Snapshot of the averages computed by the last `calculate` call
    pub fn yearly_average_costs(&self) -> BTreeMap<(i32, String), YearlyAverageCost> {
        self.yearly_avg_costs.clone()
    }

    pub fn average_cost_for(&self, year: i32, symbol: &str) -> Decimal {
        self.yearly_avg_costs
            .get(&(year, symbol.to_string()))
            .map(|y| y.average_cost)
            .unwrap_or(Decimal::ZERO)
    }

    /// Phase 1: fold acquisitions into (year, symbol) buckets
    fn aggregate(&mut self, transactions: &[&NormalizedTransaction]) -> Result<(), CalculationError> {
        for tx in transactions {
            if !self.enters_yearly_average(tx.kind) {
                continue;
            }
            let cost = acquisition_cost(tx)?.unwrap_or(Decimal::ZERO);
            let year = tx.year();
            self.yearly_avg_costs
                .entry((year, tx.symbol.clone()))
                .or_insert_with(|| YearlyAverageCost::new(year, &tx.symbol))
                .add(tx.amount, cost)?;
        }

        for bucket in self.yearly_avg_costs.values_mut() {
            bucket.finalize()?;
            debug!(
                "{} {}: {} units, cost {}, average {}",
                bucket.year,
                bucket.symbol,
                bucket.total_purchase_amount,
                bucket.total_purchase_cost,
                bucket.average_cost
            );
        }
        Ok(())
    }

    /// Phase 2: value each transaction against its year's average
    fn apply(&self, tx: &NormalizedTransaction) -> Result<TradeResult, CalculationError> {
        let average_cost = self.average_cost_for(tx.year(), &tx.symbol);

        let profit_loss = match tx.kind {
            TransactionKind::Sell => realized_gain(tx, average_cost)?,
            TransactionKind::Airdrop | TransactionKind::Fork | TransactionKind::Reward => {
                income_value(tx)?
            }
            TransactionKind::Buy | TransactionKind::TransferIn | TransactionKind::TransferOut => {
                Decimal::ZERO
            }
            TransactionKind::Swap
            | TransactionKind::LiquidityAdd
            | TransactionKind::LiquidityRemove
            | TransactionKind::Lending
            | TransactionKind::NftBuy
            | TransactionKind::NftSell => {
                return Err(CalculationError::UnknownTransactionKind(
                    tx.kind.to_string(),
                ))
            }
        };

        Ok(TradeResult {
            transaction: tx.clone(),
            profit_loss,
            average_cost_after: None,
            average_cost_used: Some(average_cost),
        })
    }
}

impl CostBasisCalculator for TotalAverageCalculator {
    fn method(&self) -> CalculationMethod {
        CalculationMethod::TotalAverage
    }

    fn calculate(
        &mut self,
        transactions: &[NormalizedTransaction],
    ) -> Result<Vec<TradeResult>, CalculationError> {
        self.yearly_avg_costs.clear();
        info!("Total average: processing {} transactions", transactions.len());

        let sorted = sorted_by_time(transactions);
        self.aggregate(&sorted)?;

        sorted.into_iter().map(|tx| self.apply(tx)).collect()
    }
}
