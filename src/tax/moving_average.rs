//! Moving average cost method
//!
//! Each acquisition folds its cost into the symbol's running weighted average;
//! each disposal realizes profit/loss against the average in effect at that
//! moment and reduces the held quantity without touching the average.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::classification::{acquisition_cost, income_value, realized_gain};
use super::{sorted_by_time, CalculationMethod, CostBasisCalculator};
use crate::error::CalculationError;
use crate::models::{NormalizedTransaction, TradeResult, TransactionKind};

/// Running position for one symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HoldingState {
    pub symbol: String,
    pub amount: Decimal,
    pub average_cost: Decimal,
}

impl HoldingState {
    fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            amount: Decimal::ZERO,
            average_cost: Decimal::ZERO,
        }
    }

    /// Fold an acquisition into the weighted average. Nothing is committed
    /// when an intermediate value overflows.
    fn acquire(&mut self, amount: Decimal, cost: Decimal) -> Result<(), CalculationError> {
        let overflow = || CalculationError::overflow(&self.symbol);

        let total_cost = self
            .amount
            .checked_mul(self.average_cost)
            .and_then(|before| before.checked_add(cost))
            .ok_or_else(overflow)?;
        let new_amount = self.amount.checked_add(amount).ok_or_else(overflow)?;

        let new_average = if new_amount > Decimal::ZERO {
            total_cost.checked_div(new_amount).ok_or_else(overflow)?
        } else {
            Decimal::ZERO
        };

        self.average_cost = new_average;
        self.amount = new_amount;
        Ok(())
    }

    /// Check that a disposal of `amount` is covered by the current position.
    ///
    /// Taxable disposals (sell, swap, nft_sell) require a positive position
    /// before the operation and a non-negative one after. Plain outflows
    /// (transfer_out, liquidity_add, lending) require `held >= amount`.
    fn ensure_covers(&self, kind: TransactionKind, amount: Decimal) -> Result<(), CalculationError> {
        let covered = if kind.is_capital() {
            self.amount > Decimal::ZERO && self.amount >= amount
        } else {
            self.amount >= amount
        };

        if covered {
            Ok(())
        } else {
            Err(CalculationError::InsufficientBalance {
                symbol: self.symbol.clone(),
                held: self.amount,
                requested: amount,
            })
        }
    }
}

/// Moving average calculator; holds one `HoldingState` per symbol
#[derive(Debug, Default)]
pub struct MovingAverageCalculator {
    holdings: BTreeMap<String, HoldingState>,
}

impl MovingAverageCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the positions left by the last `calculate` call
    pub fn holdings(&self) -> BTreeMap<String, HoldingState> {
        self.holdings.clone()
    }

    pub fn holding(&self, symbol: &str) -> Option<&HoldingState> {
        self.holdings.get(symbol)
    }

    fn apply(&mut self, tx: &NormalizedTransaction) -> Result<TradeResult, CalculationError> {
        let holding = self
            .holdings
            .entry(tx.symbol.clone())
            .or_insert_with(|| HoldingState::new(&tx.symbol));

        let profit_loss = match acquisition_cost(tx)? {
            Some(cost) => {
                holding.acquire(tx.amount, cost)?;

                // Income is recognized at receipt on top of entering the basis
                if tx.kind.is_income() {
                    income_value(tx)?
                } else {
                    Decimal::ZERO
                }
            }
            None => {
                holding.ensure_covers(tx.kind, tx.amount)?;

                let profit_loss = if tx.kind.is_capital() {
                    realized_gain(tx, holding.average_cost)?
                } else {
                    Decimal::ZERO
                };
                holding.amount = holding
                    .amount
                    .checked_sub(tx.amount)
                    .ok_or_else(|| CalculationError::overflow(&tx.symbol))?;
                profit_loss
            }
        };

        debug!(
            "{} {} {} @ {}: held {} avg {} p/l {}",
            tx.timestamp, tx.kind, tx.symbol, tx.price, holding.amount, holding.average_cost, profit_loss
        );

        Ok(TradeResult {
            transaction: tx.clone(),
            profit_loss,
            average_cost_after: Some(holding.average_cost),
            average_cost_used: None,
        })
    }
}

impl CostBasisCalculator for MovingAverageCalculator {
    fn method(&self) -> CalculationMethod {
        CalculationMethod::MovingAverage
    }

    fn calculate(
        &mut self,
        transactions: &[NormalizedTransaction],
    ) -> Result<Vec<TradeResult>, CalculationError> {
        self.holdings.clear();
        info!("Moving average: processing {} transactions", transactions.len());

        sorted_by_time(transactions)
            .into_iter()
            .map(|tx| self.apply(tx))
            .collect()
    }
}
