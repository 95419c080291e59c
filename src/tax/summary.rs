use itertools::Itertools;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::CalculationError;
use crate::models::TradeResult;

/// Per-year split between capital gains and misc. income
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlySummary {
    pub year: i32,
    /// sell / swap / nft_sell
    pub capital_gains: Decimal,
    pub disposal_count: usize,
    /// airdrop / fork / reward at market value on receipt
    pub misc_income: Decimal,
    pub income_count: usize,
    pub total_profit_loss: Decimal,
}

fn checked_sum<'a>(rows: impl IntoIterator<Item = &'a TradeResult>) -> Result<Decimal, CalculationError> {
    rows.into_iter().try_fold(Decimal::ZERO, |total, r| {
        total
            .checked_add(r.profit_loss)
            .ok_or_else(|| CalculationError::overflow(&r.transaction.symbol))
    })
}

/// Group results by calendar year (ascending)
pub fn summarize(results: &[TradeResult]) -> Result<Vec<YearlySummary>, CalculationError> {
    results
        .iter()
        .into_group_map_by(|r| r.transaction.year())
        .into_iter()
        .sorted_by_key(|(year, _)| *year)
        .map(|(year, rows)| -> Result<YearlySummary, CalculationError> {
            let (capital, income): (Vec<_>, Vec<_>) = rows
                .into_iter()
                .filter(|r| r.transaction.kind.is_capital() || r.transaction.kind.is_income())
                .partition(|r| r.transaction.kind.is_capital());

            let capital_gains = checked_sum(capital.iter().copied())?;
            let misc_income = checked_sum(income.iter().copied())?;
            let total_profit_loss = checked_sum(capital.iter().chain(&income).copied())?;

            Ok(YearlySummary {
                year,
                capital_gains,
                disposal_count: capital.len(),
                misc_income,
                income_count: income.len(),
                total_profit_loss,
            })
        })
        .collect()
}
