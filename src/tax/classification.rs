//! Transaction kind classification shared by both cost basis methods
//!
//! Every kind maps to a direction (does it add to or remove from the held
//! quantity) and a tax treatment. The methods then pick the subset of kinds
//! they accept; those subsets differ on purpose and are declared next to each
//! calculator.

use rust_decimal::Decimal;

use crate::error::CalculationError;
use crate::models::{NormalizedTransaction, TransactionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Acquisition,
    Disposal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Taxation {
    /// No taxable event
    None,
    /// Capital gain/loss realized on disposal
    Capital,
    /// Misc. income recognized at market value on receipt
    Income,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindRole {
    pub direction: Direction,
    pub taxation: Taxation,
}

impl KindRole {
    const fn new(direction: Direction, taxation: Taxation) -> Self {
        Self {
            direction,
            taxation,
        }
    }

    pub fn is_acquisition(&self) -> bool {
        self.direction == Direction::Acquisition
    }
}

impl TransactionKind {
    pub fn role(&self) -> KindRole {
        use Direction::*;
        use Taxation as T;

        match self {
            TransactionKind::Buy => KindRole::new(Acquisition, T::None),
            TransactionKind::Sell => KindRole::new(Disposal, T::Capital),
            TransactionKind::Airdrop | TransactionKind::Fork | TransactionKind::Reward => {
                KindRole::new(Acquisition, T::Income)
            }
            TransactionKind::TransferIn => KindRole::new(Acquisition, T::None),
            TransactionKind::TransferOut => KindRole::new(Disposal, T::None),
            TransactionKind::Swap => KindRole::new(Disposal, T::Capital),
            TransactionKind::LiquidityAdd => KindRole::new(Disposal, T::None),
            // Taxed later, on the eventual disposal of the withdrawn tokens
            TransactionKind::LiquidityRemove => KindRole::new(Acquisition, T::None),
            TransactionKind::Lending => KindRole::new(Disposal, T::None),
            TransactionKind::NftBuy => KindRole::new(Acquisition, T::None),
            TransactionKind::NftSell => KindRole::new(Disposal, T::Capital),
        }
    }

    pub fn is_income(&self) -> bool {
        self.role().taxation == Taxation::Income
    }

    pub fn is_capital(&self) -> bool {
        self.role().taxation == Taxation::Capital
    }
}

fn gross_value(tx: &NormalizedTransaction) -> Result<Decimal, CalculationError> {
    tx.gross_value()
        .ok_or_else(|| CalculationError::overflow(&tx.symbol))
}

/// Cost added to the basis by an acquisition, `None` for disposals.
///
/// - buy / nft_buy: `amount * price + fee`
/// - airdrop / fork / reward / liquidity_remove: `amount * price`
/// - transfer_in: `amount * price` when a price is given, otherwise zero
pub fn acquisition_cost(tx: &NormalizedTransaction) -> Result<Option<Decimal>, CalculationError> {
    let cost = match tx.kind {
        TransactionKind::Buy | TransactionKind::NftBuy => gross_value(tx)?
            .checked_add(tx.fee)
            .ok_or_else(|| CalculationError::overflow(&tx.symbol))?,
        TransactionKind::Airdrop
        | TransactionKind::Fork
        | TransactionKind::Reward
        | TransactionKind::LiquidityRemove => gross_value(tx)?,
        TransactionKind::TransferIn if tx.price > Decimal::ZERO => gross_value(tx)?,
        TransactionKind::TransferIn => Decimal::ZERO,
        TransactionKind::Sell
        | TransactionKind::TransferOut
        | TransactionKind::Swap
        | TransactionKind::LiquidityAdd
        | TransactionKind::Lending
        | TransactionKind::NftSell => return Ok(None),
    };
    Ok(Some(cost))
}

/// Misc. income recognized at receipt: `amount * price`
pub fn income_value(tx: &NormalizedTransaction) -> Result<Decimal, CalculationError> {
    gross_value(tx)
}

/// Proceeds of a taxable disposal net of fees: `amount * price - fee`
pub fn disposal_revenue(tx: &NormalizedTransaction) -> Result<Decimal, CalculationError> {
    gross_value(tx)?
        .checked_sub(tx.fee)
        .ok_or_else(|| CalculationError::overflow(&tx.symbol))
}

/// Realized gain of a taxable disposal against `average_cost`
pub fn realized_gain(
    tx: &NormalizedTransaction,
    average_cost: Decimal,
) -> Result<Decimal, CalculationError> {
    let cost_basis = tx
        .amount
        .checked_mul(average_cost)
        .ok_or_else(|| CalculationError::overflow(&tx.symbol))?;
    disposal_revenue(tx)?
        .checked_sub(cost_basis)
        .ok_or_else(|| CalculationError::overflow(&tx.symbol))
}
