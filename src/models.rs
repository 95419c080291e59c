use chrono::{Datelike, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CalculationError;

/// Transaction kinds produced by the exchange/protocol adapters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum TransactionKind {
    Buy,
    Sell,
    Airdrop,         // Free distribution, misc. income at receipt
    Fork,            // Hard fork coins, misc. income at receipt
    Reward,          // Staking/mining rewards, misc. income at receipt
    TransferIn,      // From another exchange/wallet, not taxable
    TransferOut,     // To another exchange/wallet, not taxable
    Swap,            // DeFi token swap, disposal of the given symbol
    LiquidityAdd,    // Deposit into a pool
    LiquidityRemove, // Withdrawal from a pool
    Lending,         // Lent out (Aave etc.)
    NftBuy,
    NftSell,
}

impl TransactionKind {
    pub const ALL: [TransactionKind; 13] = [
        TransactionKind::Buy,
        TransactionKind::Sell,
        TransactionKind::Airdrop,
        TransactionKind::Fork,
        TransactionKind::Reward,
        TransactionKind::TransferIn,
        TransactionKind::TransferOut,
        TransactionKind::Swap,
        TransactionKind::LiquidityAdd,
        TransactionKind::LiquidityRemove,
        TransactionKind::Lending,
        TransactionKind::NftBuy,
        TransactionKind::NftSell,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Buy => "buy",
            TransactionKind::Sell => "sell",
            TransactionKind::Airdrop => "airdrop",
            TransactionKind::Fork => "fork",
            TransactionKind::Reward => "reward",
            TransactionKind::TransferIn => "transfer_in",
            TransactionKind::TransferOut => "transfer_out",
            TransactionKind::Swap => "swap",
            TransactionKind::LiquidityAdd => "liquidity_add",
            TransactionKind::LiquidityRemove => "liquidity_remove",
            TransactionKind::Lending => "lending",
            TransactionKind::NftBuy => "nft_buy",
            TransactionKind::NftSell => "nft_sell",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = CalculationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        TransactionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| CalculationError::UnknownTransactionKind(s.trim().to_string()))
    }
}

impl TryFrom<String> for TransactionKind {
    type Error = CalculationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Normalized transaction record (common output of every adapter)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedTransaction {
    pub timestamp: NaiveDateTime,
    pub exchange: String,
    pub symbol: String, // e.g. "BTC/JPY"
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub price: Decimal, // Market price at receipt for income events, 0 for plain transfers
    #[serde(default)]
    pub fee: Decimal,
}

impl NormalizedTransaction {
    pub fn new(
        timestamp: NaiveDateTime,
        exchange: impl Into<String>,
        symbol: impl Into<String>,
        kind: TransactionKind,
        amount: Decimal,
        price: Decimal,
        fee: Decimal,
    ) -> Self {
        Self {
            timestamp,
            exchange: exchange.into(),
            symbol: symbol.into(),
            kind,
            amount,
            price,
            fee,
        }
    }

    /// Calendar year used to bucket the total average method
    pub fn year(&self) -> i32 {
        self.timestamp.year()
    }

    /// amount * price, `None` when the product overflows
    pub fn gross_value(&self) -> Option<Decimal> {
        self.amount.checked_mul(self.price)
    }
}

/// Per-transaction result of a cost basis calculation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TradeResult {
    #[serde(flatten)]
    pub transaction: NormalizedTransaction,
    /// Realized taxable amount (capital gain/loss or misc. income), 0 otherwise
    pub profit_loss: Decimal,
    /// Moving average method: average cost after this transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_cost_after: Option<Decimal>,
    /// Total average method: yearly average cost applied to this transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_cost_used: Option<Decimal>,
}

impl TradeResult {
    /// Whichever cost basis value the producing method recorded
    pub fn average_cost(&self) -> Decimal {
        self.average_cost_after
            .or(self.average_cost_used)
            .unwrap_or(Decimal::ZERO)
    }
}
