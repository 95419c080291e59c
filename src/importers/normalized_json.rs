use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use super::build_transaction;
use crate::models::NormalizedTransaction;

/// Loosely-typed record; timestamps go through the same flexible parser as CSV
#[derive(Debug, Deserialize)]
struct RawTransaction {
    timestamp: String,
    #[serde(default)]
    exchange: String,
    symbol: String,
    #[serde(alias = "kind", rename = "type")]
    kind: String,
    amount: Decimal,
    #[serde(default)]
    price: Decimal,
    #[serde(default)]
    fee: Decimal,
}

/// Parse a JSON array of normalized transactions
pub fn parse_transactions_json<P: AsRef<Path>>(file_path: P) -> Result<Vec<NormalizedTransaction>> {
    let path = file_path.as_ref();
    info!("Parsing normalized JSON file: {:?}", path);

    let contents =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    read_transactions_json(&contents)
}

pub fn read_transactions_json(contents: &str) -> Result<Vec<NormalizedTransaction>> {
    let raw: Vec<RawTransaction> =
        serde_json::from_str(contents).context("Failed to parse transaction JSON")?;

    let transactions = raw
        .into_iter()
        .enumerate()
        .map(|(idx, r)| {
            build_transaction(
                &r.timestamp,
                &r.exchange,
                &r.symbol,
                &r.kind,
                r.amount,
                r.price,
                r.fee,
            )
            .with_context(|| format!("Invalid transaction at index {}", idx))
        })
        .collect::<Result<Vec<_>>>()?;

    info!("Successfully parsed {} transactions from JSON", transactions.len());
    Ok(transactions)
}
