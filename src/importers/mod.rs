// Import module - normalized transaction files (CSV, JSON)
//
// Per-exchange adapters produce these files; this module only reads the
// normalized shape and validates it before it reaches the calculators.

pub mod normalized_csv;
pub mod normalized_json;

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::path::Path;
use tracing::info;

use crate::models::{NormalizedTransaction, TransactionKind};

/// Load normalized transactions, choosing the parser by file extension
pub fn load_transactions<P: AsRef<Path>>(file_path: P) -> Result<Vec<NormalizedTransaction>> {
    let path = file_path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .ok_or_else(|| anyhow!("File has no extension: {:?}", path))?
        .to_lowercase();

    info!("Loading transactions: {:?} (type: {})", path, extension);

    match extension.as_str() {
        "csv" => normalized_csv::parse_transactions_csv(path),
        "json" => normalized_json::parse_transactions_json(path),
        _ => Err(anyhow!(
            "Unsupported file format: {}. Supported formats: .csv, .json",
            extension
        )),
    }
}

/// Parse a timestamp in any of the accepted layouts.
///
/// RFC 3339 timestamps keep their local wall-clock time and drop the offset.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_local());
    }

    for format in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Ok(dt);
            }
        }
    }

    Err(anyhow!("Invalid timestamp: {}", value))
}

/// Parse a non-negative decimal field; empty means zero when `allow_empty`
pub(crate) fn parse_amount(field: &str, value: &str, allow_empty: bool) -> Result<Decimal> {
    let cleaned = value.trim().replace(',', "");
    if cleaned.is_empty() {
        if allow_empty {
            return Ok(Decimal::ZERO);
        }
        bail!("Missing {}", field);
    }

    let parsed = cleaned
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| anyhow!("Invalid {}: {}", field, value))?;

    ensure_non_negative(field, parsed)
}

pub(crate) fn ensure_non_negative(field: &str, value: Decimal) -> Result<Decimal> {
    if value < Decimal::ZERO {
        bail!("Negative {}: {}", field, value);
    }
    Ok(value)
}

/// Build a validated transaction from already-parsed fields
pub(crate) fn build_transaction(
    timestamp: &str,
    exchange: &str,
    symbol: &str,
    kind: &str,
    amount: Decimal,
    price: Decimal,
    fee: Decimal,
) -> Result<NormalizedTransaction> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        bail!("Missing symbol");
    }

    let kind: TransactionKind = kind.parse()?;

    Ok(NormalizedTransaction::new(
        parse_timestamp(timestamp)?,
        exchange.trim(),
        symbol,
        kind,
        ensure_non_negative("amount", amount)?,
        ensure_non_negative("price", price)?,
        ensure_non_negative("fee", fee)?,
    ))
}
