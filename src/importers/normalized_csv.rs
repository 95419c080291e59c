use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use super::{build_transaction, parse_amount};
use crate::models::NormalizedTransaction;

/// Parse a normalized transaction CSV file
///
/// Expected header (any order, case-insensitive):
/// `timestamp,exchange,symbol,type,amount,price,fee`. `fee` may be omitted
/// and `kind` is accepted in place of `type`.
pub fn parse_transactions_csv<P: AsRef<Path>>(file_path: P) -> Result<Vec<NormalizedTransaction>> {
    let path = file_path.as_ref();
    info!("Parsing normalized CSV file: {:?}", path);

    let file = std::fs::File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    read_transactions_csv(file)
}

/// Same as `parse_transactions_csv`, from any reader
pub fn read_transactions_csv<R: Read>(reader: R) -> Result<Vec<NormalizedTransaction>> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .context("Failed to read CSV headers")?
        .clone();

    debug!("CSV headers: {:?}", headers);

    let column_mapping = find_columns(&headers)?;
    debug!("Column mapping: {:?}", column_mapping);

    let mut transactions = Vec::new();

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let record = result.with_context(|| format!("Failed to read CSV record on line {}", line))?;

        if record.iter().all(|field| field.is_empty()) {
            continue;
        }

        let transaction = parse_csv_row(&record, &column_mapping)
            .with_context(|| format!("Invalid transaction on line {}", line))?;
        transactions.push(transaction);
    }

    info!("Successfully parsed {} transactions from CSV", transactions.len());
    Ok(transactions)
}

#[derive(Debug)]
struct CsvColumnMapping {
    timestamp: usize,
    exchange: Option<usize>,
    symbol: usize,
    kind: usize,
    amount: usize,
    price: usize,
    fee: Option<usize>,
}

fn find_columns(headers: &StringRecord) -> Result<CsvColumnMapping> {
    let mut timestamp_idx = None;
    let mut exchange_idx = None;
    let mut symbol_idx = None;
    let mut kind_idx = None;
    let mut amount_idx = None;
    let mut price_idx = None;
    let mut fee_idx = None;

    for (idx, header) in headers.iter().enumerate() {
        let text = header.trim().trim_start_matches('\u{feff}').to_lowercase();

        match text.as_str() {
            "timestamp" | "datetime" | "date" => timestamp_idx = Some(idx),
            "exchange" | "source" => exchange_idx = Some(idx),
            "symbol" | "pair" => symbol_idx = Some(idx),
            "type" | "kind" => kind_idx = Some(idx),
            "amount" | "quantity" => amount_idx = Some(idx),
            "price" => price_idx = Some(idx),
            "fee" | "fees" => fee_idx = Some(idx),
            _ => {}
        }
    }

    Ok(CsvColumnMapping {
        timestamp: timestamp_idx.ok_or_else(|| anyhow!("Timestamp column not found"))?,
        exchange: exchange_idx,
        symbol: symbol_idx.ok_or_else(|| anyhow!("Symbol column not found"))?,
        kind: kind_idx.ok_or_else(|| anyhow!("Type column not found"))?,
        amount: amount_idx.ok_or_else(|| anyhow!("Amount column not found"))?,
        price: price_idx.ok_or_else(|| anyhow!("Price column not found"))?,
        fee: fee_idx,
    })
}

fn parse_csv_row(record: &StringRecord, mapping: &CsvColumnMapping) -> Result<NormalizedTransaction> {
    let field = |idx: usize| record.get(idx).unwrap_or("");

    let amount = parse_amount("amount", field(mapping.amount), false)?;
    let price = parse_amount("price", field(mapping.price), true)?;
    let fee = match mapping.fee {
        Some(idx) => parse_amount("fee", field(idx), true)?,
        None => rust_decimal::Decimal::ZERO,
    };

    build_transaction(
        field(mapping.timestamp),
        mapping.exchange.map(field).unwrap_or(""),
        field(mapping.symbol),
        field(mapping.kind),
        amount,
        price,
        fee,
    )
}
