// Reports module - CSV export of calculation results

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::models::TradeResult;

const HEADER: [&str; 10] = [
    "timestamp",
    "exchange",
    "symbol",
    "type",
    "amount",
    "price",
    "fee",
    "profit_loss",
    "average_cost_after",
    "average_cost_used",
];

/// Write one CSV row per result. The cost column the method did not
/// produce is left empty.
pub fn write_results_csv<W: Write>(writer: W, results: &[TradeResult]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(HEADER)?;

    for r in results {
        let tx = &r.transaction;
        csv.write_record([
            tx.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            tx.exchange.clone(),
            tx.symbol.clone(),
            tx.kind.as_str().to_string(),
            tx.amount.normalize().to_string(),
            tx.price.normalize().to_string(),
            tx.fee.normalize().to_string(),
            r.profit_loss.normalize().to_string(),
            r.average_cost_after
                .map(|v| v.normalize().to_string())
                .unwrap_or_default(),
            r.average_cost_used
                .map(|v| v.normalize().to_string())
                .unwrap_or_default(),
        ])?;
    }

    csv.flush()?;
    Ok(())
}

/// Export results to a CSV file at `path`
pub fn export_results_csv<P: AsRef<Path>>(path: P, results: &[TradeResult]) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    write_results_csv(file, results).with_context(|| format!("Failed to write {:?}", path))?;

    info!("Exported {} results to {:?}", results.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NormalizedTransaction, TransactionKind};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn sample() -> Vec<TradeResult> {
        let tx = NormalizedTransaction::new(
            NaiveDate::from_ymd_opt(2024, 2, 1)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            "bitflyer",
            "BTC/JPY",
            TransactionKind::Sell,
            dec!(1.0),
            dec!(5500000),
            dec!(1000),
        );
        vec![TradeResult {
            transaction: tx,
            profit_loss: dec!(498000.00),
            average_cost_after: Some(dec!(5001000)),
            average_cost_used: None,
        }]
    }

    #[test]
    fn test_csv_export() {
        let mut buf = Vec::new();
        write_results_csv(&mut buf, &sample()).unwrap();
        let csv = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], HEADER.join(","));
        assert_eq!(
            lines[1],
            "2024-02-01 10:00:00,bitflyer,BTC/JPY,sell,1,5500000,1000,498000,5001000,"
        );
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.csv");
        export_results_csv(&path, &sample()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("average_cost_used"));
        assert!(contents.contains("BTC/JPY"));
    }
}
