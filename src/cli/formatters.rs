//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of calculation from presentation.

use colored::Colorize;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tabled::{
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use zeitan::config::Config;
use zeitan::tax::{CalculationReport, HoldingState, YearlyAverageCost, YearlySummary};
use zeitan::utils::{format_currency_with_width, format_quantity};

/// Currency display settings taken from the config file
#[derive(Debug, Clone)]
pub struct DisplayOptions {
    pub symbol: String,
    pub decimal_places: u32,
}

impl DisplayOptions {
    pub fn money(&self, value: Decimal) -> String {
        format_currency_with_width(value, 0, &self.symbol, self.decimal_places)
    }

    fn signed_money(&self, value: Decimal) -> String {
        let text = self.money(value);
        if value > Decimal::ZERO {
            text.green().to_string()
        } else if value < Decimal::ZERO {
            text.red().to_string()
        } else {
            text
        }
    }
}

impl From<&Config> for DisplayOptions {
    fn from(config: &Config) -> Self {
        Self {
            symbol: config.currency_symbol.clone(),
            decimal_places: config.decimal_places,
        }
    }
}

/// Format a calculation report for JSON output
pub fn format_report_json(report: &CalculationReport) -> String {
    serde_json::to_string_pretty(report)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format a calculation report for terminal table output
pub fn format_report_table(report: &CalculationReport, opts: &DisplayOptions) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "\n{} Results ({})\n\n",
        "📊".cyan().bold(),
        report.method
    ));

    #[derive(Tabled)]
    struct ResultRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Exchange")]
        exchange: String,
        #[tabled(rename = "Symbol")]
        symbol: String,
        #[tabled(rename = "Type")]
        kind: String,
        #[tabled(rename = "Amount")]
        amount: String,
        #[tabled(rename = "Price")]
        price: String,
        #[tabled(rename = "Fee")]
        fee: String,
        #[tabled(rename = "P&L")]
        profit_loss: String,
        #[tabled(rename = "Avg Cost")]
        average_cost: String,
    }

    let rows: Vec<ResultRow> = report
        .results
        .iter()
        .map(|r| {
            let tx = &r.transaction;
            ResultRow {
                date: tx.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                exchange: tx.exchange.clone(),
                symbol: tx.symbol.clone(),
                kind: tx.kind.to_string(),
                amount: format_quantity(tx.amount),
                price: opts.money(tx.price),
                fee: opts.money(tx.fee),
                profit_loss: if r.profit_loss.is_zero() {
                    "-".to_string()
                } else {
                    opts.signed_money(r.profit_loss)
                },
                average_cost: opts.money(r.average_cost()),
            }
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    // Right-align numeric columns (Amount onwards)
    table.modify(Columns::new(4..), Alignment::right());
    output.push_str(&table.to_string());

    output.push_str(&format_yearly_summary(&report.yearly_summary, opts));

    output.push_str(&format!(
        "\n{:<20} {}\n",
        "Total P&L:".bold(),
        opts.signed_money(report.total_profit_loss)
    ));

    output
}

fn format_yearly_summary(summary: &[YearlySummary], opts: &DisplayOptions) -> String {
    if summary.is_empty() {
        return String::new();
    }

    #[derive(Tabled)]
    struct SummaryRow {
        #[tabled(rename = "Year")]
        year: i32,
        #[tabled(rename = "Capital Gains")]
        capital_gains: String,
        #[tabled(rename = "Disposals")]
        disposals: usize,
        #[tabled(rename = "Misc. Income")]
        misc_income: String,
        #[tabled(rename = "Income Events")]
        income_events: usize,
        #[tabled(rename = "Total")]
        total: String,
    }

    let rows: Vec<SummaryRow> = summary
        .iter()
        .map(|s| SummaryRow {
            year: s.year,
            capital_gains: opts.money(s.capital_gains),
            disposals: s.disposal_count,
            misc_income: opts.money(s.misc_income),
            income_events: s.income_count,
            total: opts.money(s.total_profit_loss),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::rounded());
    table.modify(Columns::new(1..), Alignment::right());

    format!("\n\n{} Yearly Summary\n\n{}\n", "📈".cyan().bold(), table)
}

/// Holdings left after a moving average run
pub fn format_holdings_table(holdings: &BTreeMap<String, HoldingState>, opts: &DisplayOptions) -> String {
    #[derive(Tabled)]
    struct HoldingRow {
        #[tabled(rename = "Symbol")]
        symbol: String,
        #[tabled(rename = "Amount")]
        amount: String,
        #[tabled(rename = "Avg Cost")]
        average_cost: String,
        #[tabled(rename = "Book Value")]
        book_value: String,
    }

    let rows: Vec<HoldingRow> = holdings
        .values()
        .map(|h| HoldingRow {
            symbol: h.symbol.clone(),
            amount: format_quantity(h.amount),
            average_cost: opts.money(h.average_cost),
            book_value: h
                .amount
                .checked_mul(h.average_cost)
                .map(|v| opts.money(v))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());

    format!("\n{} Holdings (moving average)\n\n{}\n", "💼".cyan().bold(), table)
}

pub fn format_holdings_json(holdings: &BTreeMap<String, HoldingState>) -> String {
    let list: Vec<&HoldingState> = holdings.values().collect();
    serde_json::to_string_pretty(&list)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Yearly averages from a total average run
pub fn format_averages_table(
    averages: &BTreeMap<(i32, String), YearlyAverageCost>,
    opts: &DisplayOptions,
) -> String {
    #[derive(Tabled)]
    struct AverageRow {
        #[tabled(rename = "Year")]
        year: i32,
        #[tabled(rename = "Symbol")]
        symbol: String,
        #[tabled(rename = "Acquired")]
        amount: String,
        #[tabled(rename = "Total Cost")]
        cost: String,
        #[tabled(rename = "Avg Cost")]
        average_cost: String,
    }

    let rows: Vec<AverageRow> = averages
        .values()
        .map(|a| AverageRow {
            year: a.year,
            symbol: a.symbol.clone(),
            amount: format_quantity(a.total_purchase_amount),
            cost: opts.money(a.total_purchase_cost),
            average_cost: opts.money(a.average_cost),
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(2..), Alignment::right());

    format!("\n{} Yearly average cost (total average)\n\n{}\n", "📅".cyan().bold(), table)
}

pub fn format_averages_json(averages: &BTreeMap<(i32, String), YearlyAverageCost>) -> String {
    let list: Vec<&YearlyAverageCost> = averages.values().collect();
    serde_json::to_string_pretty(&list)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format empty input message
pub fn format_empty_input(file: &std::path::Path) -> String {
    format!(
        "{} No transactions found in {}\n",
        "ℹ".blue().bold(),
        file.display().to_string().bold()
    )
}
