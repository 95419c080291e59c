mod cli;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use colored::Colorize;
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::formatters::{self, DisplayOptions};
use cli::{Cli, Commands};
use zeitan::config::Config;
use zeitan::tax::{CalculationMethod, MovingAverageCalculator, TotalAverageCalculator};
use zeitan::{importers, reports, CostBasisCalculator, NormalizedTransaction};

fn main() -> Result<()> {
    // Initialize logging (stderr keeps stdout clean for --json)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let config = Config::load(cli.config.as_deref())?;
    let opts = DisplayOptions::from(&config);

    match cli.command {
        Commands::Calculate {
            file,
            method,
            export,
        } => {
            let method = match method {
                Some(m) => m.parse::<CalculationMethod>().map_err(|e| anyhow!(e))?,
                None => config.default_method,
            };
            handle_calculate(&file, method, export.as_deref(), cli.json, &opts)
        }
        Commands::Holdings { file } => handle_holdings(&file, cli.json, &opts),
        Commands::Averages { file } => handle_averages(&file, cli.json, &opts),
    }
}

fn load(file: &Path) -> Result<Vec<NormalizedTransaction>> {
    importers::load_transactions(file)
        .with_context(|| format!("Failed to load transactions from {}", file.display()))
}

/// Handle calculate command
fn handle_calculate(
    file: &Path,
    method: CalculationMethod,
    export: Option<&Path>,
    json_output: bool,
    opts: &DisplayOptions,
) -> Result<()> {
    info!("Calculating {} with {}", file.display(), method);

    let transactions = load(file)?;
    let report = zeitan::calculate(method, &transactions)
        .with_context(|| format!("Calculation failed for {}", file.display()))?;

    if let Some(path) = export {
        reports::export_results_csv(path, &report.results)?;
    }

    if json_output {
        println!("{}", formatters::format_report_json(&report));
        return Ok(());
    }

    if transactions.is_empty() {
        print!("{}", formatters::format_empty_input(file));
        return Ok(());
    }

    println!("{}", formatters::format_report_table(&report, opts));

    if let Some(path) = export {
        println!("{} Results exported to: {}\n", "✓".green().bold(), path.display());
    }

    Ok(())
}

/// Handle holdings command
fn handle_holdings(file: &Path, json_output: bool, opts: &DisplayOptions) -> Result<()> {
    let transactions = load(file)?;

    let mut calculator = MovingAverageCalculator::new();
    calculator
        .calculate(&transactions)
        .with_context(|| format!("Calculation failed for {}", file.display()))?;
    let holdings = calculator.holdings();

    if json_output {
        println!("{}", formatters::format_holdings_json(&holdings));
    } else if holdings.is_empty() {
        print!("{}", formatters::format_empty_input(file));
    } else {
        println!("{}", formatters::format_holdings_table(&holdings, opts));
    }

    Ok(())
}

/// Handle averages command
fn handle_averages(file: &Path, json_output: bool, opts: &DisplayOptions) -> Result<()> {
    let transactions = load(file)?;

    let mut calculator = TotalAverageCalculator::new();
    calculator
        .calculate(&transactions)
        .with_context(|| format!("Calculation failed for {}", file.display()))?;
    let averages = calculator.yearly_average_costs();

    if json_output {
        println!("{}", formatters::format_averages_json(&averages));
    } else if averages.is_empty() {
        print!("{}", formatters::format_empty_input(file));
    } else {
        println!("{}", formatters::format_averages_table(&averages, opts));
    }

    Ok(())
}
