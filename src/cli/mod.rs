use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod formatters;

#[derive(Parser)]
#[command(name = "zeitan")]
#[command(
    version,
    about = "Crypto-asset capital gains calculator (moving average / total average)"
)]
#[command(
    long_about = "Compute realized capital gains and misc. income (airdrops, forks, staking rewards) from normalized crypto-asset transaction files, using the moving average or the yearly total average cost method."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Path to config.toml (defaults to $ZEITAN_CONFIG or the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Calculate profit/loss for every transaction in a file
    Calculate {
        /// Normalized transaction file (.csv or .json)
        file: PathBuf,

        /// Cost basis method: moving_average or total_average
        #[arg(short, long)]
        method: Option<String>,

        /// Also write the per-transaction results to this CSV file
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// Show final holdings and average cost per symbol (moving average method)
    Holdings {
        /// Normalized transaction file (.csv or .json)
        file: PathBuf,
    },

    /// Show yearly average acquisition cost per symbol (total average method)
    Averages {
        /// Normalized transaction file (.csv or .json)
        file: PathBuf,
    },
}
