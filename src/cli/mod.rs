//! CLI interface for gap-fill
//!
//! Provides subcommands for:
//! - `scan`: Rank today's gaps across a watchlist
//! - `backtest`: Replay the gap-fill strategy on one symbol
//! - `detail`: Everything known about one symbol
//! - `config`: Show the effective configuration

mod backtest;
mod detail;
mod scan;

pub use backtest::BacktestArgs;
pub use detail::DetailArgs;
pub use scan::ScanArgs;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::config::Config;
use crate::feed::{AlpacaConfig, AlpacaFeed};
use crate::scanner::{GapScanner, ScanSettings};
use crate::sentiment::{self, SentimentSource};

#[derive(Parser, Debug)]
#[command(name = "gap-fill")]
#[command(about = "Opening gap scanner and gap-fill backtester for US equities")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Rank gapping symbols from the watchlist
    Scan(ScanArgs),
    /// Backtest the gap-fill strategy on one symbol
    Backtest(BacktestArgs),
    /// Gap, fill statistics, sentiment and backtest for one symbol
    Detail(DetailArgs),
    /// Show the effective configuration
    Config,
}

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Scanner wired to Alpaca bars and the configured sentiment source
pub type LiveScanner = GapScanner<AlpacaFeed, Box<dyn SentimentSource>>;

/// Build the live scanner from config and environment credentials
pub fn live_scanner(config: &Config, settings: ScanSettings) -> anyhow::Result<LiveScanner> {
    let feed = AlpacaFeed::new(AlpacaConfig::from_env(&config.data)?)?;
    let sentiment = sentiment::from_config(&config.sentiment);
    Ok(GapScanner::new(feed, sentiment, settings))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
