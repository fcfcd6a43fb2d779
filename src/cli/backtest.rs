//! Backtest command implementation

use chrono::Utc;
use clap::Args;
use rust_decimal::Decimal;
use std::path::PathBuf;

use super::{live_scanner, print_json, OutputFormat};
use crate::backtest::ExecutionKind;
use crate::config::Config;
use crate::data::TradeExporter;
use crate::scanner::{BacktestReport, ScanSettings};

#[derive(Args, Debug)]
pub struct BacktestArgs {
    /// Ticker symbol
    pub symbol: String,

    /// Calendar days of history to replay
    #[arg(long)]
    pub days: Option<u32>,

    /// Initial capital
    #[arg(long)]
    pub capital: Option<Decimal>,

    /// Execution model
    #[arg(long, value_enum)]
    pub execution: Option<ExecutionKind>,

    /// Directory for Parquet trade and equity exports
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl BacktestArgs {
    fn settings(&self, config: &Config) -> ScanSettings {
        let mut settings = ScanSettings::from(config);
        if let Some(capital) = self.capital {
            settings.backtest.initial_capital = capital;
        }
        if let Some(execution) = self.execution {
            settings.backtest.execution = execution;
        }
        if let Some(days) = self.days {
            settings.backtest_days = days;
        }
        settings
    }

    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let symbol = self.symbol.trim().to_uppercase();
        let settings = self.settings(config);
        let days = settings.backtest_days;
        let execution = settings.backtest.execution;
        let min_bars = settings.backtest.min_bars;
        let scanner = live_scanner(config, settings)?;

        tracing::info!(symbol = %symbol, days, %execution, "Running backtest");
        let report = scanner.backtest(&symbol, days).await?;

        if let Some(dir) = &self.output {
            let paths = TradeExporter::new(dir).export(&symbol, &report.result, Utc::now())?;
            if let Some(path) = &paths.trades {
                tracing::info!(path = %path.display(), "Trades written");
            }
        }

        match self.format {
            OutputFormat::Json => print_json(&report.record)?,
            OutputFormat::Table => print!("{}", format_report(&symbol, execution, min_bars, &report)),
        }
        Ok(())
    }
}

fn format_report(
    symbol: &str,
    execution: ExecutionKind,
    min_bars: usize,
    report: &BacktestReport,
) -> String {
    let mut out = format!(
        "{} {} to {} ({} execution)\n",
        symbol,
        report.record.start_date.format("%Y-%m-%d"),
        report.record.end_date.format("%Y-%m-%d"),
        execution
    );
    if report.result.insufficient_data {
        out.push_str(&format!(
            "Insufficient data: at least {} usable bars required, no trades simulated\n",
            min_bars
        ));
    } else {
        out.push_str(&report.result.summary.format_table());
    }
    out
}
