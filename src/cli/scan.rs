//! Scan command implementation

use clap::Args;

use super::{live_scanner, print_json, OutputFormat};
use crate::config::Config;
use crate::scanner::{GapScanRecord, ScanSettings};

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Comma-separated symbols (defaults to the configured watchlist)
    #[arg(long, value_delimiter = ',')]
    pub symbols: Vec<String>,

    /// Minimum |gap| in percent
    #[arg(long)]
    pub min_gap: Option<f64>,

    /// Maximum |gap| in percent
    #[arg(long)]
    pub max_gap: Option<f64>,

    /// Maximum records returned
    #[arg(long)]
    pub limit: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl ScanArgs {
    fn settings(&self, config: &Config) -> ScanSettings {
        let mut settings = ScanSettings::from(config);
        if let Some(min_gap) = self.min_gap {
            settings.min_gap_pct = min_gap;
        }
        if let Some(max_gap) = self.max_gap {
            settings.max_gap_pct = max_gap;
        }
        if let Some(limit) = self.limit {
            settings.limit = limit;
        }
        settings
    }

    fn symbols(&self, config: &Config) -> Vec<String> {
        let symbols = if self.symbols.is_empty() {
            &config.scanner.watchlist
        } else {
            &self.symbols
        };
        symbols
            .iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let symbols = self.symbols(config);
        let scanner = live_scanner(config, self.settings(config))?;

        tracing::info!(symbols = symbols.len(), "Scanning for gaps");
        let records = scanner.scan(&symbols).await;

        match self.format {
            OutputFormat::Json => print_json(&records)?,
            OutputFormat::Table => print!("{}", format_table(&records)),
        }
        Ok(())
    }
}

fn format_table(records: &[GapScanRecord]) -> String {
    if records.is_empty() {
        return "No qualifying gaps\n".to_string();
    }

    let mut out = format!(
        "{:<8} {:>8} {:<5} {:>10} {:>7} {:>6} {:>6} {:<6} {:>6}\n",
        "SYMBOL", "GAP %", "DIR", "PRICE", "VOL X", "FILL", "BARS", "CONV", "SENT"
    );
    out.push_str(&"─".repeat(72));
    out.push('\n');

    for r in records {
        out.push_str(&format!(
            "{:<8} {:>+8.2} {:<5} {:>10.2} {:>7.2} {:>5.0}% {:>6.1} {:<6} {:>+6.2}\n",
            r.symbol,
            r.gap_percent,
            r.direction.to_string(),
            r.price,
            r.volume_ratio,
            r.fill_probability * 100.0,
            r.avg_fill_time,
            r.conviction.as_str(),
            r.sentiment,
        ));
        if !r.reasons.is_empty() {
            out.push_str(&format!("         {}\n", r.reasons.join("; ")));
        }
    }
    out
}
