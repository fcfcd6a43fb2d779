//! Detail command implementation

use clap::Args;

use super::{live_scanner, print_json, OutputFormat};
use crate::config::Config;
use crate::scanner::{ScanSettings, SymbolDetail};

#[derive(Args, Debug)]
pub struct DetailArgs {
    /// Ticker symbol
    pub symbol: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl DetailArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let symbol = self.symbol.trim().to_uppercase();
        let scanner = live_scanner(config, ScanSettings::from(config))?;
        let detail = scanner.detail(&symbol).await?;

        match self.format {
            OutputFormat::Json => print_json(&detail)?,
            OutputFormat::Table => print!("{}", format_detail(&detail)),
        }
        Ok(())
    }
}

fn format_detail(d: &SymbolDetail) -> String {
    let gap = match &d.latest_gap {
        Some(g) => format!(
            "{:+.2}% {} (open {:.2}, prev close {:.2}, fills at {:.2})",
            g.gap_percent, g.direction, g.open, g.previous_close, g.reference_level
        ),
        None => "none".to_string(),
    };

    format!(
        r#"
{symbol} @ {price:.2}
───────────────────────────────────────────────────────
Latest Gap:       {gap}
Fill Rate:        {fill:.0}% of {total} gaps{default}
Avg Fill Time:    {fill_time:.1} bars
Sentiment:        {sentiment:+.2} ({label})
Backtest:         {trades} trades, {win:.1}% win, {ret:+.2}% return, Sharpe {sharpe:.2}
Recommendation:   {action} ({confidence})
"#,
        symbol = d.symbol,
        price = d.price,
        gap = gap,
        fill = d.probability.fill_rate * 100.0,
        total = d.probability.total_gaps,
        default = if d.probability.is_default { " (default)" } else { "" },
        fill_time = d.probability.avg_fill_time,
        sentiment = d.sentiment.score,
        label = d.sentiment.label.as_str(),
        trades = d.backtest.total_trades,
        win = d.backtest.win_rate,
        ret = d.backtest.total_return,
        sharpe = d.backtest.sharpe_ratio,
        action = d.recommendation.action,
        confidence = d.recommendation.confidence,
    )
}
