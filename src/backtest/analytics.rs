//! Backtest analytics and reporting

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{BacktestTrade, EquityPoint};

/// Trading days per year, for annualising the Sharpe ratio
const TRADING_DAYS: f64 = 252.0;

/// Summary statistics from backtest
///
/// Ratios are decimals (0.02 = 2%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSummary {
    /// Starting capital
    pub initial_capital: Decimal,
    /// Capital after the last trade
    pub final_capital: Decimal,
    /// Final minus initial capital
    pub net_pnl: Decimal,
    /// Net P&L over initial capital
    pub total_return: f64,
    /// Winning trades over total trades; zero-P&L trades are losses
    pub win_rate: f64,
    /// Mean pnl_pct of winning trades
    pub avg_win: f64,
    /// Mean pnl_pct of losing trades (zero or negative)
    pub avg_loss: f64,
    /// Annualised mean over population stdev of trade returns
    pub sharpe_ratio: f64,
    /// Largest peak-to-trough decline of cumulative P&L over initial capital
    pub max_drawdown: f64,
    /// Total number of trades
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Mean holding period in bars
    pub avg_bars_held: f64,
}

impl BacktestSummary {
    /// All-zero summary for a run with no trades
    pub fn empty(initial_capital: Decimal) -> Self {
        Self {
            initial_capital,
            final_capital: initial_capital,
            net_pnl: Decimal::ZERO,
            total_return: 0.0,
            win_rate: 0.0,
            avg_win: 0.0,
            avg_loss: 0.0,
            sharpe_ratio: 0.0,
            max_drawdown: 0.0,
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            avg_bars_held: 0.0,
        }
    }

    /// Aggregate closed trades, in entry order
    pub fn from_trades(initial_capital: Decimal, trades: &[BacktestTrade]) -> Self {
        if trades.is_empty() {
            return Self::empty(initial_capital);
        }

        let net_pnl: Decimal = trades.iter().map(|t| t.pnl).sum();
        let final_capital = initial_capital + net_pnl;

        let returns: Vec<f64> = trades.iter().map(|t| t.pnl_pct).collect();
        let wins: Vec<f64> = returns.iter().copied().filter(|r| *r > 0.0).collect();
        let losses: Vec<f64> = returns.iter().copied().filter(|r| *r <= 0.0).collect();

        let total_trades = trades.len();
        let avg_bars_held =
            trades.iter().map(|t| t.bars_held).sum::<usize>() as f64 / total_trades as f64;

        Self {
            initial_capital,
            final_capital,
            net_pnl,
            total_return: ratio(net_pnl, initial_capital),
            win_rate: wins.len() as f64 / total_trades as f64,
            avg_win: mean(&wins),
            avg_loss: mean(&losses),
            sharpe_ratio: sharpe(&returns),
            max_drawdown: max_drawdown(trades.iter().map(|t| t.pnl), initial_capital),
            total_trades,
            winning_trades: wins.len(),
            losing_trades: losses.len(),
            avg_bars_held,
        }
    }

    /// Format as table for CLI output
    pub fn format_table(&self) -> String {
        format!(
            r#"
══════════════════════════════════════════════════════
               BACKTEST RESULTS
══════════════════════════════════════════════════════

PERFORMANCE
───────────────────────────────────────────────────────
Net P&L:          {:+.2} ({:+.2}%)
Final Capital:    {:.2}
Sharpe Ratio:     {:.2}
Max Drawdown:     {:.2}%
Win Rate:         {:.1}%
Avg Win:          {:+.2}%
Avg Loss:         {:+.2}%

ACTIVITY
───────────────────────────────────────────────────────
Total Trades:     {} ({} won, {} lost)
Avg Holding:      {:.1} bars
══════════════════════════════════════════════════════
"#,
            self.net_pnl,
            self.total_return * 100.0,
            self.final_capital,
            self.sharpe_ratio,
            self.max_drawdown * 100.0,
            self.win_rate * 100.0,
            self.avg_win * 100.0,
            self.avg_loss * 100.0,
            self.total_trades,
            self.winning_trades,
            self.losing_trades,
            self.avg_bars_held,
        )
    }
}

/// Complete backtest results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Summary statistics
    pub summary: BacktestSummary,
    /// Closed trades in entry order
    pub trades: Vec<BacktestTrade>,
    /// Capital after each trade
    pub equity_curve: Vec<EquityPoint>,
    /// Gaps at or above the entry threshold
    pub qualifying_gaps: usize,
    /// Qualifying gaps dropped because the series ended before they resolved
    pub discarded_trades: usize,
    /// True when the series was too short to simulate
    pub insufficient_data: bool,
}

impl BacktestResult {
    /// Zero result for a series below the minimum bar count
    pub fn insufficient(initial_capital: Decimal) -> Self {
        Self {
            summary: BacktestSummary::empty(initial_capital),
            trades: Vec::new(),
            equity_curve: Vec::new(),
            qualifying_gaps: 0,
            discarded_trades: 0,
            insufficient_data: true,
        }
    }
}

fn ratio(numerator: Decimal, denominator: Decimal) -> f64 {
    if denominator.is_zero() {
        return 0.0;
    }
    f64::try_from(numerator / denominator).unwrap_or(0.0)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Annualised Sharpe ratio of per-trade returns, 0 when undefined
fn sharpe(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let mu = mean(returns);
    let variance = returns.iter().map(|r| (r - mu).powi(2)).sum::<f64>() / returns.len() as f64;
    let std = variance.sqrt();
    // Identical returns leave only rounding noise in the deviation
    let dispersed = std.is_finite() && std > f64::EPSILON * mu.abs().max(1.0);
    if dispersed {
        mu / std * TRADING_DAYS.sqrt()
    } else {
        0.0
    }
}

/// Largest decline from a running peak of cumulative P&L, starting from zero
fn max_drawdown(pnls: impl Iterator<Item = Decimal>, initial_capital: Decimal) -> f64 {
    let mut cumulative = Decimal::ZERO;
    let mut peak = Decimal::ZERO;
    let mut worst = Decimal::ZERO;

    for pnl in pnls {
        cumulative += pnl;
        peak = peak.max(cumulative);
        worst = worst.max(peak - cumulative);
    }

    ratio(worst, initial_capital)
}
