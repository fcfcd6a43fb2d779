//! Execution models: how qualifying gaps turn into closed trades

use super::portfolio::Portfolio;
use super::types::{BacktestTrade, EquityPoint, ExitReason, ResolvedTrade, TradeDirection};
use super::BacktestConfig;
use crate::bars::BarSeries;
use crate::gap::{GapDetector, GapDirection, GapEvent};
use crate::probability::first_fill;

/// Trades produced by one execution pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Execution {
    /// Closed trades in entry order
    pub trades: Vec<BacktestTrade>,
    /// Capital after each trade
    pub equity_curve: Vec<EquityPoint>,
    /// Gaps at or above the entry threshold
    pub qualifying_gaps: usize,
    /// Qualifying gaps whose horizon ran past the end of the series unfilled
    pub discarded_trades: usize,
}

/// Turns a bar series into settled trades
pub trait ExecutionModel: Send + Sync {
    /// Short model name for logs and reports
    fn name(&self) -> &'static str;

    /// Simulate every qualifying gap in `series`
    fn execute(&self, series: &BarSeries, config: &BacktestConfig) -> Execution;
}

/// Exit for a gap entered at its open
///
/// Exits at the reference level on the first touch within `horizon` bars,
/// otherwise at the close of bar `index + horizon`. `None` when neither a
/// fill nor the horizon bar exists.
fn resolve(series: &BarSeries, event: &GapEvent, horizon: usize) -> Option<ResolvedTrade> {
    let (exit_index, exit_price, exit_reason) = match first_fill(series, event, horizon) {
        Some(offset) => (event.index + offset, event.reference_level, ExitReason::Filled),
        None => {
            let exit_index = event.index + horizon;
            let bar = series.get(exit_index)?;
            (exit_index, bar.close, ExitReason::Horizon)
        }
    };

    Some(ResolvedTrade {
        entry_index: event.index,
        entry_price: event.open,
        exit_index,
        exit_price,
        direction: TradeDirection::fading(event.direction),
        gap_pct: event.gap_pct,
        exit_reason,
    })
}

/// Walks the series one bar at a time, settling each gap as it is found
#[derive(Debug, Clone, Copy, Default)]
pub struct BarReplay;

impl ExecutionModel for BarReplay {
    fn name(&self) -> &'static str {
        "replay"
    }

    fn execute(&self, series: &BarSeries, config: &BacktestConfig) -> Execution {
        let detector = GapDetector::new(config.min_gap_pct);
        let mut portfolio = Portfolio::new(config.initial_capital, config.position_fraction);
        let mut trades = Vec::new();
        let mut qualifying_gaps = 0;
        let mut discarded_trades = 0;

        for index in 1..series.len() {
            let Some(event) = detector.detect_at(series, index) else {
                continue;
            };
            qualifying_gaps += 1;

            match resolve(series, &event, config.holding_horizon) {
                Some(resolved) => {
                    trades.push(portfolio.settle(&resolved, series, config.commission_rate));
                }
                None => {
                    tracing::debug!(
                        symbol = series.symbol(),
                        index,
                        "Discarding trade, horizon runs past end of series"
                    );
                    discarded_trades += 1;
                }
            }
        }

        Execution {
            trades,
            equity_curve: portfolio.into_equity_curve(),
            qualifying_gaps,
            discarded_trades,
        }
    }
}

/// Builds shifted price columns and gap masks for the whole series, resolves
/// every exit from the columns, then compounds the portfolio in one pass
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorizedPortfolio;

impl VectorizedPortfolio {
    /// Offset of the first bar in `lows`/`highs` touching the level, within `horizon`
    fn fill_offset(column: &[f64], from: usize, horizon: usize, touches: impl Fn(f64) -> bool) -> Option<usize> {
        let end = (from + horizon).min(column.len().saturating_sub(1));
        column
            .get(from + 1..=end)?
            .iter()
            .position(|&price| touches(price))
            .map(|pos| pos + 1)
    }
}

impl ExecutionModel for VectorizedPortfolio {
    fn name(&self) -> &'static str {
        "vectorized"
    }

    fn execute(&self, series: &BarSeries, config: &BacktestConfig) -> Execution {
        let bars = series.bars();
        if bars.len() < 2 {
            return Execution::default();
        }

        let opens: Vec<f64> = bars.iter().map(|b| b.open).collect();
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

        // Columns aligned on the gapping bar: entry i pairs with i - 1
        let entry = &opens[1..];
        let prev_high = &highs[..highs.len() - 1];
        let prev_low = &lows[..lows.len() - 1];
        let prev_close = &closes[..closes.len() - 1];

        let gap_up: Vec<bool> = entry.iter().zip(prev_high).map(|(o, h)| o > h).collect();
        let gap_down: Vec<bool> = entry.iter().zip(prev_low).map(|(o, l)| o < l).collect();
        let gap_pct: Vec<f64> = entry
            .iter()
            .zip(prev_close)
            .map(|(o, c)| (o - c) * 100.0 / c)
            .collect();

        let signals: Vec<usize> = (0..entry.len())
            .filter(|&k| (gap_up[k] || gap_down[k]) && gap_pct[k].abs() >= config.min_gap_pct)
            .collect();

        let horizon = config.holding_horizon;
        let mut resolved = Vec::with_capacity(signals.len());
        let mut discarded_trades = 0;

        for &k in &signals {
            let index = k + 1;
            let (direction, reference_level) = if gap_up[k] {
                (GapDirection::Up, prev_high[k])
            } else {
                (GapDirection::Down, prev_low[k])
            };

            let fill = match direction {
                GapDirection::Up => Self::fill_offset(&lows, index, horizon, |low| low <= reference_level),
                GapDirection::Down => Self::fill_offset(&highs, index, horizon, |high| high >= reference_level),
            };

            let exit = match fill {
                Some(offset) => Some((index + offset, reference_level, ExitReason::Filled)),
                None => closes
                    .get(index + horizon)
                    .map(|&close| (index + horizon, close, ExitReason::Horizon)),
            };

            match exit {
                Some((exit_index, exit_price, exit_reason)) => resolved.push(ResolvedTrade {
                    entry_index: index,
                    entry_price: entry[k],
                    exit_index,
                    exit_price,
                    direction: TradeDirection::fading(direction),
                    gap_pct: gap_pct[k],
                    exit_reason,
                }),
                None => discarded_trades += 1,
            }
        }

        let mut portfolio = Portfolio::new(config.initial_capital, config.position_fraction);
        let trades = resolved
            .iter()
            .map(|trade| portfolio.settle(trade, series, config.commission_rate))
            .collect();

        Execution {
            trades,
            equity_curve: portfolio.into_equity_curve(),
            qualifying_gaps: signals.len(),
            discarded_trades,
        }
    }
}
