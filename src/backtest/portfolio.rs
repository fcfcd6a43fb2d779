//! Backtest portfolio: fixed-fraction sizing and running capital

use rust_decimal::Decimal;

use super::types::{BacktestTrade, EquityPoint, ResolvedTrade};
use crate::bars::BarSeries;

/// Running capital for a single backtest invocation
///
/// Every trade is sized at a fixed fraction of the capital at the time it is
/// settled, and its P&L is booked immediately.
#[derive(Debug, Clone)]
pub struct Portfolio {
    capital: Decimal,
    /// Fraction of capital per trade (e.g., 0.10 = 10%)
    position_fraction: Decimal,
    cumulative_pnl: Decimal,
    equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    /// Create a portfolio
    pub fn new(initial_capital: Decimal, position_fraction: Decimal) -> Self {
        Self {
            capital: initial_capital,
            position_fraction,
            cumulative_pnl: Decimal::ZERO,
            equity_curve: Vec::new(),
        }
    }

    #[cfg(test)]
    fn capital(&self) -> Decimal {
        self.capital
    }

    /// Capital committed to the next trade
    pub fn position_size(&self) -> Decimal {
        self.capital * self.position_fraction
    }

    #[cfg(test)]
    fn equity_curve(&self) -> &[EquityPoint] {
        &self.equity_curve
    }

    pub fn into_equity_curve(self) -> Vec<EquityPoint> {
        self.equity_curve
    }

    /// Size, book and record a resolved trade
    pub(crate) fn settle(
        &mut self,
        trade: &ResolvedTrade,
        series: &BarSeries,
        commission_rate: f64,
    ) -> BacktestTrade {
        let pnl_pct = trade
            .direction
            .price_return(trade.entry_price, trade.exit_price)
            - commission_rate;

        let position_size = self.position_size();
        let pnl = position_size * Decimal::try_from(pnl_pct).unwrap_or(Decimal::ZERO);

        self.capital += pnl;
        self.cumulative_pnl += pnl;

        let entry_time = series.bars()[trade.entry_index].timestamp;
        let exit_time = series.bars()[trade.exit_index].timestamp;

        self.equity_curve.push(EquityPoint {
            bar_index: trade.exit_index,
            timestamp: exit_time,
            capital: self.capital,
            cumulative_pnl: self.cumulative_pnl,
        });

        BacktestTrade {
            entry_index: trade.entry_index,
            entry_time,
            entry_price: trade.entry_price,
            exit_index: trade.exit_index,
            exit_time,
            exit_price: trade.exit_price,
            direction: trade.direction,
            gap_pct: trade.gap_pct,
            pnl_pct,
            position_size,
            pnl,
            bars_held: trade.exit_index - trade.entry_index,
            exit_reason: trade.exit_reason,
        }
    }
}
