//! Backtest trade types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::gap::GapDirection;

/// Position direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeDirection {
    Long,
    Short,
}

impl TradeDirection {
    /// Direction that profits from the gap closing: short a gap up, buy a gap down
    pub fn fading(gap: GapDirection) -> Self {
        match gap {
            GapDirection::Up => TradeDirection::Short,
            GapDirection::Down => TradeDirection::Long,
        }
    }

    /// Fractional return of a move from `entry` to `exit`, signed so that gains are positive
    pub fn price_return(&self, entry: f64, exit: f64) -> f64 {
        match self {
            TradeDirection::Long => (exit - entry) / entry,
            TradeDirection::Short => (entry - exit) / entry,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeDirection::Long => "long",
            TradeDirection::Short => "short",
        }
    }
}

/// Why a trade was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitReason {
    /// Price touched the gap's reference level
    Filled,
    /// Holding horizon elapsed without a fill
    Horizon,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::Filled => "filled",
            ExitReason::Horizon => "horizon",
        }
    }
}

/// Trade resolved from the bars, before position sizing
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ResolvedTrade {
    pub entry_index: usize,
    pub entry_price: f64,
    pub exit_index: usize,
    pub exit_price: f64,
    pub direction: TradeDirection,
    pub gap_pct: f64,
    pub exit_reason: ExitReason,
}

/// A closed simulated trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestTrade {
    /// Bar the position was opened on (the gapping bar)
    pub entry_index: usize,
    pub entry_time: DateTime<Utc>,
    /// Open of the gapping bar
    pub entry_price: f64,
    pub exit_index: usize,
    pub exit_time: DateTime<Utc>,
    /// Reference level on a fill, horizon close otherwise
    pub exit_price: f64,
    pub direction: TradeDirection,
    /// Gap that triggered the entry, in percent
    pub gap_pct: f64,
    /// Return after commission as a decimal (e.g., 0.012 = 1.2%)
    pub pnl_pct: f64,
    /// Capital committed to the trade
    pub position_size: Decimal,
    /// Dollar P&L
    pub pnl: Decimal,
    pub bars_held: usize,
    pub exit_reason: ExitReason,
}

impl BacktestTrade {
    /// Ties at exactly zero count as losses
    pub fn is_win(&self) -> bool {
        self.pnl_pct > 0.0
    }
}

/// Capital after each closed trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    /// Bar the trade closed on
    pub bar_index: usize,
    pub timestamp: DateTime<Utc>,
    pub capital: Decimal,
    /// Sum of trade P&L so far
    pub cumulative_pnl: Decimal,
}
