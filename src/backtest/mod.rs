//! Backtesting module
//!
//! Replays daily bars, fading every qualifying gap and closing at the fill or
//! after a fixed holding horizon. Two interchangeable execution models produce
//! the same trades: a bar-by-bar replay and a columnar vectorized pass.

mod analytics;
mod execution_model;
mod portfolio;
mod simulator;
mod types;

pub use analytics::{BacktestResult, BacktestSummary};
pub use execution_model::{BarReplay, Execution, ExecutionModel, VectorizedPortfolio};
pub use portfolio::Portfolio;
pub use simulator::BacktestSimulator;
pub use types::{BacktestTrade, EquityPoint, ExitReason, TradeDirection};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which execution model drives the simulation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionKind {
    /// Bar-by-bar replay with a running capital counter
    #[default]
    Replay,
    /// Columnar gap masks and exit vectors, then one portfolio pass
    Vectorized,
}

impl ExecutionKind {
    /// Instantiate the model
    pub fn model(&self) -> Box<dyn ExecutionModel> {
        match self {
            ExecutionKind::Replay => Box::new(BarReplay),
            ExecutionKind::Vectorized => Box::new(VectorizedPortfolio),
        }
    }
}

impl fmt::Display for ExecutionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionKind::Replay => f.write_str("replay"),
            ExecutionKind::Vectorized => f.write_str("vectorized"),
        }
    }
}

/// Backtest configuration
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    /// Starting capital
    pub initial_capital: Decimal,
    /// Fraction of current capital committed per trade
    pub position_fraction: Decimal,
    /// Round-trip commission as a decimal (0.002 = 0.2%)
    pub commission_rate: f64,
    /// Minimum |gap_pct| to enter, inclusive
    pub min_gap_pct: f64,
    /// Bars after entry before a forced exit
    pub holding_horizon: usize,
    /// Usable bars required to run at all
    pub min_bars: usize,
    /// Execution model
    pub execution: ExecutionKind,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: dec!(10000),
            position_fraction: dec!(0.10),
            commission_rate: 0.002,
            min_gap_pct: 2.0,
            holding_horizon: 10,
            min_bars: 50,
            execution: ExecutionKind::Replay,
        }
    }
}
