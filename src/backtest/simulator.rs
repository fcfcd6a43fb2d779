//! Backtest simulator engine

use std::time::Instant;

use super::{BacktestConfig, BacktestResult, BacktestSummary, ExecutionModel};
use crate::bars::BarSeries;
use crate::telemetry::{self, CounterMetric, LatencyMetric};

/// Runs backtest simulation
pub struct BacktestSimulator {
    config: BacktestConfig,
    model: Box<dyn ExecutionModel>,
}

impl BacktestSimulator {
    /// Create a new simulator using the configured execution model
    pub fn new(config: BacktestConfig) -> Self {
        let model = config.execution.model();
        Self { config, model }
    }

    /// Create a simulator with an explicit execution model
    pub fn with_model(config: BacktestConfig, model: Box<dyn ExecutionModel>) -> Self {
        Self { config, model }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Run the backtest over `series`
    ///
    /// A series with fewer usable bars than the configured minimum yields the
    /// zero result flagged `insufficient_data`; it is not an error.
    pub fn run(&self, series: &BarSeries) -> BacktestResult {
        if series.usable_bars() < self.config.min_bars {
            tracing::debug!(
                symbol = series.symbol(),
                usable_bars = series.usable_bars(),
                min_bars = self.config.min_bars,
                "Insufficient history for backtest"
            );
            return BacktestResult::insufficient(self.config.initial_capital);
        }

        let started = Instant::now();
        let execution = self.model.execute(series, &self.config);
        let summary = BacktestSummary::from_trades(self.config.initial_capital, &execution.trades);

        telemetry::increment(CounterMetric::TradesExecuted, execution.trades.len() as u64);
        telemetry::increment(CounterMetric::TradesDiscarded, execution.discarded_trades as u64);
        telemetry::record_latency(LatencyMetric::Backtest, started.elapsed());

        tracing::debug!(
            symbol = series.symbol(),
            model = self.model.name(),
            qualifying_gaps = execution.qualifying_gaps,
            trades = summary.total_trades,
            discarded = execution.discarded_trades,
            total_return = summary.total_return,
            "Backtest complete"
        );

        BacktestResult {
            summary,
            trades: execution.trades,
            equity_curve: execution.equity_curve,
            qualifying_gaps: execution.qualifying_gaps,
            discarded_trades: execution.discarded_trades,
            insufficient_data: false,
        }
    }
}

impl Default for BacktestSimulator {
    fn default() -> Self {
        Self::new(BacktestConfig::default())
    }
}
