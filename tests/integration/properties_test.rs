//! Property tests for gap, fill and backtest invariants
//!
//! Uses proptest to verify:
//! 1. Raising the threshold never adds gaps
//! 2. Execution models agree on every series
//! 3. Every qualifying gap is either traded or discarded
//! 4. Trades exit after entry and within the holding horizon
//! 5. Fill statistics stay in range and are reproducible

use chrono::{Duration, TimeZone, Utc};
use gap_fill::backtest::{BacktestConfig, BacktestSimulator, ExecutionKind};
use gap_fill::bars::{Bar, BarSeries};
use gap_fill::gap::GapDetector;
use gap_fill::probability::FillProbabilityEstimator;
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

/// Random walk of valid daily bars with frequent opening jumps
fn arb_series() -> impl Strategy<Value = BarSeries> {
    prop::collection::vec(
        (-0.06..0.06_f64, 0.0..0.03_f64, 0.0..0.03_f64, -0.03..0.03_f64),
        60..160,
    )
    .prop_map(|steps| {
        let start = Utc.with_ymd_and_hms(2023, 1, 3, 14, 30, 0).unwrap();
        let mut close = 100.0_f64;
        let bars = steps
            .into_iter()
            .enumerate()
            .map(|(i, (jump, up, down, drift))| {
                let open = close * (1.0 + jump);
                let next_close = open * (1.0 + drift);
                let high = open.max(next_close) * (1.0 + up);
                let low = open.min(next_close) * (1.0 - down);
                close = next_close;
                Bar::new(start + Duration::days(i as i64), open, high, low, next_close, 1_000)
            })
            .collect();
        BarSeries::new("PROP", bars).unwrap()
    })
}

fn run(kind: ExecutionKind, series: &BarSeries) -> gap_fill::backtest::BacktestResult {
    BacktestSimulator::new(BacktestConfig {
        execution: kind,
        min_bars: 20,
        ..BacktestConfig::default()
    })
    .run(series)
}

proptest! {
    #[test]
    fn gap_count_non_increasing_in_threshold(
        series in arb_series(),
        low in 0.0..5.0_f64,
        extra in 0.0..5.0_f64,
    ) {
        let loose = GapDetector::new(low).detect(&series);
        let strict = GapDetector::new(low + extra).detect(&series);
        prop_assert!(strict.len() <= loose.len());
        for event in &strict {
            prop_assert!(loose.iter().any(|e| e.index == event.index));
        }
    }

    #[test]
    fn execution_models_agree(series in arb_series()) {
        prop_assert_eq!(run(ExecutionKind::Replay, &series), run(ExecutionKind::Vectorized, &series));
    }

    #[test]
    fn every_gap_is_traded_or_discarded(series in arb_series()) {
        let result = run(ExecutionKind::Replay, &series);
        let gaps = GapDetector::new(2.0).detect(&series).len();
        prop_assert_eq!(result.qualifying_gaps, gaps);
        prop_assert_eq!(result.trades.len() + result.discarded_trades, gaps);
    }

    #[test]
    fn trades_exit_within_horizon(series in arb_series()) {
        let result = run(ExecutionKind::Vectorized, &series);
        for trade in &result.trades {
            prop_assert!(trade.exit_index > trade.entry_index);
            prop_assert!(trade.bars_held <= 10);
            prop_assert!(trade.exit_index < series.len());
        }
        prop_assert!(result.summary.max_drawdown >= 0.0);
        prop_assert!((0.0..=1.0).contains(&result.summary.win_rate));
    }

    #[test]
    fn fill_statistics_in_range(series in arb_series()) {
        let result = FillProbabilityEstimator::with_defaults().estimate(&series);
        prop_assert!((0.0..=1.0).contains(&result.fill_rate));
        prop_assert!(result.filled_gaps <= result.total_gaps);
        prop_assert!(result.avg_fill_time <= 10.0);
        if result.filled_gaps > 0 {
            prop_assert!(result.avg_fill_time >= 1.0);
        } else {
            prop_assert_eq!(result.avg_fill_time, 0.0);
        }
    }

    #[test]
    fn estimator_is_idempotent(series in arb_series()) {
        let estimator = FillProbabilityEstimator::with_defaults();
        prop_assert_eq!(estimator.estimate(&series), estimator.estimate(&series));
    }
}
