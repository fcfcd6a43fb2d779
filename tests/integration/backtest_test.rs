//! Backtest and export integration tests

use chrono::Utc;
use gap_fill::backtest::{BacktestConfig, BacktestSimulator, ExecutionKind, ExitReason, TradeDirection};
use gap_fill::data::{read_equity, row_count, TradeExporter};
use rust_decimal_macros::dec;
use tempfile::TempDir;

use crate::common::{gappy, series};

fn simulate(kind: ExecutionKind, s: &gap_fill::bars::BarSeries) -> gap_fill::backtest::BacktestResult {
    BacktestSimulator::new(BacktestConfig {
        execution: kind,
        ..BacktestConfig::default()
    })
    .run(s)
}

#[test]
fn test_filled_gaps_are_winning_shorts() {
    let result = simulate(ExecutionKind::Replay, &gappy("SPY", 100));

    // Gaps at 15, 30, .., 90
    assert_eq!(result.summary.total_trades, 6);
    assert_eq!(result.summary.winning_trades, 6);
    assert_eq!(result.summary.win_rate, 1.0);
    assert_eq!(result.summary.max_drawdown, 0.0);
    // Identical returns have no dispersion
    assert_eq!(result.summary.sharpe_ratio, 0.0);
    assert!(result.summary.final_capital > dec!(10000));

    for trade in &result.trades {
        assert_eq!(trade.direction, TradeDirection::Short);
        assert_eq!(trade.exit_reason, ExitReason::Filled);
        assert_eq!(trade.entry_price, 104.0);
        assert_eq!(trade.exit_price, 101.0);
        assert_eq!(trade.bars_held, 1);
    }
}

#[test]
fn test_unfilled_gap_exits_at_horizon() {
    let mut ohlc = vec![(100.0, 101.0, 99.0, 100.0); 30];
    ohlc.extend(vec![(104.0, 105.0, 103.5, 104.0); 30]);
    let result = simulate(ExecutionKind::Vectorized, &series("HOLD", &ohlc));

    assert_eq!(result.trades.len(), 1);
    let trade = &result.trades[0];
    assert_eq!(trade.entry_index, 30);
    assert_eq!(trade.exit_index, 40);
    assert_eq!(trade.exit_reason, ExitReason::Horizon);
    assert!((trade.pnl_pct + 0.002).abs() < 1e-12);
    assert_eq!(result.summary.losing_trades, 1);
    assert!(result.summary.max_drawdown > 0.0);
}

#[test]
fn test_execution_models_agree() {
    let s = gappy("QQQ", 250);
    assert_eq!(
        simulate(ExecutionKind::Replay, &s),
        simulate(ExecutionKind::Vectorized, &s)
    );
}

#[test]
fn test_export_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let result = simulate(ExecutionKind::Replay, &gappy("SPY", 100));

    let paths = TradeExporter::new(temp_dir.path())
        .export("SPY", &result, Utc::now())
        .unwrap();

    assert_eq!(row_count(&paths.trades.unwrap()).unwrap(), 6);
    assert_eq!(read_equity(&paths.equity.unwrap()).unwrap(), result.equity_curve);
}
