//! Configuration loading tests

use gap_fill::backtest::ExecutionKind;
use gap_fill::config::Config;
use gap_fill::scanner::ScanSettings;
use rust_decimal_macros::dec;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_partial_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
        [gap]
        min_gap_pct = 2.5

        [backtest]
        initial_capital = 50000
        execution = "vectorized"

        [scanner]
        watchlist = ["SPY", "QQQ"]
        concurrency = 0
        "#
    )
    .unwrap();

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.gap.min_gap_pct, 2.5);
    assert_eq!(config.gap.max_gap_pct, 15.0);
    assert_eq!(config.backtest.initial_capital, dec!(50000));
    assert_eq!(config.scanner.watchlist, vec!["SPY", "QQQ"]);

    let settings = ScanSettings::from(&config);
    assert_eq!(settings.min_gap_pct, 2.5);
    assert_eq!(settings.backtest.execution, ExecutionKind::Vectorized);
    assert_eq!(settings.backtest.min_gap_pct, 2.0);
    assert_eq!(settings.concurrency, 1);
}

#[test]
fn test_example_matches_defaults() {
    assert_eq!(Config::example().unwrap(), Config::default());
}

#[test]
fn test_malformed_file_is_an_error() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[gap\nmin_gap_pct = ").unwrap();
    assert!(Config::load(file.path()).is_err());
}
