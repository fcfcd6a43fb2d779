//! Integration tests for gap-fill

mod common;

mod backtest_test;
mod config_test;
mod properties_test;
mod scanner_test;
