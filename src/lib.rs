//! gap-fill: Opening gap scanner and gap-fill backtester for daily equity bars
//!
//! This library provides the core components for:
//! - Validated daily bar series
//! - Gap detection against the previous bar's range
//! - Historical fill-probability estimation
//! - Gap-fill backtesting with replay and vectorized execution models
//! - Conviction scoring from gap size, fill rate, volume and sentiment
//! - Market data from Alpaca and sentiment from Groq
//! - Watchlist scanning and per-symbol detail
//! - Parquet export of trades and equity curves
//! - Structured logging and Prometheus metrics

pub mod backtest;
pub mod bars;
pub mod cli;
pub mod config;
pub mod conviction;
pub mod data;
pub mod feed;
pub mod gap;
pub mod probability;
pub mod scanner;
pub mod sentiment;
pub mod telemetry;
