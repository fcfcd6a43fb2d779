//! Data export module
//!
//! Stores backtest trades and equity curves to Parquet for offline analysis

mod export;

pub use export::{equity_schema, read_equity, row_count, trade_schema, ExportPaths, TradeExporter};
