//! Prometheus metrics
//!
//! Recorded through the `metrics` facade; without an installed exporter the
//! calls are no-ops, so library code records unconditionally.

use std::time::Duration;

/// Counter metric types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterMetric {
    /// Symbols a scan attempted
    SymbolsScanned,
    /// Gap events found by the detector
    GapsDetected,
    /// Closed backtest trades
    TradesExecuted,
    /// Backtest trades dropped for lack of resolution bars
    TradesDiscarded,
}

/// Why a symbol was left out of a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Bar fetch failed
    Upstream,
    /// Vendor returned malformed bars
    InvalidSeries,
    /// No gap on the latest bar within the scan bounds
    NoGap,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::Upstream => "upstream",
            SkipReason::InvalidSeries => "invalid_series",
            SkipReason::NoGap => "no_gap",
        }
    }
}

/// Latency metric types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyMetric {
    /// Whole multi-symbol scan
    Scan,
    /// Bar fetch from the market data vendor
    BarFetch,
    /// Sentiment scoring call
    Sentiment,
    /// One backtest simulation
    Backtest,
}

impl CounterMetric {
    fn name(&self) -> &'static str {
        match self {
            CounterMetric::SymbolsScanned => "gapfill_symbols_scanned_total",
            CounterMetric::GapsDetected => "gapfill_gaps_detected_total",
            CounterMetric::TradesExecuted => "gapfill_backtest_trades_total",
            CounterMetric::TradesDiscarded => "gapfill_backtest_trades_discarded_total",
        }
    }
}

impl LatencyMetric {
    fn name(&self) -> &'static str {
        match self {
            LatencyMetric::Scan => "gapfill_scan_latency_ms",
            LatencyMetric::BarFetch => "gapfill_bar_fetch_latency_ms",
            LatencyMetric::Sentiment => "gapfill_sentiment_latency_ms",
            LatencyMetric::Backtest => "gapfill_backtest_latency_ms",
        }
    }
}

/// Add to a counter
pub fn increment(metric: CounterMetric, value: u64) {
    ::metrics::counter!(metric.name()).increment(value);
}

/// Count a skipped symbol, labelled by reason
pub fn record_skip(reason: SkipReason) {
    ::metrics::counter!("gapfill_symbols_skipped_total", "reason" => reason.as_str()).increment(1);
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    ::metrics::histogram!(metric.name()).record(duration.as_secs_f64() * 1000.0);
}
