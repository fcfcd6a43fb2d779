//! Serving-boundary records
//!
//! Analytics keep full precision; numbers are rounded to two decimals only
//! when a record is built.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::backtest::BacktestResult;
use crate::bars::BarSeries;
use crate::conviction::{Conviction, Recommendation};
use crate::gap::{GapDirection, GapEvent};
use crate::probability::ProbabilityResult;
use crate::sentiment::{Sentiment, SentimentLabel};

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One gapping symbol from a live scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapScanRecord {
    pub symbol: String,
    /// Signed gap in percent
    pub gap_percent: f64,
    pub direction: GapDirection,
    /// Latest close
    pub price: f64,
    pub previous_close: f64,
    /// Volume of the gapping bar
    pub volume: u64,
    pub volume_ratio: f64,
    /// Historical fill rate in [0, 1]
    pub fill_probability: f64,
    /// Mean bars to fill
    pub avg_fill_time: f64,
    pub historical_gaps: usize,
    pub conviction: Conviction,
    /// Sentiment score in [-1, 1]
    pub sentiment: f64,
    pub sentiment_label: SentimentLabel,
    pub reasons: Vec<String>,
    /// Start of the gapping bar
    pub timestamp: DateTime<Utc>,
}

/// Inputs gathered for one gapping symbol
pub(crate) struct ScanInputs<'a> {
    pub series: &'a BarSeries,
    pub event: &'a GapEvent,
    pub volume_ratio: f64,
    pub probability: &'a ProbabilityResult,
    pub sentiment: Sentiment,
    pub conviction: Conviction,
    pub reasons: Vec<String>,
}

impl GapScanRecord {
    pub(crate) fn build(inputs: ScanInputs<'_>) -> Option<Self> {
        let bar = inputs.series.get(inputs.event.index)?;

        Some(Self {
            symbol: inputs.event.symbol.clone(),
            gap_percent: round2(inputs.event.gap_pct),
            direction: inputs.event.direction,
            price: round2(bar.close),
            previous_close: round2(inputs.event.previous_close),
            volume: bar.volume,
            volume_ratio: round2(inputs.volume_ratio),
            fill_probability: round2(inputs.probability.fill_rate),
            avg_fill_time: round2(inputs.probability.avg_fill_time),
            historical_gaps: inputs.probability.total_gaps,
            conviction: inputs.conviction,
            sentiment: round2(inputs.sentiment.score),
            sentiment_label: inputs.sentiment.label,
            reasons: inputs.reasons,
            timestamp: bar.timestamp,
        })
    }
}

/// Backtest summary for the serving layer
///
/// `win_rate`, `avg_win`, `avg_loss`, `max_drawdown` and `total_return` are
/// in percent; `sharpe_ratio` is raw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestRecord {
    pub symbol: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_trades: usize,
    pub win_rate: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub total_return: f64,
    /// Too little history to simulate; every statistic is zero
    pub insufficient_data: bool,
}

impl BacktestRecord {
    pub fn from_result(
        symbol: impl Into<String>,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        result: &BacktestResult,
    ) -> Self {
        let summary = &result.summary;
        Self {
            symbol: symbol.into(),
            start_date,
            end_date,
            total_trades: summary.total_trades,
            win_rate: round2(summary.win_rate * 100.0),
            avg_win: round2(summary.avg_win * 100.0),
            avg_loss: round2(summary.avg_loss * 100.0),
            max_drawdown: round2(summary.max_drawdown * 100.0),
            sharpe_ratio: round2(summary.sharpe_ratio),
            total_return: round2(summary.total_return * 100.0),
            insufficient_data: result.insufficient_data,
        }
    }
}

/// Backtest record together with the full-precision result behind it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestReport {
    pub record: BacktestRecord,
    pub result: BacktestResult,
}

/// Fill statistics for the serving layer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbabilityRecord {
    pub fill_rate: f64,
    pub avg_fill_time: f64,
    pub total_gaps: usize,
    pub filled_gaps: usize,
    pub is_default: bool,
}

impl From<&ProbabilityResult> for ProbabilityRecord {
    fn from(result: &ProbabilityResult) -> Self {
        Self {
            fill_rate: round2(result.fill_rate),
            avg_fill_time: round2(result.avg_fill_time),
            total_gaps: result.total_gaps,
            filled_gaps: result.filled_gaps,
            is_default: result.is_default,
        }
    }
}

/// Gap on the most recent bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapSnapshot {
    pub gap_percent: f64,
    pub direction: GapDirection,
    pub reference_level: f64,
    pub open: f64,
    pub previous_close: f64,
}

impl From<&GapEvent> for GapSnapshot {
    fn from(event: &GapEvent) -> Self {
        Self {
            gap_percent: round2(event.gap_pct),
            direction: event.direction,
            reference_level: round2(event.reference_level),
            open: round2(event.open),
            previous_close: round2(event.previous_close),
        }
    }
}

/// Everything known about one symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolDetail {
    pub symbol: String,
    /// Latest close
    pub price: f64,
    /// Gap on the latest bar, if it gapped
    pub latest_gap: Option<GapSnapshot>,
    pub probability: ProbabilityRecord,
    pub sentiment: Sentiment,
    pub backtest: BacktestRecord,
    pub recommendation: Recommendation,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtest::BacktestSummary;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round2() {
        assert_eq!(round2(4.0), 4.0);
        assert_eq!(round2(3.14159), 3.14);
        assert_eq!(round2(-2.675_1), -2.68);
        assert_eq!(round2(0.0), 0.0);
    }

    #[test]
    fn test_backtest_record_converts_to_percent() {
        let mut result = BacktestResult::insufficient(dec!(10000));
        result.insufficient_data = false;
        result.summary = BacktestSummary {
            total_trades: 12,
            win_rate: 0.75,
            avg_win: 0.012345,
            avg_loss: -0.0081,
            max_drawdown: 0.0213,
            sharpe_ratio: 1.23456,
            total_return: 0.05678,
            ..BacktestSummary::empty(dec!(10000))
        };

        let now = Utc::now();
        let record = BacktestRecord::from_result("AAPL", now, now, &result);
        assert_eq!(record.total_trades, 12);
        assert_eq!(record.win_rate, 75.0);
        assert_eq!(record.avg_win, 1.23);
        assert_eq!(record.avg_loss, -0.81);
        assert_eq!(record.max_drawdown, 2.13);
        assert_eq!(record.sharpe_ratio, 1.23);
        assert_eq!(record.total_return, 5.68);
    }

    #[test]
    fn test_records_serialize_camel_case() {
        let record = ProbabilityRecord::from(&ProbabilityResult::neutral());
        let json = serde_json::to_value(record).unwrap();
        assert_eq!(json["fillRate"], 0.5);
        assert_eq!(json["avgFillTime"], 0.0);
        assert_eq!(json["isDefault"], true);

        let now = Utc::now();
        let backtest = BacktestRecord::from_result("SPY", now, now, &BacktestResult::insufficient(dec!(1)));
        let json = serde_json::to_value(backtest).unwrap();
        assert!(json.get("startDate").is_some());
        assert!(json.get("sharpeRatio").is_some());
        assert_eq!(json["totalTrades"], 0);
        assert_eq!(json["insufficientData"], true);
    }

    #[test]
    fn test_gap_snapshot_rounds() {
        let event = GapEvent {
            symbol: "NVDA".to_string(),
            index: 4,
            direction: GapDirection::Down,
            reference_level: 99.123,
            gap_pct: -3.4567,
            open: 96.5,
            previous_close: 99.987,
        };
        let snapshot = GapSnapshot::from(&event);
        assert_eq!(snapshot.gap_percent, -3.46);
        assert_eq!(snapshot.reference_level, 99.12);
        assert_eq!(snapshot.previous_close, 99.99);
    }
}
