//! Validated bar series

use super::Bar;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Malformed bar data from an upstream collaborator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    /// A price is zero, negative or not finite
    #[error("{symbol}: bar {index} has a non-positive or non-finite price")]
    NonPositivePrice { symbol: String, index: usize },
    /// High is below low
    #[error("{symbol}: bar {index} has high {high} below low {low}")]
    HighBelowLow {
        symbol: String,
        index: usize,
        high: f64,
        low: f64,
    },
    /// Open or close lies outside the bar's range
    #[error("{symbol}: bar {index} has open/close outside [{low}, {high}]")]
    BodyOutsideRange {
        symbol: String,
        index: usize,
        high: f64,
        low: f64,
    },
    /// Timestamps are not strictly increasing
    #[error("{symbol}: bar {index} is not later than the bar before it")]
    NonIncreasingTimestamp { symbol: String, index: usize },
}

/// Ordered, immutable OHLCV bars for a single symbol
///
/// Construction validates every bar, so downstream analytics can rely on
/// `low <= min(open, close) <= max(open, close) <= high` and strictly
/// increasing timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct BarSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl BarSeries {
    /// Build a series, rejecting malformed bars
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, SeriesError> {
        let symbol = symbol.into();

        for (index, bar) in bars.iter().enumerate() {
            let prices = [bar.open, bar.high, bar.low, bar.close];
            if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
                return Err(SeriesError::NonPositivePrice { symbol, index });
            }
            if bar.high < bar.low {
                return Err(SeriesError::HighBelowLow {
                    symbol,
                    index,
                    high: bar.high,
                    low: bar.low,
                });
            }
            if bar.open.min(bar.close) < bar.low || bar.open.max(bar.close) > bar.high {
                return Err(SeriesError::BodyOutsideRange {
                    symbol,
                    index,
                    high: bar.high,
                    low: bar.low,
                });
            }
            if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
                return Err(SeriesError::NonIncreasingTimestamp { symbol, index });
            }
        }

        Ok(Self { symbol, bars })
    }

    /// Symbol this series belongs to
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// All bars in timestamp order
    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Bars at or after `start`, as a new series
    ///
    /// Any suffix of a valid series is valid, so no revalidation is needed.
    pub fn since(&self, start: DateTime<Utc>) -> BarSeries {
        let first = self.bars.partition_point(|bar| bar.timestamp < start);
        BarSeries {
            symbol: self.symbol.clone(),
            bars: self.bars[first..].to_vec(),
        }
    }

    /// Bars that have a predecessor and can therefore carry a gap
    pub fn usable_bars(&self) -> usize {
        self.bars.len().saturating_sub(1)
    }

    /// Volume of bar `index` relative to the mean of up to `lookback` bars before it
    ///
    /// Returns 1.0 when there is no history or the historical mean is zero.
    pub fn volume_ratio(&self, index: usize, lookback: usize) -> f64 {
        let Some(bar) = self.bars.get(index) else {
            return 1.0;
        };
        let start = index.saturating_sub(lookback);
        let history = &self.bars[start..index];
        if history.is_empty() {
            return 1.0;
        }

        let mean = history.iter().map(|b| b.volume as f64).sum::<f64>() / history.len() as f64;
        if mean > 0.0 {
            bar.volume as f64 / mean
        } else {
            1.0
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bar(day: i64, o: f64, h: f64, l: f64, c: f64) -> Bar {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        Bar::new(start + Duration::days(day), o, h, l, c, 500)
    }

    #[test]
    fn test_valid_series() {
        let series = BarSeries::new(
            "AAPL",
            vec![bar(0, 100.0, 101.0, 99.0, 100.5), bar(1, 101.0, 102.0, 100.0, 101.5)],
        )
        .unwrap();
        assert_eq!(series.symbol(), "AAPL");
        assert_eq!(series.len(), 2);
        assert_eq!(series.usable_bars(), 1);
        assert_eq!(series.last().unwrap().close, 101.5);
    }

    #[test]
    fn test_empty_series_is_valid() {
        let series = BarSeries::new("AAPL", vec![]).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.usable_bars(), 0);
    }

    #[test]
    fn test_rejects_high_below_low() {
        let result = BarSeries::new("AAPL", vec![bar(0, 100.0, 98.0, 99.0, 100.0)]);
        assert!(matches!(
            result,
            Err(SeriesError::HighBelowLow { index: 0, .. })
        ));
    }

    #[test]
    fn test_rejects_open_above_high() {
        let result = BarSeries::new(
            "AAPL",
            vec![bar(0, 100.0, 101.0, 99.0, 100.0), bar(1, 103.0, 102.0, 100.0, 101.0)],
        );
        assert!(matches!(
            result,
            Err(SeriesError::BodyOutsideRange { index: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_non_positive_price() {
        let result = BarSeries::new("AAPL", vec![bar(0, 0.0, 1.0, 0.0, 0.5)]);
        assert!(matches!(result, Err(SeriesError::NonPositivePrice { .. })));

        let result = BarSeries::new("AAPL", vec![bar(0, f64::NAN, 1.0, 0.5, 0.5)]);
        assert!(matches!(result, Err(SeriesError::NonPositivePrice { .. })));
    }

    #[test]
    fn test_rejects_duplicate_timestamp() {
        let result = BarSeries::new(
            "AAPL",
            vec![bar(0, 100.0, 101.0, 99.0, 100.0), bar(0, 100.0, 101.0, 99.0, 100.0)],
        );
        assert!(matches!(
            result,
            Err(SeriesError::NonIncreasingTimestamp { index: 1, .. })
        ));
    }

    #[test]
    fn test_error_message_names_symbol() {
        let err = BarSeries::new("TSLA", vec![bar(0, 100.0, 98.0, 99.0, 100.0)]).unwrap_err();
        assert!(err.to_string().contains("TSLA"));
    }

    #[test]
    fn test_volume_ratio() {
        let mut bars: Vec<Bar> = (0..4).map(|d| bar(d, 100.0, 101.0, 99.0, 100.0)).collect();
        bars[0].volume = 100;
        bars[1].volume = 200;
        bars[2].volume = 300;
        bars[3].volume = 800;
        let series = BarSeries::new("AAPL", bars).unwrap();

        // mean of 100, 200, 300 = 200
        assert_eq!(series.volume_ratio(3, 20), 4.0);
        // only the bar right before: 300
        assert!((series.volume_ratio(3, 1) - 800.0 / 300.0).abs() < 1e-12);
    }

    #[test]
    fn test_volume_ratio_without_history() {
        let series = BarSeries::new("AAPL", vec![bar(0, 100.0, 101.0, 99.0, 100.0)]).unwrap();
        assert_eq!(series.volume_ratio(0, 20), 1.0);
        assert_eq!(series.volume_ratio(5, 20), 1.0);
    }

    #[test]
    fn test_volume_ratio_zero_mean() {
        let mut bars: Vec<Bar> = (0..2).map(|d| bar(d, 100.0, 101.0, 99.0, 100.0)).collect();
        bars[0].volume = 0;
        let series = BarSeries::new("AAPL", bars).unwrap();
        assert_eq!(series.volume_ratio(1, 20), 1.0);
    }

    #[test]
    fn test_since_keeps_suffix() {
        let bars: Vec<Bar> = (0..5).map(|d| bar(d, 100.0, 101.0, 99.0, 100.0)).collect();
        let cutoff = bars[2].timestamp;
        let series = BarSeries::new("AAPL", bars).unwrap();

        let recent = series.since(cutoff);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent.symbol(), "AAPL");
        assert_eq!(recent.first().unwrap().timestamp, cutoff);
        assert!(series.since(cutoff + Duration::days(30)).is_empty());
    }
}
