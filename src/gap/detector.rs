//! Gap detector
//!
//! Scans a bar series for opens beyond the previous bar's range.

use super::types::{GapDirection, GapEvent};
use crate::bars::BarSeries;

/// Detects opening gaps in a bar series
///
/// Stateless: scanning the same series always yields the same events in the
/// same order, regardless of what was scanned before.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapDetector {
    /// Minimum |gap_pct| for an event to be reported (inclusive)
    min_gap_pct: f64,
}

impl GapDetector {
    /// Create a detector reporting gaps of at least `min_gap_pct` percent
    pub fn new(min_gap_pct: f64) -> Self {
        Self {
            min_gap_pct: min_gap_pct.max(0.0),
        }
    }

    /// Detector that reports every gap regardless of size
    pub fn unfiltered() -> Self {
        Self::new(0.0)
    }

    pub fn min_gap_pct(&self) -> f64 {
        self.min_gap_pct
    }

    /// All gaps in the series, in bar order
    pub fn detect(&self, series: &BarSeries) -> Vec<GapEvent> {
        let events: Vec<GapEvent> = (1..series.len())
            .filter_map(|index| self.detect_at(series, index))
            .collect();

        tracing::debug!(
            symbol = series.symbol(),
            bars = series.len(),
            gaps = events.len(),
            min_gap_pct = self.min_gap_pct,
            "Gap scan complete"
        );

        events
    }

    /// Gap on the bar at `index`, if any
    ///
    /// Index 0 never gaps since it has no predecessor.
    pub fn detect_at(&self, series: &BarSeries, index: usize) -> Option<GapEvent> {
        if index == 0 {
            return None;
        }
        let previous = series.get(index - 1)?;
        let bar = series.get(index)?;

        let (direction, reference_level) = if bar.open > previous.high {
            (GapDirection::Up, previous.high)
        } else if bar.open < previous.low {
            (GapDirection::Down, previous.low)
        } else {
            return None;
        };

        // Multiply first so round-number gaps land exactly on the threshold
        let gap_pct = (bar.open - previous.close) * 100.0 / previous.close;
        if gap_pct.abs() < self.min_gap_pct {
            return None;
        }

        Some(GapEvent {
            symbol: series.symbol().to_string(),
            index,
            direction,
            reference_level,
            gap_pct,
            open: bar.open,
            previous_close: previous.close,
        })
    }

    /// Gap on the most recent bar, if any
    pub fn latest(&self, series: &BarSeries) -> Option<GapEvent> {
        self.detect_at(series, series.len().checked_sub(1)?)
    }
}

impl Default for GapDetector {
    fn default() -> Self {
        Self::unfiltered()
    }
}
