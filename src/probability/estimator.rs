//! Fill probability estimator

use rayon::prelude::*;

use super::types::{FillOutcome, ProbabilityResult};
use crate::bars::BarSeries;
use crate::gap::{GapDetector, GapDirection, GapEvent};

/// Bars searched after each gap (default)
pub const DEFAULT_LOOKAHEAD: usize = 10;

/// Usable bars required before statistics are measured (default)
pub const DEFAULT_MIN_BARS: usize = 20;

/// Offset (1-based) of the first bar after `event` that touches its reference level
///
/// Searches at most `window` bars, clipped to the end of the series. A gap up
/// fills when a later low reaches down to the previous high; a gap down fills
/// when a later high reaches up to the previous low.
pub fn first_fill(series: &BarSeries, event: &GapEvent, window: usize) -> Option<usize> {
    let bars = series.bars();
    (1..=window)
        .map_while(|offset| bars.get(event.index + offset).map(|bar| (offset, bar)))
        .find(|(_, bar)| match event.direction {
            GapDirection::Up => bar.low <= event.reference_level,
            GapDirection::Down => bar.high >= event.reference_level,
        })
        .map(|(offset, _)| offset)
}

/// Estimates historical gap fill rate and fill time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillProbabilityEstimator {
    /// Bars searched after each gap
    lookahead: usize,
    /// Usable bars required by `estimate`
    min_bars: usize,
}

impl FillProbabilityEstimator {
    /// Create an estimator
    pub fn new(lookahead: usize, min_bars: usize) -> Self {
        Self {
            lookahead: lookahead.max(1),
            min_bars,
        }
    }

    /// Create an estimator with the default 10-bar window and 20-bar minimum
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_LOOKAHEAD, DEFAULT_MIN_BARS)
    }

    pub fn lookahead(&self) -> usize {
        self.lookahead
    }

    pub fn min_bars(&self) -> usize {
        self.min_bars
    }

    /// Fill statistics over every gap in `series`
    ///
    /// Returns the neutral default (0.5 fill rate, no gaps) when the series
    /// has fewer usable bars than the configured minimum. Short history is an
    /// expected condition, not an error.
    pub fn estimate(&self, series: &BarSeries) -> ProbabilityResult {
        if series.usable_bars() < self.min_bars {
            tracing::debug!(
                symbol = series.symbol(),
                usable_bars = series.usable_bars(),
                min_bars = self.min_bars,
                "Insufficient history, using neutral fill probability"
            );
            return ProbabilityResult::neutral();
        }

        let events = GapDetector::unfiltered().detect(series);
        self.estimate_events(series, &events)
    }

    /// Fill statistics over the given events, without the minimum-history guard
    pub fn estimate_events(&self, series: &BarSeries, events: &[GapEvent]) -> ProbabilityResult {
        let outcomes = self.outcomes(series, events);
        let result = Self::aggregate(&outcomes);

        tracing::debug!(
            symbol = series.symbol(),
            total_gaps = result.total_gaps,
            filled_gaps = result.filled_gaps,
            fill_rate = result.fill_rate,
            "Fill probability estimated"
        );

        result
    }

    /// Outcome of every event, in event order
    ///
    /// Each forward scan is independent and read-only, so they run in parallel.
    pub fn outcomes(&self, series: &BarSeries, events: &[GapEvent]) -> Vec<FillOutcome> {
        events
            .par_iter()
            .map(|event| self.outcome(series, event))
            .collect()
    }

    /// Outcome of a single gap
    pub fn outcome(&self, series: &BarSeries, event: &GapEvent) -> FillOutcome {
        match first_fill(series, event, self.lookahead) {
            Some(bars) => FillOutcome::filled(bars),
            None => FillOutcome::unfilled(),
        }
    }

    /// Aggregate outcomes into fill rate and mean fill time
    ///
    /// Unfilled gaps count towards the fill rate denominator but not the
    /// fill time average. No outcomes at all yields the neutral default.
    pub fn aggregate(outcomes: &[FillOutcome]) -> ProbabilityResult {
        if outcomes.is_empty() {
            return ProbabilityResult::neutral();
        }

        let fill_times: Vec<usize> = outcomes.iter().filter_map(|o| o.bars_to_fill).collect();
        let filled_gaps = fill_times.len();
        let total_gaps = outcomes.len();

        let avg_fill_time = if fill_times.is_empty() {
            0.0
        } else {
            fill_times.iter().sum::<usize>() as f64 / filled_gaps as f64
        };

        ProbabilityResult {
            fill_rate: filled_gaps as f64 / total_gaps as f64,
            avg_fill_time,
            total_gaps,
            filled_gaps,
            is_default: false,
        }
    }
}

impl Default for FillProbabilityEstimator {
    fn default() -> Self {
        Self::with_defaults()
    }
}
