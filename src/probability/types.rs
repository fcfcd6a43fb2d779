//! Fill probability types

use serde::{Deserialize, Serialize};

/// Result of searching forward from one gap for a fill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillOutcome {
    /// Whether price touched the reference level within the lookahead window
    pub filled: bool,
    /// Bars after the gap until the touch, in `[1, lookahead]`; `None` if unfilled
    pub bars_to_fill: Option<usize>,
}

impl FillOutcome {
    pub fn filled(bars_to_fill: usize) -> Self {
        Self {
            filled: true,
            bars_to_fill: Some(bars_to_fill),
        }
    }

    pub fn unfilled() -> Self {
        Self {
            filled: false,
            bars_to_fill: None,
        }
    }
}

/// Historical fill statistics for one symbol
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityResult {
    /// Filled gaps over total gaps, in `[0, 1]`
    pub fill_rate: f64,
    /// Mean bars to fill over filled gaps only; 0 when nothing filled
    pub avg_fill_time: f64,
    /// Gaps examined
    pub total_gaps: usize,
    /// Gaps that filled within the window
    pub filled_gaps: usize,
    /// True when the result is the neutral default rather than measured
    pub is_default: bool,
}

impl ProbabilityResult {
    /// Neutral result used when history is too short to measure anything
    pub fn neutral() -> Self {
        Self {
            fill_rate: 0.5,
            avg_fill_time: 0.0,
            total_gaps: 0,
            filled_gaps: 0,
            is_default: true,
        }
    }
}

impl Default for ProbabilityResult {
    fn default() -> Self {
        Self::neutral()
    }
}
