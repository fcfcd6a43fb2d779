//! Additive point scorer

use super::types::{Conviction, ConvictionInputs};

/// Scores a gap by summing fixed points per signal
///
/// | signal                 | points |
/// |------------------------|--------|
/// | \|gap\| in [2, 8]       | +3     |
/// | \|gap\| < 2 or > 15     | -1     |
/// | fill rate >= 0.75      | +3     |
/// | fill rate >= 0.60      | +2     |
/// | fill rate < 0.50       | -2     |
/// | volume ratio >= 2      | +2     |
/// | \|sentiment\| > 0.5     | +1     |
///
/// Total >= 6 is HIGH, >= 3 MEDIUM, otherwise LOW.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvictionScorer;

impl ConvictionScorer {
    pub fn new() -> Self {
        Self
    }

    /// Point total for the inputs
    pub fn score(&self, inputs: &ConvictionInputs) -> i32 {
        let magnitude = inputs.gap_pct.abs();
        let gap_points = if (2.0..=8.0).contains(&magnitude) {
            3
        } else if magnitude < 2.0 || magnitude > 15.0 {
            -1
        } else {
            0
        };

        let fill_points = if inputs.fill_rate >= 0.75 {
            3
        } else if inputs.fill_rate >= 0.60 {
            2
        } else if inputs.fill_rate < 0.50 {
            -2
        } else {
            0
        };

        let volume_points = if inputs.volume_ratio >= 2.0 { 2 } else { 0 };
        let sentiment_points = if inputs.sentiment_score.abs() > 0.5 { 1 } else { 0 };

        gap_points + fill_points + volume_points + sentiment_points
    }

    /// Tier for the inputs
    pub fn classify(&self, inputs: &ConvictionInputs) -> Conviction {
        match self.score(inputs) {
            s if s >= 6 => Conviction::High,
            s if s >= 3 => Conviction::Medium,
            _ => Conviction::Low,
        }
    }

    /// Human-readable reasons supporting the gap
    pub fn reasons(&self, inputs: &ConvictionInputs) -> Vec<String> {
        let mut reasons = Vec::new();

        let magnitude = inputs.gap_pct.abs();
        if magnitude > 5.0 {
            reasons.push(format!("Large {:.1}% gap", magnitude));
        }
        if inputs.fill_rate >= 0.70 {
            reasons.push(format!("High fill rate ({:.0}%)", inputs.fill_rate * 100.0));
        }
        if inputs.volume_ratio >= 2.0 {
            reasons.push(format!("Volume spike ({:.1}x)", inputs.volume_ratio));
        }
        if inputs.sentiment_score > 0.3 {
            reasons.push("Positive sentiment".to_string());
        } else if inputs.sentiment_score < -0.3 {
            reasons.push("Negative sentiment".to_string());
        }

        reasons
    }
}
