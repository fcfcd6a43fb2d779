//! Gap event types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of an opening gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GapDirection {
    /// Opened above the previous high
    Up,
    /// Opened below the previous low
    Down,
}

impl fmt::Display for GapDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GapDirection::Up => f.write_str("up"),
            GapDirection::Down => f.write_str("down"),
        }
    }
}

/// A detected opening gap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapEvent {
    /// Symbol of the series the gap was found in
    pub symbol: String,

    /// Position of the gapping bar within the series (always >= 1)
    pub index: usize,

    /// Gap direction
    pub direction: GapDirection,

    /// Previous high for a gap up, previous low for a gap down
    pub reference_level: f64,

    /// Signed gap size in percent of the previous close (4.0 = 4%)
    pub gap_pct: f64,

    /// Open of the gapping bar
    pub open: f64,

    /// Close of the bar before the gap
    pub previous_close: f64,
}

impl GapEvent {
    pub fn is_up(&self) -> bool {
        self.direction == GapDirection::Up
    }

    pub fn is_down(&self) -> bool {
        self.direction == GapDirection::Down
    }

    /// Absolute gap size in percent
    pub fn magnitude(&self) -> f64 {
        self.gap_pct.abs()
    }
}
