//! Conviction types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ranking tier for a gap
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Conviction {
    Low,
    Medium,
    High,
}

impl Conviction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Conviction::High => "HIGH",
            Conviction::Medium => "MEDIUM",
            Conviction::Low => "LOW",
        }
    }
}

impl fmt::Display for Conviction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signals scored for one gap
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConvictionInputs {
    /// Signed gap in percent (4.0 = 4%)
    pub gap_pct: f64,
    /// Historical fill rate in [0, 1]
    pub fill_rate: f64,
    /// Gap bar volume over trailing mean volume
    pub volume_ratio: f64,
    /// Sentiment score in [-1, 1]
    pub sentiment_score: f64,
}

/// Suggested action for a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "WAIT")]
    Wait,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::StrongBuy => f.write_str("STRONG BUY"),
            Action::Buy => f.write_str("BUY"),
            Action::Wait => f.write_str("WAIT"),
        }
    }
}

/// Action backed by fill rate and backtest win rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub action: Action,
    pub confidence: Conviction,
    pub expected_win_rate: f64,
    pub fill_probability: f64,
}

impl Recommendation {
    /// Strong buy needs fill >= 75% and win >= 70%; buy needs both >= 60%
    pub fn from_stats(fill_rate: f64, win_rate: f64) -> Self {
        let (action, confidence) = if fill_rate >= 0.75 && win_rate >= 0.70 {
            (Action::StrongBuy, Conviction::High)
        } else if fill_rate >= 0.60 && win_rate >= 0.60 {
            (Action::Buy, Conviction::Medium)
        } else {
            (Action::Wait, Conviction::Low)
        };

        Self {
            action,
            confidence,
            expected_win_rate: win_rate,
            fill_probability: fill_rate,
        }
    }
}
