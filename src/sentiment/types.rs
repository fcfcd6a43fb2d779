//! Sentiment types

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Coarse sentiment label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl SentimentLabel {
    /// Lenient parse of a model-provided label; anything unrecognised is neutral
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "positive" | "bullish" => SentimentLabel::Positive,
            "negative" | "bearish" => SentimentLabel::Negative,
            _ => SentimentLabel::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sentiment score with its label
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    /// -1 (very negative) to 1 (very positive)
    pub score: f64,
    pub label: SentimentLabel,
}

impl Sentiment {
    /// Create a sentiment, clamping the score into [-1, 1]
    ///
    /// Non-finite scores become 0.
    pub fn new(score: f64, label: SentimentLabel) -> Self {
        let score = if score.is_finite() {
            score.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        Self { score, label }
    }

    /// `{0.0, neutral}`
    pub fn neutral() -> Self {
        Self {
            score: 0.0,
            label: SentimentLabel::Neutral,
        }
    }
}

impl Default for Sentiment {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Sentiment collaborator failure
#[derive(Debug, Error)]
pub enum SentimentError {
    /// Transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Service returned an error status
    #[error("sentiment API error: {status} - {body}")]
    Api { status: u16, body: String },

    /// Model output was not the requested JSON
    #[error("unparseable sentiment response: {0}")]
    Parse(String),

    /// API key environment variable unset
    #[error("missing credentials: set {0}")]
    MissingCredentials(String),
}
