//! Market data feed types

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::bars::{SeriesError, Timeframe};

/// Request for a window of bars
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarsRequest {
    /// Ticker symbol (e.g., "AAPL")
    pub symbol: String,
    /// Window start (inclusive)
    pub start: DateTime<Utc>,
    /// Window end (inclusive)
    pub end: DateTime<Utc>,
    /// Bar granularity
    pub timeframe: Timeframe,
}

impl BarsRequest {
    /// Daily bars over the `days` calendar days ending at `end`
    pub fn daily(symbol: impl Into<String>, days: u32, end: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            start: end - Duration::days(i64::from(days)),
            end,
            timeframe: Timeframe::Day,
        }
    }

    /// Daily bars over the last `days` calendar days
    pub fn trailing_days(symbol: impl Into<String>, days: u32) -> Self {
        Self::daily(symbol, days, Utc::now())
    }
}

/// Market data collaborator failure
#[derive(Debug, Error)]
pub enum FeedError {
    /// Transport failure
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Vendor returned an error status
    #[error("market data API error: {status} - {body}")]
    Api { status: u16, body: String },

    /// Response body did not match the expected shape
    #[error("undecodable market data response: {0}")]
    Decode(String),

    /// No bars for the symbol
    #[error("no bars for {0}")]
    NotFound(String),

    /// Credential environment variable unset
    #[error("missing credentials: set {0}")]
    MissingCredentials(String),

    /// Vendor returned bars that break series invariants
    #[error(transparent)]
    InvalidSeries(#[from] SeriesError),
}

impl FeedError {
    /// Whether the vendor sent malformed bars, as opposed to being unavailable
    pub fn is_invalid_series(&self) -> bool {
        matches!(self, FeedError::InvalidSeries(_))
    }
}
