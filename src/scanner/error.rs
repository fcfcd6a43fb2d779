//! Single-symbol scan errors

use thiserror::Error;

use crate::bars::SeriesError;
use crate::feed::FeedError;

/// Why a single-symbol request produced no record
#[derive(Debug, Error)]
pub enum ScanError {
    /// The vendor has no bars for the symbol
    #[error("symbol {0} not found")]
    NotFound(String),

    /// The vendor returned malformed bars
    #[error("invalid bar series: {0}")]
    InvalidSeries(#[from] SeriesError),

    /// The vendor could not be reached or refused the request
    #[error("market data unavailable: {0}")]
    Upstream(FeedError),
}

impl From<FeedError> for ScanError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::NotFound(symbol) => ScanError::NotFound(symbol),
            FeedError::InvalidSeries(e) => ScanError::InvalidSeries(e),
            other => ScanError::Upstream(other),
        }
    }
}
