//! In-memory bar feed
//!
//! Serves pre-built series keyed by symbol. Deterministic, so the scanner and
//! backtest can be driven end-to-end without a network.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

use super::{BarFeed, BarsRequest, FeedError};
use crate::bars::{BarSeries, SeriesError};

/// Bar feed backed by series held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryFeed {
    series: HashMap<String, BarSeries>,
    /// Symbols that answer with an upstream error
    failing: HashSet<String>,
    /// Symbols whose bars fail validation
    invalid: HashSet<String>,
}

impl MemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a symbol's series
    pub fn insert(&mut self, series: BarSeries) {
        self.series.insert(series.symbol().to_string(), series);
    }

    /// Builder form of [`insert`](Self::insert)
    pub fn with_series(mut self, series: BarSeries) -> Self {
        self.insert(series);
        self
    }

    /// Make `symbol` fail as if the vendor were unavailable
    pub fn with_failure(mut self, symbol: impl Into<String>) -> Self {
        self.failing.insert(symbol.into());
        self
    }

    /// Make `symbol` answer with a bar whose high is below its low
    pub fn with_invalid(mut self, symbol: impl Into<String>) -> Self {
        self.invalid.insert(symbol.into());
        self
    }
}

#[async_trait]
impl BarFeed for MemoryFeed {
    async fn fetch_bars(&self, request: &BarsRequest) -> Result<BarSeries, FeedError> {
        if self.failing.contains(&request.symbol) {
            return Err(FeedError::Api {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        if self.invalid.contains(&request.symbol) {
            return Err(FeedError::InvalidSeries(SeriesError::HighBelowLow {
                symbol: request.symbol.clone(),
                index: 0,
                high: 99.0,
                low: 101.0,
            }));
        }

        let series = self
            .series
            .get(&request.symbol)
            .ok_or_else(|| FeedError::NotFound(request.symbol.clone()))?;

        let bars: Vec<_> = series
            .bars()
            .iter()
            .filter(|bar| bar.timestamp >= request.start && bar.timestamp <= request.end)
            .cloned()
            .collect();

        if bars.is_empty() {
            return Err(FeedError::NotFound(request.symbol.clone()));
        }

        Ok(BarSeries::new(series.symbol(), bars)?)
    }
}
