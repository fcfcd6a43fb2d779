//! Market data feed module
//!
//! Fetches daily bars from the market data vendor and hands them to the
//! analytics as validated series.

mod alpaca;
mod memory;
mod types;

pub use alpaca::{AlpacaConfig, AlpacaFeed, ALPACA_DATA_URL};
pub use memory::MemoryFeed;
pub use types::{BarsRequest, FeedError};

use async_trait::async_trait;

use crate::bars::BarSeries;

/// Source of historical bars
#[async_trait]
pub trait BarFeed: Send + Sync {
    /// Bars for `request.symbol` between `request.start` and `request.end`
    async fn fetch_bars(&self, request: &BarsRequest) -> Result<BarSeries, FeedError>;
}
