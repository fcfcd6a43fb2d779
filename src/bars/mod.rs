//! Price bar module
//!
//! OHLCV bars and the validated, immutable series the analytics run over

mod series;
mod types;

pub use series::{BarSeries, SeriesError};
pub use types::{Bar, Timeframe};

#[cfg(test)]
pub(crate) use series::testing;
