//! Shared fixtures

use chrono::{DateTime, Duration, TimeZone, Utc};
use gap_fill::bars::{Bar, BarSeries};

/// Timestamp of the first fixture bar
pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap()
}

/// Window end just after fixture bar `index`
pub fn as_of(index: usize) -> DateTime<Utc> {
    start() + Duration::days(index as i64) + Duration::hours(8)
}

/// Daily bars from `(open, high, low, close)` tuples, one calendar day apart
pub fn series(symbol: &str, ohlc: &[(f64, f64, f64, f64)]) -> BarSeries {
    let bars = ohlc
        .iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| Bar::new(start() + Duration::days(i as i64), o, h, l, c, 1_000))
        .collect();
    BarSeries::new(symbol, bars).unwrap()
}

/// Quiet 100-centred bars with a 4% gap up every 15 bars that fills on the next bar
pub fn gappy(symbol: &str, n: usize) -> BarSeries {
    let mut ohlc = vec![(100.0, 101.0, 99.0, 100.0); n];
    for i in (15..n).step_by(15) {
        ohlc[i] = (104.0, 104.5, 99.5, 100.0);
    }
    series(symbol, &ohlc)
}
