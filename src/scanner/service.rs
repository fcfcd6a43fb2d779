//! Gap scanner service

use chrono::{DateTime, Duration, Utc};
use futures_util::{stream, StreamExt};
use std::time::Instant;

use super::records::{
    round2, BacktestRecord, BacktestReport, GapScanRecord, GapSnapshot, ProbabilityRecord,
    ScanInputs, SymbolDetail,
};
use super::ScanError;
use crate::backtest::{BacktestConfig, BacktestSimulator};
use crate::bars::BarSeries;
use crate::config::Config;
use crate::conviction::{ConvictionInputs, ConvictionScorer, Recommendation};
use crate::feed::{BarFeed, BarsRequest, FeedError};
use crate::gap::GapDetector;
use crate::probability::FillProbabilityEstimator;
use crate::sentiment::{Sentiment, SentimentSource};
use crate::telemetry::{self, CounterMetric, LatencyMetric, SkipReason};

/// Parameters for scans, backtests and detail views
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSettings {
    /// Minimum |gap| in percent for a scan hit (inclusive)
    pub min_gap_pct: f64,
    /// Maximum |gap| in percent for a scan hit (inclusive)
    pub max_gap_pct: f64,
    /// Bars averaged for the volume ratio
    pub volume_lookback: usize,
    /// Fill search window
    pub lookahead: usize,
    /// Usable bars required for fill statistics
    pub probability_min_bars: usize,
    /// Calendar days of history behind a scan
    pub lookback_days: u32,
    /// Calendar days of history behind the detail view's fill statistics
    pub detail_lookback_days: u32,
    pub backtest: BacktestConfig,
    /// Calendar days of history replayed by backtests
    pub backtest_days: u32,
    /// Maximum scan records returned
    pub limit: usize,
    /// Symbols processed concurrently
    pub concurrency: usize,
}

impl From<&Config> for ScanSettings {
    fn from(config: &Config) -> Self {
        Self {
            min_gap_pct: config.gap.min_gap_pct,
            max_gap_pct: config.gap.max_gap_pct,
            volume_lookback: config.gap.volume_lookback,
            lookahead: config.probability.lookahead,
            probability_min_bars: config.probability.min_bars,
            lookback_days: config.probability.lookback_days,
            detail_lookback_days: config.probability.detail_lookback_days,
            backtest: BacktestConfig::from(&config.backtest),
            backtest_days: config.backtest.days,
            limit: config.scanner.limit,
            concurrency: config.scanner.concurrency.max(1),
        }
    }
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Scans symbols for tradeable gaps and reports on single symbols
///
/// Market data and sentiment are injected, so the scanner runs unchanged
/// against live vendors or in-memory fakes.
pub struct GapScanner<F, S> {
    feed: F,
    sentiment: S,
    settings: ScanSettings,
    scorer: ConvictionScorer,
    /// End of every history window; `None` means now
    as_of: Option<DateTime<Utc>>,
}

impl<F: BarFeed, S: SentimentSource> GapScanner<F, S> {
    /// Create a scanner
    pub fn new(feed: F, sentiment: S, settings: ScanSettings) -> Self {
        Self {
            feed,
            sentiment,
            settings,
            scorer: ConvictionScorer::new(),
            as_of: None,
        }
    }

    /// Pin history windows to end at `as_of` instead of now
    pub fn with_as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = Some(as_of);
        self
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    fn request(&self, symbol: &str, days: u32) -> BarsRequest {
        match self.as_of {
            Some(end) => BarsRequest::daily(symbol, days, end),
            None => BarsRequest::trailing_days(symbol, days),
        }
    }

    fn estimator(&self) -> FillProbabilityEstimator {
        FillProbabilityEstimator::new(self.settings.lookahead, self.settings.probability_min_bars)
    }

    async fn sentiment_for(&self, symbol: &str) -> Sentiment {
        match self.sentiment.analyze_symbol(symbol).await {
            Ok(sentiment) => sentiment,
            Err(e) => {
                tracing::warn!(symbol, error = %e, "Sentiment unavailable, using neutral");
                Sentiment::neutral()
            }
        }
    }

    /// Scan `symbols` for gaps on their latest bar
    ///
    /// Symbols that fail to fetch, return malformed bars or did not gap are
    /// left out. Results are ordered by gap size, largest first, and capped at
    /// the configured limit.
    pub async fn scan(&self, symbols: &[String]) -> Vec<GapScanRecord> {
        let started = Instant::now();

        let mut hits: Vec<(f64, GapScanRecord)> = stream::iter(symbols)
            .map(|symbol| self.scan_symbol(symbol))
            .buffer_unordered(self.settings.concurrency.max(1))
            .filter_map(|hit| async move { hit })
            .collect()
            .await;

        hits.sort_by(|(a, ra), (b, rb)| b.total_cmp(a).then_with(|| ra.symbol.cmp(&rb.symbol)));
        hits.truncate(self.settings.limit);

        telemetry::record_latency(LatencyMetric::Scan, started.elapsed());
        tracing::info!(
            symbols = symbols.len(),
            gaps = hits.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Scan complete"
        );

        hits.into_iter().map(|(_, record)| record).collect()
    }

    /// Record for one symbol with its full-precision gap magnitude for ordering
    async fn scan_symbol(&self, symbol: &str) -> Option<(f64, GapScanRecord)> {
        telemetry::increment(CounterMetric::SymbolsScanned, 1);

        let request = self.request(symbol, self.settings.lookback_days);
        let series = match self.feed.fetch_bars(&request).await {
            Ok(series) => series,
            Err(e) => {
                log_fetch_failure(symbol, &e);
                return None;
            }
        };

        let event = GapDetector::new(self.settings.min_gap_pct)
            .latest(&series)
            .filter(|gap| gap.magnitude() <= self.settings.max_gap_pct);
        let Some(event) = event else {
            tracing::debug!(symbol, "No qualifying gap on latest bar");
            telemetry::record_skip(SkipReason::NoGap);
            return None;
        };
        telemetry::increment(CounterMetric::GapsDetected, 1);

        let volume_ratio = series.volume_ratio(event.index, self.settings.volume_lookback);
        let probability = self.estimator().estimate(&series);
        let sentiment = self.sentiment_for(symbol).await;

        let inputs = ConvictionInputs {
            gap_pct: event.gap_pct,
            fill_rate: probability.fill_rate,
            volume_ratio,
            sentiment_score: sentiment.score,
        };
        let conviction = self.scorer.classify(&inputs);
        let reasons = self.scorer.reasons(&inputs);

        tracing::debug!(
            symbol,
            gap_pct = event.gap_pct,
            fill_rate = probability.fill_rate,
            volume_ratio,
            conviction = %conviction,
            "Gap scored"
        );

        let record = GapScanRecord::build(ScanInputs {
            series: &series,
            event: &event,
            volume_ratio,
            probability: &probability,
            sentiment,
            conviction,
            reasons,
        })?;

        Some((event.magnitude(), record))
    }

    /// Backtest the gap-fill strategy over the last `days` calendar days
    ///
    /// Short history is not an error: the report carries the zero result
    /// with `insufficient_data` set.
    pub async fn backtest(&self, symbol: &str, days: u32) -> Result<BacktestReport, ScanError> {
        let request = self.request(symbol, days);
        let series = self.fetch(&request).await?;

        let result = BacktestSimulator::new(self.settings.backtest.clone()).run(&series);
        if result.insufficient_data {
            tracing::info!(
                symbol,
                usable_bars = series.usable_bars(),
                min_bars = self.settings.backtest.min_bars,
                "Insufficient history, reporting zero backtest"
            );
        }

        let record = BacktestRecord::from_result(symbol, request.start, request.end, &result);
        Ok(BacktestReport { record, result })
    }

    /// Latest gap, fill statistics, sentiment, backtest and recommendation
    ///
    /// Short history degrades to the neutral probability and zero backtest
    /// rather than failing.
    pub async fn detail(&self, symbol: &str) -> Result<SymbolDetail, ScanError> {
        let backtest_days = self.settings.backtest_days;
        let detail_days = self.settings.detail_lookback_days;

        let request = self.request(symbol, backtest_days.max(detail_days));
        let history = self.fetch(&request).await?;
        let recent = history.since(request.end - Duration::days(i64::from(detail_days)));
        let replayed = history.since(request.end - Duration::days(i64::from(backtest_days)));

        let Some(last) = recent.last().or(history.last()) else {
            return Err(ScanError::NotFound(symbol.to_string()));
        };
        let price = round2(last.close);

        let latest_gap = GapDetector::unfiltered().latest(&recent).map(|gap| GapSnapshot::from(&gap));
        let probability = self.estimator().estimate(&recent);
        let sentiment = self.sentiment_for(symbol).await;
        let backtest = BacktestSimulator::new(self.settings.backtest.clone()).run(&replayed);

        let mut recommendation =
            Recommendation::from_stats(probability.fill_rate, backtest.summary.win_rate);
        recommendation.expected_win_rate = round2(recommendation.expected_win_rate);
        recommendation.fill_probability = round2(recommendation.fill_probability);

        Ok(SymbolDetail {
            symbol: symbol.to_string(),
            price,
            latest_gap,
            probability: ProbabilityRecord::from(&probability),
            sentiment,
            backtest: BacktestRecord::from_result(
                symbol,
                request.end - Duration::days(i64::from(backtest_days)),
                request.end,
                &backtest,
            ),
            recommendation,
        })
    }

    async fn fetch(&self, request: &BarsRequest) -> Result<BarSeries, ScanError> {
        self.feed.fetch_bars(request).await.map_err(|e| {
            log_fetch_failure(&request.symbol, &e);
            ScanError::from(e)
        })
    }
}

fn log_fetch_failure(symbol: &str, error: &FeedError) {
    if error.is_invalid_series() {
        tracing::error!(symbol, error = %error, "Rejecting malformed bar series");
        telemetry::record_skip(SkipReason::InvalidSeries);
    } else {
        tracing::warn!(symbol, error = %error, "Bar fetch failed");
        telemetry::record_skip(SkipReason::Upstream);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bars::testing::daily;
    use crate::feed::MemoryFeed;
    use crate::sentiment::NeutralSentiment;
    use chrono::TimeZone;

    const BASE: (f64, f64, f64, f64) = (100.0, 101.0, 99.0, 100.0);

    /// Fixture bars run daily from 2024-01-02; pin windows just past the last one
    fn as_of(bars: usize) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 23, 0, 0).unwrap() + Duration::days(bars as i64 - 1)
    }

    fn gapping(symbol: &str, open: f64) -> BarSeries {
        let mut ohlc = vec![BASE; 30];
        ohlc.push((open, open + 1.0, open - 0.5, open));
        daily(symbol, &ohlc)
    }

    fn scanner(feed: MemoryFeed) -> GapScanner<MemoryFeed, NeutralSentiment> {
        GapScanner::new(feed, NeutralSentiment, ScanSettings::default()).with_as_of(as_of(31))
    }

    #[tokio::test]
    async fn test_scan_orders_by_gap_size() {
        let feed = MemoryFeed::new()
            .with_series(gapping("AAA", 103.0))
            .with_series(gapping("BBB", 106.0))
            .with_series(gapping("CCC", 95.0));
        let symbols: Vec<String> = ["AAA", "BBB", "CCC"].iter().map(|s| s.to_string()).collect();

        let records = scanner(feed).scan(&symbols).await;
        let order: Vec<&str> = records.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(order, vec!["BBB", "CCC", "AAA"]);
        assert_eq!(records[0].gap_percent, 6.0);
        assert_eq!(records[1].gap_percent, -5.0);
    }

    #[tokio::test]
    async fn test_scan_skips_failures_and_quiet_symbols() {
        let feed = MemoryFeed::new()
            .with_series(gapping("GAP", 104.0))
            .with_series(daily("FLAT", &vec![BASE; 31]))
            .with_failure("DOWN");
        let symbols: Vec<String> = ["GAP", "FLAT", "DOWN", "MISSING"].iter().map(|s| s.to_string()).collect();

        let records = scanner(feed).scan(&symbols).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].symbol, "GAP");
    }

    #[tokio::test]
    async fn test_scan_respects_gap_bounds_and_limit() {
        let feed = MemoryFeed::new()
            .with_series(gapping("TINY", 101.2))
            .with_series(gapping("HUGE", 120.0))
            .with_series(gapping("OK1", 103.0))
            .with_series(gapping("OK2", 104.0));
        let symbols: Vec<String> = ["TINY", "HUGE", "OK1", "OK2"].iter().map(|s| s.to_string()).collect();

        let mut settings = ScanSettings::default();
        settings.limit = 1;
        let records = GapScanner::new(feed, NeutralSentiment, settings)
            .with_as_of(as_of(31))
            .scan(&symbols)
            .await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].symbol, "OK2");
    }

    #[tokio::test]
    async fn test_backtest_insufficient_data() {
        let feed = MemoryFeed::new().with_series(gapping("NEW", 104.0));
        let report = scanner(feed).backtest("NEW", 365).await.unwrap();

        assert!(report.result.insufficient_data);
        assert!(report.record.insufficient_data);
        assert_eq!(report.record.total_trades, 0);
        assert_eq!(report.record.win_rate, 0.0);
        assert_eq!(report.record.total_return, 0.0);
        assert_eq!(report.record.sharpe_ratio, 0.0);
    }

    #[tokio::test]
    async fn test_detail_unknown_symbol() {
        let result = scanner(MemoryFeed::new()).detail("NOPE").await;
        assert!(matches!(result, Err(ScanError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_detail_short_history_degrades() {
        let feed = MemoryFeed::new().with_series(gapping("NEW", 104.0));
        let detail = scanner(feed).detail("NEW").await.unwrap();

        assert_eq!(detail.price, 104.0);
        assert!(detail.latest_gap.is_some());
        assert_eq!(detail.backtest.total_trades, 0);
        assert_eq!(detail.sentiment, Sentiment::neutral());
    }
}
