//! End-to-end scanner tests over in-memory market data

use async_trait::async_trait;
use gap_fill::bars::SeriesError;
use gap_fill::conviction::{Action, Conviction};
use gap_fill::feed::MemoryFeed;
use gap_fill::gap::GapDirection;
use gap_fill::scanner::{GapScanner, ScanError, ScanSettings};
use gap_fill::sentiment::{Sentiment, SentimentError, SentimentLabel, SentimentSource};

use crate::common::{as_of, gappy, series};

struct FixedSentiment(f64);

#[async_trait]
impl SentimentSource for FixedSentiment {
    async fn analyze_symbol(&self, _symbol: &str) -> Result<Sentiment, SentimentError> {
        Ok(Sentiment::new(self.0, SentimentLabel::Positive))
    }

    async fn analyze_text(&self, _text: &str) -> Result<Sentiment, SentimentError> {
        Ok(Sentiment::new(self.0, SentimentLabel::Positive))
    }
}

struct BrokenSentiment;

#[async_trait]
impl SentimentSource for BrokenSentiment {
    async fn analyze_symbol(&self, _symbol: &str) -> Result<Sentiment, SentimentError> {
        Err(SentimentError::Parse("not json".to_string()))
    }

    async fn analyze_text(&self, _text: &str) -> Result<Sentiment, SentimentError> {
        Err(SentimentError::Parse("not json".to_string()))
    }
}

/// 200 bars of filling gap-ups followed by a final bar opening at `open`
fn gapping_today(symbol: &str, open: f64) -> gap_fill::bars::BarSeries {
    let mut ohlc: Vec<_> = gappy(symbol, 200)
        .bars()
        .iter()
        .map(|b| (b.open, b.high, b.low, b.close))
        .collect();
    ohlc.push((open, open + 1.0, open - 0.5, open));
    series(symbol, &ohlc)
}

fn feed() -> MemoryFeed {
    MemoryFeed::new()
        .with_series(gapping_today("AAA", 106.0))
        .with_series(gapping_today("BBB", 95.0))
        .with_series(gappy("QUIET", 201))
        .with_failure("DOWN")
}

fn symbols(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_scan_scores_and_ranks_gaps() {
    let scanner = GapScanner::new(feed(), FixedSentiment(0.6), ScanSettings::default()).with_as_of(as_of(200));
    let records = scanner
        .scan(&symbols(&["QUIET", "BBB", "DOWN", "AAA", "UNKNOWN"]))
        .await;

    assert_eq!(records.len(), 2);
    let aaa = &records[0];
    assert_eq!(aaa.symbol, "AAA");
    assert_eq!(aaa.gap_percent, 6.0);
    assert_eq!(aaa.direction, GapDirection::Up);
    assert_eq!(aaa.previous_close, 100.0);
    assert_eq!(aaa.volume_ratio, 1.0);
    // 13 filled gaps in history plus today's, which has no bars after it yet
    assert_eq!(aaa.historical_gaps, 14);
    assert_eq!(aaa.fill_probability, 0.93);
    assert_eq!(aaa.avg_fill_time, 1.0);
    assert_eq!(aaa.conviction, Conviction::High);
    assert_eq!(aaa.sentiment, 0.6);
    assert_eq!(
        aaa.reasons,
        vec!["Large 6.0% gap", "High fill rate (93%)", "Positive sentiment"]
    );

    let bbb = &records[1];
    assert_eq!(bbb.symbol, "BBB");
    assert_eq!(bbb.gap_percent, -5.0);
    assert_eq!(bbb.direction, GapDirection::Down);
}

#[tokio::test]
async fn test_scan_skips_malformed_bars() {
    let feed = feed().with_series(gapping_today("CCC", 104.0)).with_invalid("CCC");
    let scanner = GapScanner::new(feed, FixedSentiment(0.0), ScanSettings::default()).with_as_of(as_of(200));
    let records = scanner.scan(&symbols(&["CCC", "AAA", "BBB"])).await;

    let scanned: Vec<_> = records.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(scanned, vec!["AAA", "BBB"]);
}

#[tokio::test]
async fn test_detail_rejects_malformed_bars() {
    let feed = feed().with_invalid("AAA");
    let scanner = GapScanner::new(feed, FixedSentiment(0.0), ScanSettings::default()).with_as_of(as_of(200));

    assert!(matches!(
        scanner.detail("AAA").await,
        Err(ScanError::InvalidSeries(SeriesError::HighBelowLow { .. }))
    ));
    assert!(matches!(
        scanner.backtest("AAA", 365).await,
        Err(ScanError::InvalidSeries(_))
    ));
}

#[tokio::test]
async fn test_scan_survives_sentiment_outage() {
    let scanner = GapScanner::new(feed(), BrokenSentiment, ScanSettings::default()).with_as_of(as_of(200));
    let records = scanner.scan(&symbols(&["AAA"])).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].sentiment, 0.0);
    assert_eq!(records[0].sentiment_label, SentimentLabel::Neutral);
    assert_eq!(records[0].conviction, Conviction::High);
}

#[tokio::test]
async fn test_scan_serializes_camel_case() {
    let scanner = GapScanner::new(feed(), FixedSentiment(0.0), ScanSettings::default()).with_as_of(as_of(200));
    let records = scanner.scan(&symbols(&["AAA"])).await;

    let json = serde_json::to_value(&records).unwrap();
    assert_eq!(json[0]["gapPercent"], 6.0);
    assert_eq!(json[0]["conviction"], "HIGH");
    assert_eq!(json[0]["direction"], "up");
    assert!(json[0].get("fillProbability").is_some());
}

#[tokio::test]
async fn test_backtest_report() {
    let scanner = GapScanner::new(feed(), FixedSentiment(0.0), ScanSettings::default()).with_as_of(as_of(200));
    let report = scanner.backtest("AAA", 365).await.unwrap();

    // Today's gap has no exit bar yet and is discarded
    assert_eq!(report.record.total_trades, 13);
    assert_eq!(report.result.discarded_trades, 1);
    assert_eq!(report.record.win_rate, 100.0);
    assert!(report.record.total_return > 0.0);
    assert_eq!(report.record.end_date, as_of(200));
}

#[tokio::test]
async fn test_backtest_errors() {
    let scanner = GapScanner::new(feed(), FixedSentiment(0.0), ScanSettings::default()).with_as_of(as_of(200));

    assert!(matches!(
        scanner.backtest("UNKNOWN", 365).await,
        Err(ScanError::NotFound(_))
    ));
    assert!(matches!(
        scanner.backtest("DOWN", 365).await,
        Err(ScanError::Upstream(_))
    ));
}

#[tokio::test]
async fn test_short_backtest_window_reports_zero_result() {
    let scanner = GapScanner::new(feed(), FixedSentiment(0.0), ScanSettings::default()).with_as_of(as_of(200));
    let report = scanner.backtest("AAA", 30).await.unwrap();

    assert!(report.record.insufficient_data);
    assert_eq!(report.record.total_trades, 0);
    assert_eq!(report.record.total_return, 0.0);
    assert_eq!(report.result.summary.final_capital, report.result.summary.initial_capital);
}

#[tokio::test]
async fn test_detail_combines_everything() {
    let scanner = GapScanner::new(feed(), FixedSentiment(0.6), ScanSettings::default()).with_as_of(as_of(200));
    let detail = scanner.detail("AAA").await.unwrap();

    assert_eq!(detail.price, 106.0);
    let gap = detail.latest_gap.unwrap();
    assert_eq!(gap.gap_percent, 6.0);
    assert_eq!(gap.reference_level, 101.0);
    assert_eq!(detail.probability.fill_rate, 0.93);
    assert!(!detail.probability.is_default);
    assert_eq!(detail.backtest.total_trades, 13);
    assert_eq!(detail.recommendation.action, Action::StrongBuy);
    assert_eq!(detail.recommendation.confidence, Conviction::High);
    assert_eq!(detail.sentiment.score, 0.6);
}

#[tokio::test]
async fn test_detail_without_gap_today() {
    let scanner = GapScanner::new(feed(), FixedSentiment(0.0), ScanSettings::default()).with_as_of(as_of(200));
    let detail = scanner.detail("QUIET").await.unwrap();

    assert!(detail.latest_gap.is_none());
    assert_eq!(detail.price, 100.0);
    assert_eq!(detail.probability.fill_rate, 1.0);
}
