//! Alpaca market data v2 REST client
//!
//! Fetches historical stock bars one symbol at a time, following
//! `next_page_token` until the window is exhausted.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::{Duration, Instant};

use super::{BarFeed, BarsRequest, FeedError};
use crate::bars::{Bar, BarSeries};
use crate::config::{secret_from_env, DataConfig};
use crate::telemetry::{self, LatencyMetric};

/// Alpaca market data base URL
pub const ALPACA_DATA_URL: &str = "https://data.alpaca.markets";

/// Bars requested per page (vendor maximum)
const PAGE_LIMIT: &str = "10000";

/// Pages followed for one request before giving up on pagination
const MAX_PAGES: usize = 100;

/// Configuration for the Alpaca client
#[derive(Debug, Clone)]
pub struct AlpacaConfig {
    /// Base URL for the market data API
    pub base_url: String,
    /// Data feed (`iex` or `sip`)
    pub feed: String,
    /// Request timeout
    pub timeout: Duration,
    pub api_key: SecretString,
    pub api_secret: SecretString,
}

impl AlpacaConfig {
    /// Build from config, reading credentials from the configured environment variables
    pub fn from_env(data: &DataConfig) -> Result<Self, FeedError> {
        let api_key = secret_from_env(&data.api_key_env)
            .ok_or_else(|| FeedError::MissingCredentials(data.api_key_env.clone()))?;
        let api_secret = secret_from_env(&data.api_secret_env)
            .ok_or_else(|| FeedError::MissingCredentials(data.api_secret_env.clone()))?;

        Ok(Self {
            base_url: data.base_url.clone(),
            feed: data.feed.clone(),
            timeout: data.timeout(),
            api_key,
            api_secret,
        })
    }
}

/// One page of the single-symbol bars endpoint
#[derive(Debug, Deserialize)]
struct BarsPage {
    /// `null` when the window holds no bars
    #[serde(default)]
    bars: Option<Vec<AlpacaBar>>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AlpacaBar {
    #[serde(rename = "t")]
    timestamp: DateTime<Utc>,
    #[serde(rename = "o")]
    open: f64,
    #[serde(rename = "h")]
    high: f64,
    #[serde(rename = "l")]
    low: f64,
    #[serde(rename = "c")]
    close: f64,
    #[serde(rename = "v")]
    volume: f64,
}

impl From<AlpacaBar> for Bar {
    fn from(bar: AlpacaBar) -> Self {
        Bar::new(
            bar.timestamp,
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume.max(0.0).round() as u64,
        )
    }
}

fn parse_page(body: &str) -> Result<BarsPage, FeedError> {
    serde_json::from_str(body).map_err(|e| FeedError::Decode(e.to_string()))
}

/// Token for the page after `pages` fetched pages, or `None` to stop
///
/// Stops on a missing or empty token, on a token equal to the one just
/// followed, and after [`MAX_PAGES`] pages.
fn next_page_token(
    symbol: &str,
    current: Option<&str>,
    next: Option<String>,
    pages: usize,
) -> Option<String> {
    let token = next.filter(|token| !token.is_empty())?;
    if current == Some(token.as_str()) {
        tracing::warn!(symbol, token = %token, "Alpaca repeated a page token, stopping pagination");
        return None;
    }
    if pages >= MAX_PAGES {
        tracing::warn!(symbol, pages, "Alpaca page limit reached, truncating bars");
        return None;
    }
    Some(token)
}

/// Client for Alpaca's historical stock bars
pub struct AlpacaFeed {
    config: AlpacaConfig,
    client: Client,
}

impl AlpacaFeed {
    /// Create a new client
    pub fn new(config: AlpacaConfig) -> Result<Self, FeedError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn bars_url(&self, symbol: &str) -> String {
        format!(
            "{}/v2/stocks/{}/bars",
            self.config.base_url.trim_end_matches('/'),
            symbol
        )
    }

    async fn fetch_page(
        &self,
        request: &BarsRequest,
        page_token: Option<&str>,
    ) -> Result<BarsPage, FeedError> {
        let mut query = vec![
            ("timeframe", request.timeframe.as_str().to_string()),
            ("start", request.start.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("end", request.end.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("limit", PAGE_LIMIT.to_string()),
            ("adjustment", "raw".to_string()),
            ("feed", self.config.feed.clone()),
        ];
        if let Some(token) = page_token {
            query.push(("page_token", token.to_string()));
        }

        let response = self
            .client
            .get(self.bars_url(&request.symbol))
            .header("APCA-API-KEY-ID", self.config.api_key.expose_secret())
            .header("APCA-API-SECRET-KEY", self.config.api_secret.expose_secret())
            .query(&query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Api {
                status: status.as_u16(),
                body,
            });
        }

        parse_page(&response.text().await?)
    }
}

#[async_trait]
impl BarFeed for AlpacaFeed {
    async fn fetch_bars(&self, request: &BarsRequest) -> Result<BarSeries, FeedError> {
        let started = Instant::now();
        let mut bars: Vec<Bar> = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0;

        loop {
            let page = self.fetch_page(request, page_token.as_deref()).await?;
            pages += 1;
            bars.extend(page.bars.unwrap_or_default().into_iter().map(Bar::from));

            match next_page_token(&request.symbol, page_token.as_deref(), page.next_page_token, pages) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        telemetry::record_latency(LatencyMetric::BarFetch, started.elapsed());
        tracing::debug!(
            symbol = %request.symbol,
            bars = bars.len(),
            pages,
            timeframe = %request.timeframe,
            "Fetched bars from Alpaca"
        );

        if bars.is_empty() {
            return Err(FeedError::NotFound(request.symbol.clone()));
        }

        Ok(BarSeries::new(request.symbol.clone(), bars)?)
    }
}
