//! Configuration types for gap-fill

use rust_decimal::Decimal;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::backtest::{BacktestConfig, ExecutionKind};
use crate::feed::ALPACA_DATA_URL;
use crate::telemetry::LogFormat;

/// Root configuration structure
///
/// Every section is optional; missing sections and fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub sentiment: SentimentConfig,
    pub gap: GapConfig,
    pub probability: ProbabilityConfig,
    pub backtest: BacktestSettings,
    pub scanner: ScannerConfig,
    pub telemetry: TelemetryConfig,
}

/// Market data vendor configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Alpaca market data base URL
    #[serde(default = "default_data_url")]
    pub base_url: String,

    /// Alpaca data feed (`iex` is the free tier)
    #[serde(default = "default_data_feed")]
    pub feed: String,

    /// Environment variable holding the API key id
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Environment variable holding the API secret
    #[serde(default = "default_api_secret_env")]
    pub api_secret_env: String,

    /// HTTP request timeout (seconds)
    #[serde(default = "default_data_timeout")]
    pub timeout_secs: u64,
}

fn default_data_url() -> String {
    ALPACA_DATA_URL.to_string()
}
fn default_data_feed() -> String {
    "iex".to_string()
}
fn default_api_key_env() -> String {
    "ALPACA_API_KEY".to_string()
}
fn default_api_secret_env() -> String {
    "ALPACA_API_SECRET".to_string()
}
fn default_data_timeout() -> u64 {
    30
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            base_url: default_data_url(),
            feed: default_data_feed(),
            api_key_env: default_api_key_env(),
            api_secret_env: default_api_secret_env(),
            timeout_secs: default_data_timeout(),
        }
    }
}

impl DataConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Sentiment scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentConfig {
    /// Score sentiment at all; neutral everywhere when disabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// OpenAI-compatible API base URL
    #[serde(default = "default_sentiment_url")]
    pub base_url: String,

    /// Chat model used for scoring
    #[serde(default = "default_sentiment_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_sentiment_key_env")]
    pub api_key_env: String,

    /// HTTP request timeout (seconds)
    #[serde(default = "default_sentiment_timeout")]
    pub timeout_secs: u64,
}

fn default_true() -> bool {
    true
}
fn default_sentiment_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}
fn default_sentiment_model() -> String {
    "llama-3.1-8b-instant".to_string()
}
fn default_sentiment_key_env() -> String {
    "GROQ_API_KEY".to_string()
}
fn default_sentiment_timeout() -> u64 {
    15
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_sentiment_url(),
            model: default_sentiment_model(),
            api_key_env: default_sentiment_key_env(),
            timeout_secs: default_sentiment_timeout(),
        }
    }
}

impl SentimentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Live scan gap bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapConfig {
    /// Minimum |gap| in percent for the scanner (inclusive)
    #[serde(default = "default_scan_min_gap")]
    pub min_gap_pct: f64,

    /// Maximum |gap| in percent for the scanner (inclusive)
    #[serde(default = "default_scan_max_gap")]
    pub max_gap_pct: f64,

    /// Bars averaged for the volume ratio
    #[serde(default = "default_volume_lookback")]
    pub volume_lookback: usize,
}

fn default_scan_min_gap() -> f64 {
    1.5
}
fn default_scan_max_gap() -> f64 {
    15.0
}
fn default_volume_lookback() -> usize {
    20
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            min_gap_pct: default_scan_min_gap(),
            max_gap_pct: default_scan_max_gap(),
            volume_lookback: default_volume_lookback(),
        }
    }
}

/// Fill probability configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityConfig {
    /// Bars searched after each gap for a fill
    #[serde(default = "default_lookahead")]
    pub lookahead: usize,

    /// Usable bars required before statistics are measured
    #[serde(default = "default_probability_min_bars")]
    pub min_bars: usize,

    /// Calendar days of history for the scanner
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Calendar days of history for the detail view
    #[serde(default = "default_detail_lookback_days")]
    pub detail_lookback_days: u32,
}

fn default_lookahead() -> usize {
    10
}
fn default_probability_min_bars() -> usize {
    20
}
fn default_lookback_days() -> u32 {
    100
}
fn default_detail_lookback_days() -> u32 {
    252
}

impl Default for ProbabilityConfig {
    fn default() -> Self {
        Self {
            lookahead: default_lookahead(),
            min_bars: default_probability_min_bars(),
            lookback_days: default_lookback_days(),
            detail_lookback_days: default_detail_lookback_days(),
        }
    }
}

/// Backtest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSettings {
    /// Starting capital
    #[serde(default = "default_initial_capital")]
    pub initial_capital: Decimal,

    /// Fraction of capital per trade
    #[serde(default = "default_position_fraction")]
    pub position_fraction: Decimal,

    /// Round-trip commission as a decimal
    #[serde(default = "default_commission_rate")]
    pub commission_rate: f64,

    /// Minimum |gap| in percent to enter (inclusive)
    #[serde(default = "default_backtest_min_gap")]
    pub min_gap_pct: f64,

    /// Bars held before a forced exit
    #[serde(default = "default_holding_horizon")]
    pub holding_horizon: usize,

    /// Usable bars required to run
    #[serde(default = "default_backtest_min_bars")]
    pub min_bars: usize,

    /// Calendar days of history to replay
    #[serde(default = "default_backtest_days")]
    pub days: u32,

    /// Execution model
    #[serde(default)]
    pub execution: ExecutionKind,
}

fn default_initial_capital() -> Decimal {
    Decimal::new(10000, 0)
}
fn default_position_fraction() -> Decimal {
    Decimal::new(10, 2) // 0.10 = 10%
}
fn default_commission_rate() -> f64 {
    0.002
}
fn default_backtest_min_gap() -> f64 {
    2.0
}
fn default_holding_horizon() -> usize {
    10
}
fn default_backtest_min_bars() -> usize {
    50
}
fn default_backtest_days() -> u32 {
    365
}

impl Default for BacktestSettings {
    fn default() -> Self {
        Self {
            initial_capital: default_initial_capital(),
            position_fraction: default_position_fraction(),
            commission_rate: default_commission_rate(),
            min_gap_pct: default_backtest_min_gap(),
            holding_horizon: default_holding_horizon(),
            min_bars: default_backtest_min_bars(),
            days: default_backtest_days(),
            execution: ExecutionKind::default(),
        }
    }
}

impl From<&BacktestSettings> for BacktestConfig {
    fn from(settings: &BacktestSettings) -> Self {
        Self {
            initial_capital: settings.initial_capital,
            position_fraction: settings.position_fraction,
            commission_rate: settings.commission_rate,
            min_gap_pct: settings.min_gap_pct,
            holding_horizon: settings.holding_horizon,
            min_bars: settings.min_bars,
            execution: settings.execution,
        }
    }
}

/// Scanner configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Symbols scanned when none are given
    #[serde(default = "default_watchlist")]
    pub watchlist: Vec<String>,

    /// Maximum records returned
    #[serde(default = "default_scan_limit")]
    pub limit: usize,

    /// Symbols processed concurrently
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_watchlist() -> Vec<String> {
    [
        "AAPL", "TSLA", "NVDA", "MSFT", "GOOGL", "AMZN", "META", "AMD", "NFLX", "DIS", "BA", "GE",
        "F", "INTC", "SNAP", "UBER", "LYFT", "COIN", "PYPL", "SHOP", "RBLX", "PLTR", "SOFI",
        "NIO", "RIVN", "LCID", "PLUG", "GME", "AMC",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
fn default_scan_limit() -> usize {
    50
}
fn default_concurrency() -> usize {
    8
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            watchlist: default_watchlist(),
            limit: default_scan_limit(),
            concurrency: default_concurrency(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Default log filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,

    /// Prometheus exporter port; no exporter when unset
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Configuration shipped with the crate
    pub fn example() -> anyhow::Result<Self> {
        Self::parse(include_str!("../config.toml.example"))
    }
}

/// Read a secret from the named environment variable
///
/// Returns `None` when the variable is unset or blank.
pub fn secret_from_env(var: &str) -> Option<SecretString> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(|value| SecretString::new(value.into_boxed_str()))
}
