//! Sentiment module
//!
//! Optional sentiment scores in [-1, 1] from a language model. Every failure
//! path degrades to neutral; sentiment never blocks a scan.

mod groq;
mod types;

pub use groq::{GroqConfig, GroqSentiment};
pub use types::{Sentiment, SentimentError, SentimentLabel};

use async_trait::async_trait;

use crate::config::SentimentConfig;

/// Source of sentiment scores
#[async_trait]
pub trait SentimentSource: Send + Sync {
    /// Overall sentiment for a ticker
    async fn analyze_symbol(&self, symbol: &str) -> Result<Sentiment, SentimentError>;

    /// Sentiment of a headline or news text
    async fn analyze_text(&self, text: &str) -> Result<Sentiment, SentimentError>;
}

#[async_trait]
impl<T: SentimentSource + ?Sized> SentimentSource for Box<T> {
    async fn analyze_symbol(&self, symbol: &str) -> Result<Sentiment, SentimentError> {
        (**self).analyze_symbol(symbol).await
    }

    async fn analyze_text(&self, text: &str) -> Result<Sentiment, SentimentError> {
        (**self).analyze_text(text).await
    }
}

/// Always neutral; used when sentiment is disabled or unconfigured
#[derive(Debug, Clone, Copy, Default)]
pub struct NeutralSentiment;

#[async_trait]
impl SentimentSource for NeutralSentiment {
    async fn analyze_symbol(&self, _symbol: &str) -> Result<Sentiment, SentimentError> {
        Ok(Sentiment::neutral())
    }

    async fn analyze_text(&self, _text: &str) -> Result<Sentiment, SentimentError> {
        Ok(Sentiment::neutral())
    }
}

/// Sentiment source described by config
///
/// Falls back to [`NeutralSentiment`] when disabled or when no API key is set.
pub fn from_config(config: &SentimentConfig) -> Box<dyn SentimentSource> {
    if !config.enabled {
        tracing::info!("Sentiment disabled, scoring neutral");
        return Box::new(NeutralSentiment);
    }

    match GroqConfig::from_env(config).and_then(GroqSentiment::new) {
        Ok(source) => Box::new(source),
        Err(e) => {
            tracing::warn!(error = %e, "Sentiment unavailable, scoring neutral");
            Box::new(NeutralSentiment)
        }
    }
}
