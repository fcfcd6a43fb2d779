//! Groq chat-completion sentiment client
//!
//! Asks an instruction-tuned model for a `{"score", "label"}` JSON object over
//! the OpenAI-compatible chat completions endpoint.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use super::{Sentiment, SentimentError, SentimentLabel, SentimentSource};
use crate::config::{secret_from_env, SentimentConfig};
use crate::telemetry::{self, LatencyMetric};

const SYSTEM_PROMPT: &str =
    "You are a financial sentiment analyzer. Respond with only valid JSON.";

/// Configuration for the Groq client
#[derive(Debug, Clone)]
pub struct GroqConfig {
    /// OpenAI-compatible base URL (e.g. `https://api.groq.com/openai/v1`)
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
    pub api_key: SecretString,
}

impl GroqConfig {
    /// Build from config, reading the API key from the configured environment variable
    pub fn from_env(config: &SentimentConfig) -> Result<Self, SentimentError> {
        let api_key = secret_from_env(&config.api_key_env)
            .ok_or_else(|| SentimentError::MissingCredentials(config.api_key_env.clone()))?;

        Ok(Self {
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            timeout: config.timeout(),
            api_key,
        })
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Shape the model is asked to produce
#[derive(Debug, Deserialize)]
struct RawSentiment {
    #[serde(default)]
    score: f64,
    #[serde(default)]
    label: Option<String>,
}

/// Parse the model's reply, tolerating prose or code fences around the object
fn parse_sentiment(content: &str) -> Result<Sentiment, SentimentError> {
    let start = content.find('{');
    let end = content.rfind('}');
    let json = match (start, end) {
        (Some(start), Some(end)) if start < end => &content[start..=end],
        _ => return Err(SentimentError::Parse(content.to_string())),
    };

    let raw: RawSentiment =
        serde_json::from_str(json).map_err(|e| SentimentError::Parse(e.to_string()))?;
    let label = raw
        .label
        .as_deref()
        .map(SentimentLabel::parse)
        .unwrap_or_default();

    Ok(Sentiment::new(raw.score, label))
}

fn symbol_prompt(symbol: &str) -> String {
    format!(
        "Analyze the sentiment for stock {symbol} based on recent market conditions and news.\n\
         Return ONLY a JSON object with: {{\"score\": <number between -1 and 1>, \"label\": \"<positive/negative/neutral>\"}}\n\
         Consider recent price action, market sentiment and sector trends.\n\
         Response (JSON only):"
    )
}

fn text_prompt(text: &str) -> String {
    format!(
        "Analyze the sentiment of this financial news:\n\"{text}\"\n\
         Return ONLY a JSON object: {{\"score\": <number between -1 and 1>, \"label\": \"<positive/negative/neutral>\"}}"
    )
}

/// Sentiment from Groq-hosted models
pub struct GroqSentiment {
    config: GroqConfig,
    client: Client,
}

impl GroqSentiment {
    /// Create a new client
    pub fn new(config: GroqConfig) -> Result<Self, SentimentError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    async fn complete(&self, prompt: &str) -> Result<Sentiment, SentimentError> {
        let started = Instant::now();
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: 0.3,
            max_tokens: 100,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SentimentError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await?;
        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| SentimentError::Parse("empty completion".to_string()))?;

        telemetry::record_latency(LatencyMetric::Sentiment, started.elapsed());
        parse_sentiment(&content)
    }
}

#[async_trait]
impl SentimentSource for GroqSentiment {
    async fn analyze_symbol(&self, symbol: &str) -> Result<Sentiment, SentimentError> {
        let sentiment = self.complete(&symbol_prompt(symbol)).await?;
        tracing::debug!(
            symbol,
            score = sentiment.score,
            label = %sentiment.label,
            "Symbol sentiment scored"
        );
        Ok(sentiment)
    }

    async fn analyze_text(&self, text: &str) -> Result<Sentiment, SentimentError> {
        if text.trim().is_empty() {
            return Ok(Sentiment::neutral());
        }
        self.complete(&text_prompt(text)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let sentiment = parse_sentiment(r#"{"score": 0.65, "label": "positive"}"#).unwrap();
        assert_eq!(sentiment.score, 0.65);
        assert_eq!(sentiment.label, SentimentLabel::Positive);
    }

    #[test]
    fn test_parse_fenced_json() {
        let reply = "Here you go:\n```json\n{\"score\": -0.4, \"label\": \"Negative\"}\n```";
        let sentiment = parse_sentiment(reply).unwrap();
        assert_eq!(sentiment.score, -0.4);
        assert_eq!(sentiment.label, SentimentLabel::Negative);
    }

    #[test]
    fn test_parse_clamps_and_defaults_label() {
        let sentiment = parse_sentiment(r#"{"score": 2.5}"#).unwrap();
        assert_eq!(sentiment.score, 1.0);
        assert_eq!(sentiment.label, SentimentLabel::Neutral);
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert!(matches!(
            parse_sentiment("I cannot determine sentiment."),
            Err(SentimentError::Parse(_))
        ));
        assert!(matches!(
            parse_sentiment(r#"{"score": "very high"}"#),
            Err(SentimentError::Parse(_))
        ));
    }

    #[test]
    fn test_chat_request_shape() {
        let prompt = symbol_prompt("NVDA");
        let request = ChatRequest {
            model: "llama-3.1-8b-instant",
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            temperature: 0.3,
            max_tokens: 100,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama-3.1-8b-instant");
        assert_eq!(json["messages"][1]["role"], "user");
        assert!(json["messages"][1]["content"].as_str().unwrap().contains("NVDA"));
    }

    #[tokio::test]
    async fn test_blank_text_is_neutral_without_request() {
        let source = GroqSentiment::new(GroqConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            model: "llama-3.1-8b-instant".to_string(),
            timeout: Duration::from_millis(100),
            api_key: SecretString::new("test".into()),
        })
        .unwrap();
        assert_eq!(source.analyze_text("   ").await.unwrap(), Sentiment::neutral());
    }
}
