//! Sentiment classification against a hosted text-classification model.
//!
//! The inference endpoint answers 503 while the model is cold. That status,
//! and only that status, is retried according to [`RetryPolicy`]. Every other
//! failure collapses into the neutral fallback.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::analysis::Enrichment;
use crate::models::review::MAX_SENTIMENT_LABEL_CHARS;

pub const FALLBACK_LABEL: &str = "NEUTRAL";
pub const FALLBACK_SCORE: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: String,
    pub score: f64,
}

impl Sentiment {
    pub fn neutral() -> Self {
        Self {
            label: FALLBACK_LABEL.to_string(),
            score: FALLBACK_SCORE,
        }
    }
}

#[derive(Debug, Error)]
pub enum SentimentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unexpected response shape: {0}")]
    Shape(String),
}

/// How often a cold-start (503) answer is retried and how long to wait in between.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total number of requests, including the first one.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            delay: Duration::from_secs(20),
        }
    }
}

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Never fails; falls back to NEUTRAL / 0.5.
    async fn classify(&self, text: &str) -> Enrichment<Sentiment>;
}

/// The classifier may answer with a single object, a flat list of labels,
/// or a list holding one list of labels per input.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassificationPayload {
    Single(Sentiment),
    Flat(Vec<Sentiment>),
    Nested(Vec<Vec<Sentiment>>),
}

impl ClassificationPayload {
    fn into_top(self) -> Result<Sentiment, SentimentError> {
        let top = match self {
            ClassificationPayload::Single(s) => Some(s),
            ClassificationPayload::Flat(list) => list.into_iter().next(),
            ClassificationPayload::Nested(lists) => {
                lists.into_iter().next().and_then(|l| l.into_iter().next())
            }
        };
        let top = top.ok_or_else(|| SentimentError::Shape("empty result list".to_string()))?;

        if top.label.trim().is_empty() {
            return Err(SentimentError::Shape("blank label".to_string()));
        }
        if top.label.chars().count() > MAX_SENTIMENT_LABEL_CHARS {
            return Err(SentimentError::Shape(format!(
                "label '{}' longer than {MAX_SENTIMENT_LABEL_CHARS} characters",
                top.label
            )));
        }
        if !top.score.is_finite() || !(0.0..=1.0).contains(&top.score) {
            return Err(SentimentError::Shape(format!(
                "score {} outside [0, 1]",
                top.score
            )));
        }
        Ok(top)
    }
}

/// Parses a classifier response body down to its leading label/score pair.
fn parse_classification(body: &[u8]) -> Result<Sentiment, SentimentError> {
    let payload: ClassificationPayload = serde_json::from_slice(body)?;
    payload.into_top()
}

#[derive(Clone)]
pub struct HuggingFaceClassifier {
    client: Client,
    api_url: String,
    token: String,
    retry: RetryPolicy,
}

impl HuggingFaceClassifier {
    pub fn new(
        api_url: String,
        token: String,
        timeout: Duration,
        retry: RetryPolicy,
    ) -> Result<Self, SentimentError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_url,
            token,
            retry,
        })
    }

    async fn request(&self, text: &str) -> Result<Sentiment, SentimentError> {
        let max_attempts = self.retry.max_attempts.max(1);
        let body = json!({ "inputs": text });
        let mut attempt = 1;

        loop {
            let response = self
                .client
                .post(&self.api_url)
                .bearer_auth(&self.token)
                .json(&body)
                .send()
                .await?;

            let status = response.status();

            if status == StatusCode::SERVICE_UNAVAILABLE && attempt < max_attempts {
                warn!(
                    "Sentiment model is loading (attempt {attempt}/{max_attempts}), retrying after {}ms...",
                    self.retry.delay.as_millis()
                );
                tokio::time::sleep(self.retry.delay).await;
                attempt += 1;
                continue;
            }

            if status != StatusCode::OK {
                let message = response.text().await.unwrap_or_default();
                return Err(SentimentError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let bytes = response.bytes().await?;
            let sentiment = parse_classification(&bytes)?;
            debug!(
                "Sentiment classified as {} ({:.4}) after {attempt} attempt(s)",
                sentiment.label, sentiment.score
            );
            return Ok(sentiment);
        }
    }
}

#[async_trait]
impl SentimentClassifier for HuggingFaceClassifier {
    async fn classify(&self, text: &str) -> Enrichment<Sentiment> {
        match self.request(text).await {
            Ok(sentiment) => Enrichment::Upstream(sentiment),
            Err(e) => {
                warn!("Sentiment classification failed, using neutral fallback: {e}");
                Enrichment::fallback(Sentiment::neutral(), e.to_string())
            }
        }
    }
}
