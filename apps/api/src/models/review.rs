use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::warn;

/// Upper bound on stored key points per review.
pub const MAX_KEY_POINTS: usize = 5;

/// Width of the `sentiment` column.
pub const MAX_SENTIMENT_LABEL_CHARS: usize = 20;

/// A review as persisted in the `reviews` table. `key_points` holds the
/// JSON-encoded list exactly as written at creation time.
#[derive(Debug, Clone, FromRow)]
pub struct ReviewRow {
    pub id: i32,
    pub product_name: String,
    pub review_text: String,
    pub sentiment: String,
    pub confidence: f64,
    pub key_points: String,
    pub created_at: DateTime<Utc>,
}

/// A review as exposed over the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: i32,
    pub product_name: String,
    pub review_text: String,
    pub sentiment: String,
    pub confidence: f64,
    pub key_points: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Validated input plus enrichment results, ready to be inserted.
/// The store assigns `id` and `created_at`.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub product_name: String,
    pub review_text: String,
    pub sentiment: String,
    pub confidence: f64,
    pub key_points: Vec<String>,
}

impl ReviewRow {
    /// Decodes the stored key points. A corrupt value only affects this
    /// record: it is logged and read back as an empty list.
    pub fn into_review(self) -> Review {
        let key_points = decode_key_points(self.id, &self.key_points);
        Review {
            id: self.id,
            product_name: self.product_name,
            review_text: self.review_text,
            sentiment: self.sentiment,
            confidence: self.confidence,
            key_points,
            created_at: self.created_at,
        }
    }
}

fn decode_key_points(id: i32, raw: &str) -> Vec<String> {
    if raw.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(points) => points,
        Err(e) => {
            warn!("Review {id} has unreadable key_points ({e}); returning empty list");
            Vec::new()
        }
    }
}

/// Rounds a confidence score to 4 decimal places for API responses.
pub fn round_confidence(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}
