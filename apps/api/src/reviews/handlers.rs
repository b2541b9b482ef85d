//! Axum route handlers for the review API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::analysis::Enrichment;
use crate::errors::AppError;
use crate::models::review::{round_confidence, NewReview, Review, MAX_KEY_POINTS};
use crate::state::AppState;

pub const MIN_REVIEW_CHARS: usize = 10;
pub const MAX_PRODUCT_NAME_CHARS: usize = 200;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeReviewRequest {
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub review_text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeReviewResponse {
    pub success: bool,
    pub data: Review,
}

#[derive(Debug, Serialize)]
pub struct ReviewListResponse {
    pub success: bool,
    pub count: usize,
    pub data: Vec<Review>,
}

/// Trimmed, validated submission.
#[derive(Debug, PartialEq)]
struct ReviewInput {
    product_name: String,
    review_text: String,
}

fn validate(request: AnalyzeReviewRequest) -> Result<ReviewInput, AppError> {
    let product_name = request.product_name.unwrap_or_default().trim().to_string();
    let review_text = request.review_text.unwrap_or_default().trim().to_string();

    if product_name.is_empty() || review_text.is_empty() {
        return Err(AppError::Validation(
            "Product name and review text are required".to_string(),
        ));
    }
    if review_text.chars().count() < MIN_REVIEW_CHARS {
        return Err(AppError::Validation(format!(
            "Review text too short (minimum {MIN_REVIEW_CHARS} characters)"
        )));
    }
    if product_name.chars().count() > MAX_PRODUCT_NAME_CHARS {
        return Err(AppError::Validation(format!(
            "Product name too long (maximum {MAX_PRODUCT_NAME_CHARS} characters)"
        )));
    }

    Ok(ReviewInput {
        product_name,
        review_text,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /
pub async fn handle_home() -> &'static str {
    "Product Review Analyzer API - Running!"
}

/// POST /api/analyze-review
///
/// Validates the submission, classifies sentiment and extracts key points
/// concurrently, then persists the combined record.
pub async fn handle_analyze_review(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeReviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AnalyzeReviewResponse>), AppError> {
    let Json(request) = payload
        .map_err(|e| AppError::Validation(format!("Invalid request body: {}", e.body_text())))?;
    let input = validate(request)?;

    let preview: String = input.review_text.chars().take(50).collect();
    info!("Analyzing review for '{}': {preview}...", input.product_name);

    let (sentiment, key_points) = tokio::join!(
        state.sentiment.classify(&input.review_text),
        state.key_points.extract(&input.review_text),
    );
    if let Enrichment::Fallback { reason, .. } = &sentiment {
        warn!("Storing neutral sentiment for '{}': {reason}", input.product_name);
    }
    if let Enrichment::Fallback { reason, .. } = &key_points {
        warn!("Storing placeholder key points for '{}': {reason}", input.product_name);
    }
    debug!(
        "Sentiment {} ({:.4}), {} key point(s)",
        sentiment.value().label,
        sentiment.value().score,
        key_points.value().len()
    );
    let enriched = !sentiment.is_fallback() && !key_points.is_fallback();
    let sentiment = sentiment.into_value();

    let mut review = state
        .store
        .create(NewReview {
            product_name: input.product_name,
            review_text: input.review_text,
            sentiment: sentiment.label,
            confidence: sentiment.score,
            key_points: key_points
                .into_value()
                .into_iter()
                .take(MAX_KEY_POINTS)
                .collect(),
        })
        .await?;

    info!("Review saved with ID: {} (fully enriched: {enriched})", review.id);

    review.confidence = round_confidence(review.confidence);
    Ok((
        StatusCode::CREATED,
        Json(AnalyzeReviewResponse {
            success: true,
            data: review,
        }),
    ))
}

/// GET /api/reviews
pub async fn handle_list_reviews(
    State(state): State<AppState>,
) -> Result<Json<ReviewListResponse>, AppError> {
    let reviews = state.store.list_all().await?;
    Ok(Json(ReviewListResponse {
        success: true,
        count: reviews.len(),
        data: reviews,
    }))
}
