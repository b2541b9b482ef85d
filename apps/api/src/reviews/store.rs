use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::review::{NewReview, Review, ReviewRow};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to encode key points: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Persistence for reviews. Records are insert-only.
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Inserts a review atomically and returns it with `id` and `created_at` assigned.
    async fn create(&self, review: NewReview) -> Result<Review, StoreError>;

    /// Every stored review, newest first.
    async fn list_all(&self) -> Result<Vec<Review>, StoreError>;
}

const CREATE_REVIEWS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS reviews (
        id           SERIAL PRIMARY KEY,
        product_name VARCHAR(200) NOT NULL,
        review_text  TEXT NOT NULL,
        sentiment    VARCHAR(20) NOT NULL,
        confidence   DOUBLE PRECISION NOT NULL,
        key_points   TEXT NOT NULL,
        created_at   TIMESTAMPTZ NOT NULL DEFAULT now()
    )
"#;

const CREATE_CREATED_AT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS reviews_created_at_idx ON reviews (created_at DESC)";

#[derive(Clone)]
pub struct PgReviewStore {
    pool: PgPool,
}

impl PgReviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `reviews` table and its ordering index if missing.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_REVIEWS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_CREATED_AT_INDEX)
            .execute(&self.pool)
            .await?;
        info!("Review schema ready");
        Ok(())
    }
}

#[async_trait]
impl ReviewStore for PgReviewStore {
    async fn create(&self, review: NewReview) -> Result<Review, StoreError> {
        let key_points = serde_json::to_string(&review.key_points)?;

        let mut tx = self.pool.begin().await?;
        let inserted = sqlx::query_as::<_, ReviewRow>(
            r#"
            INSERT INTO reviews (product_name, review_text, sentiment, confidence, key_points)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, product_name, review_text, sentiment, confidence, key_points, created_at
            "#,
        )
        .bind(&review.product_name)
        .bind(&review.review_text)
        .bind(&review.sentiment)
        .bind(review.confidence)
        .bind(&key_points)
        .fetch_one(&mut *tx)
        .await;

        match inserted {
            Ok(row) => {
                tx.commit().await?;
                Ok(row.into_review())
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("Rollback after failed review insert also failed: {rollback_err}");
                }
                Err(e.into())
            }
        }
    }

    async fn list_all(&self) -> Result<Vec<Review>, StoreError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT id, product_name, review_text, sentiment, confidence, key_points, created_at
            FROM reviews
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ReviewRow::into_review).collect())
    }
}
