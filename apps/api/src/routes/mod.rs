pub mod cors;
pub mod health;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::reviews::handlers;
use crate::state::AppState;

async fn not_found() -> AppError {
    AppError::NotFound
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::handle_home))
        .route("/health", get(health::health_handler))
        .route("/api/analyze-review", post(handlers::handle_analyze_review))
        .route("/api/reviews", get(handlers::handle_list_reviews))
        .fallback(not_found)
        .layer(middleware::from_fn(cors::cors))
        .with_state(state)
}
