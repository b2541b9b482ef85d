mod analysis;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod reviews;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::key_points::GeminiKeyPointExtractor;
use crate::analysis::sentiment::{HuggingFaceClassifier, RetryPolicy};
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::reviews::store::PgReviewStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing DATABASE_URL or malformed numbers)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Product Review Analyzer API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and make sure the reviews table exists
    let db = create_pool(&config.database_url).await?;
    let store = PgReviewStore::new(db);
    store
        .init_schema()
        .await
        .context("Database initialization failed")?;

    if config.huggingface_token.is_empty() {
        warn!("HUGGINGFACE_TOKEN is empty; sentiment will fall back to NEUTRAL");
    }
    if config.gemini_api_key.is_empty() {
        warn!("GEMINI_API_KEY is empty; key points will fall back to placeholders");
    }

    let classifier = HuggingFaceClassifier::new(
        config.sentiment_api_url.clone(),
        config.huggingface_token.clone(),
        config.upstream_timeout,
        RetryPolicy {
            max_attempts: config.sentiment_max_attempts,
            delay: config.sentiment_retry_delay,
        },
    )
    .context("Failed to build sentiment HTTP client")?;

    let llm = LlmClient::new(
        config.gemini_api_base.clone(),
        config.gemini_model.clone(),
        config.gemini_api_key.clone(),
        config.upstream_timeout,
    )
    .context("Failed to build LLM HTTP client")?;
    info!("LLM client initialized (model: {})", llm.model());

    let state = AppState {
        store: Arc::new(store),
        sentiment: Arc::new(classifier),
        key_points: Arc::new(GeminiKeyPointExtractor::new(llm)),
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.host, config.port))?;
    info!("Listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
