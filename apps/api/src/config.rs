use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_SENTIMENT_API_URL: &str =
    "https://api-inference.huggingface.co/models/distilbert-base-uncased-finetuned-sst-2-english";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Application configuration loaded from environment variables.
/// Only `DATABASE_URL` is mandatory; the upstream credentials may be empty,
/// in which case the AI enrichment degrades to its fallback values.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub huggingface_token: String,
    pub gemini_api_key: String,
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub sentiment_api_url: String,
    pub gemini_api_base: String,
    pub gemini_model: String,
    pub upstream_timeout: Duration,
    pub sentiment_max_attempts: u32,
    pub sentiment_retry_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            huggingface_token: env_or("HUGGINGFACE_TOKEN", ""),
            gemini_api_key: env_or("GEMINI_API_KEY", ""),
            host: env_or("HOST", "0.0.0.0"),
            port: parse_env("PORT", 6543)?,
            rust_log: env_or("RUST_LOG", "info"),
            sentiment_api_url: env_or("SENTIMENT_API_URL", DEFAULT_SENTIMENT_API_URL),
            gemini_api_base: env_or("GEMINI_API_BASE", DEFAULT_GEMINI_API_BASE),
            gemini_model: env_or("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
            upstream_timeout: Duration::from_secs(parse_env("UPSTREAM_TIMEOUT_SECS", 30)?),
            sentiment_max_attempts: parse_env("SENTIMENT_MAX_ATTEMPTS", 2)?,
            sentiment_retry_delay: Duration::from_secs(parse_env(
                "SENTIMENT_RETRY_DELAY_SECS",
                20,
            )?),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
