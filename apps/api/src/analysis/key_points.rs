use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::analysis::prompts::{key_points_prompt, FALLBACK_KEY_POINTS};
use crate::analysis::Enrichment;
use crate::llm_client::LlmClient;
use crate::models::review::MAX_KEY_POINTS;

#[async_trait]
pub trait KeyPointExtractor: Send + Sync {
    /// Never fails; at most [`MAX_KEY_POINTS`] entries.
    async fn extract(&self, text: &str) -> Enrichment<Vec<String>>;
}

pub fn fallback_key_points() -> Vec<String> {
    FALLBACK_KEY_POINTS.iter().map(|s| s.to_string()).collect()
}

/// Turns whatever JSON the model produced into a bounded list of strings.
/// A non-array value becomes a one-element list; non-string elements keep
/// their JSON text.
pub fn normalize_key_points(value: Value) -> Vec<String> {
    let items = match value {
        Value::Array(items) => items,
        other => vec![other],
    };
    items
        .into_iter()
        .take(MAX_KEY_POINTS)
        .map(|item| match item {
            Value::String(s) => s,
            other => other.to_string(),
        })
        .collect()
}

pub struct GeminiKeyPointExtractor {
    llm: LlmClient,
}

impl GeminiKeyPointExtractor {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl KeyPointExtractor for GeminiKeyPointExtractor {
    async fn extract(&self, text: &str) -> Enrichment<Vec<String>> {
        let prompt = key_points_prompt(text);
        match self.llm.call_json::<Value>(&prompt).await {
            Ok(value) => Enrichment::Upstream(normalize_key_points(value)),
            Err(e) => {
                warn!("Key point extraction failed, using placeholder list: {e}");
                Enrichment::fallback(fallback_key_points(), e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const REVIEW: &str = "Comfortable fit, but the strap broke after a week";

    fn gemini_reply(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}]
        }))
    }

    fn extractor(base: String) -> GeminiKeyPointExtractor {
        let llm = LlmClient::new(
            base,
            "gemini-1.5-flash".to_string(),
            "test-key".to_string(),
            Duration::from_secs(5),
        )
        .unwrap();
        GeminiKeyPointExtractor::new(llm)
    }

    #[test]
    fn test_normalize_truncates_to_five() {
        let points = normalize_key_points(json!(["a", "b", "c", "d", "e", "f", "g"]));
        assert_eq!(points, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn test_normalize_wraps_non_array() {
        assert_eq!(normalize_key_points(json!("just one")), vec!["just one"]);
        assert_eq!(normalize_key_points(json!({"k": 1})), vec![r#"{"k":1}"#]);
    }

    #[test]
    fn test_normalize_stringifies_non_string_items() {
        assert_eq!(normalize_key_points(json!(["ok", 3, true])), vec!["ok", "3", "true"]);
    }

    #[test]
    fn test_prompt_embeds_review() {
        let prompt = key_points_prompt(REVIEW);
        assert!(prompt.contains(REVIEW));
        assert!(prompt.contains("JSON array"));
    }

    #[tokio::test]
    async fn test_fenced_and_plain_responses_match() {
        let fenced = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("strap broke"))
            .respond_with(gemini_reply(
                "```json\n[\"Comfortable fit\", \"Strap broke quickly\"]\n```",
            ))
            .mount(&fenced)
            .await;

        let plain = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(gemini_reply("[\"Comfortable fit\", \"Strap broke quickly\"]"))
            .mount(&plain)
            .await;

        let from_fenced = extractor(fenced.uri()).extract(REVIEW).await;
        let from_plain = extractor(plain.uri()).extract(REVIEW).await;

        assert!(!from_fenced.is_fallback());
        assert_eq!(from_fenced, from_plain);
        assert_eq!(
            from_fenced.into_value(),
            vec!["Comfortable fit", "Strap broke quickly"]
        );
    }

    #[tokio::test]
    async fn test_extract_truncates_upstream_list() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(gemini_reply(r#"["1","2","3","4","5","6"]"#))
            .mount(&server)
            .await;

        let points = extractor(server.uri()).extract(REVIEW).await.into_value();
        assert_eq!(points.len(), MAX_KEY_POINTS);
    }

    #[tokio::test]
    async fn test_extract_malformed_json_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(gemini_reply("Here are the key points: fit, strap"))
            .mount(&server)
            .await;

        let outcome = extractor(server.uri()).extract(REVIEW).await;
        assert!(outcome.is_fallback());
        assert_eq!(outcome.into_value(), fallback_key_points());
    }

    #[tokio::test]
    async fn test_extract_service_error_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let outcome = extractor(server.uri()).extract(REVIEW).await;
        assert!(outcome.is_fallback());
        assert_eq!(outcome.value().len(), 2);
    }
}
