/// Instruction sent to the generative-text service. `{review_text}` is
/// replaced with the submitted review.
pub const KEY_POINTS_PROMPT: &str = r#"Analyze this product review and extract the key points.
Return ONLY a JSON array of strings, each string is one key point.
Maximum 5 key points. Be concise and specific.

Review: {review_text}

Example output format:
["Point 1", "Point 2", "Point 3"]

Your response:"#;

/// Returned when key points cannot be obtained from upstream.
pub const FALLBACK_KEY_POINTS: [&str; 2] = [
    "Unable to extract key points",
    "Please check the review manually",
];

pub fn key_points_prompt(review_text: &str) -> String {
    KEY_POINTS_PROMPT.replace("{review_text}", review_text)
}
