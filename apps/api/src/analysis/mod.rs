//! AI enrichment of reviews: sentiment classification and key-point extraction.
//!
//! Both operations talk to external services that may be slow, cold or down.
//! Neither is allowed to fail a review submission, so their public entry
//! points return an [`Enrichment`] instead of a `Result`: the caller always
//! gets a usable value and can still tell whether it came from upstream.

pub mod key_points;
pub mod prompts;
pub mod sentiment;

/// Outcome of an enrichment call.
#[derive(Debug, Clone, PartialEq)]
pub enum Enrichment<T> {
    /// The upstream service answered and its answer parsed.
    Upstream(T),
    /// The call failed; `value` is the designated default and `reason`
    /// describes what went wrong.
    Fallback { value: T, reason: String },
}

impl<T> Enrichment<T> {
    pub fn fallback(value: T, reason: impl Into<String>) -> Self {
        Enrichment::Fallback {
            value,
            reason: reason.into(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Enrichment::Fallback { .. })
    }

    pub fn value(&self) -> &T {
        match self {
            Enrichment::Upstream(value) | Enrichment::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Enrichment::Upstream(value) | Enrichment::Fallback { value, .. } => value,
        }
    }
}
