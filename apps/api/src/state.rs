use std::sync::Arc;

use crate::analysis::key_points::KeyPointExtractor;
use crate::analysis::sentiment::SentimentClassifier;
use crate::reviews::store::ReviewStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every collaborator sits behind a trait so handlers never reach for globals.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ReviewStore>,
    pub sentiment: Arc<dyn SentimentClassifier>,
    pub key_points: Arc<dyn KeyPointExtractor>,
}
