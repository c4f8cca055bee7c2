use std::sync::Arc;

use crate::config::EngineConfig;
use crate::services::{providers::DatasetSource, RecommendationService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RecommendationService>,
    /// Where `/api/reload` fetches the corpus from; reload is disabled when unset
    pub source: Option<Arc<dyn DatasetSource>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl AppState {
    /// Creates a state with no corpus loaded and no reload source
    pub fn new(config: EngineConfig) -> Self {
        Self {
            service: Arc::new(RecommendationService::new(config)),
            source: None,
        }
    }

    pub fn with_source(mut self, source: Arc<dyn DatasetSource>) -> Self {
        self.source = Some(source);
        self
    }
}
