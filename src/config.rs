use serde::Deserialize;

use crate::services::similarity::SimilarityMetric;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Local CSV file; takes precedence over `dataset_url` when set
    #[serde(default)]
    pub dataset_path: Option<String>,

    /// Remote CSV location
    #[serde(default = "default_dataset_url")]
    pub dataset_url: String,

    /// Vocabulary cap for the term vectorizer
    #[serde(default = "default_max_features")]
    pub max_features: usize,

    /// Pairwise scoring: `dot` (legacy) or `cosine`
    #[serde(default)]
    pub similarity_metric: SimilarityMetric,

    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,

    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

/// Tunables consumed by the recommendation engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub max_features: usize,
    pub metric: SimilarityMetric,
    pub top_k: usize,
    pub suggestion_limit: usize,
    pub search_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_features: default_max_features(),
            metric: SimilarityMetric::default(),
            top_k: default_top_k(),
            suggestion_limit: default_suggestion_limit(),
            search_limit: default_search_limit(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_dataset_url() -> String {
    "https://hebbkx1anhila5yf.public.blob.vercel-storage.com/kdrama-djhA9j8FqLIKfjNBgpDlP3Jg5WgFsk.csv"
        .to_string()
}

fn default_max_features() -> usize {
    5000
}

fn default_top_k() -> usize {
    10
}

fn default_suggestion_limit() -> usize {
    10
}

fn default_search_limit() -> usize {
    20
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            max_features: self.max_features,
            metric: self.similarity_metric,
            top_k: self.top_k,
            suggestion_limit: self.suggestion_limit,
            search_limit: self.search_limit,
        }
    }
}
