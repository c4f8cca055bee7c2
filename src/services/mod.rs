pub mod dataset;
pub mod fuzzy;
pub mod normalizer;
pub mod providers;
pub mod recommendations;
pub mod similarity;
pub mod stopwords;
pub mod title_index;
pub mod title_search;
pub mod vectorizer;

pub use recommendations::{RecommendationService, Snapshot};
