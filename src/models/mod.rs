use serde::Serialize;

mod drama;

pub use drama::{
    Column, Drama, DramaView, RawDataset, RawRecord, Schema, LIST_COLUMNS, SEARCH_COLUMNS,
};

/// A recommended drama with its similarity to the input title
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub drama: DramaView,
    /// Rounded to 3 decimal places
    pub similarity_score: f64,
}

/// Outcome of a recommendation lookup
///
/// A missing title is a normal result carrying suggestions, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RecommendResult {
    Found {
        #[serde(rename = "input_drama")]
        input_item: DramaView,
        recommendations: Vec<Recommendation>,
        total_found: usize,
    },
    NotFound {
        #[serde(rename = "error")]
        message: String,
        suggestions: Vec<String>,
        total_dramas: usize,
    },
}

/// Aggregate statistics over the loaded corpus
///
/// Each statistic is `None` when its source column is undeclared or empty on every row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub total_dramas: usize,
    pub unique_genres: Option<usize>,
    pub year_range: YearRange,
    pub avg_rating: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearRange {
    pub min: Option<i32>,
    pub max: Option<i32>,
}
