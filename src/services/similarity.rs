use rayon::prelude::*;
use serde::Deserialize;

use super::vectorizer::TermVector;

/// How two term vectors are scored against each other
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMetric {
    /// Raw inner product of the weighted vectors
    #[default]
    Dot,
    /// Inner product divided by both norms; 0 when either vector is zero
    Cosine,
}

impl SimilarityMetric {
    pub fn score(self, a: &TermVector, b: &TermVector) -> f64 {
        let dot = a.dot(b);
        match self {
            SimilarityMetric::Dot => dot,
            SimilarityMetric::Cosine => {
                let denom = a.norm() * b.norm();
                if denom > 0.0 {
                    dot / denom
                } else {
                    0.0
                }
            }
        }
    }
}

/// Dense square matrix of pairwise similarities, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    size: usize,
    scores: Vec<f64>,
}

impl SimilarityMatrix {
    /// Scores every pair of vectors; rows are computed in parallel
    pub fn build(vectors: &[TermVector], metric: SimilarityMetric) -> Self {
        let size = vectors.len();
        let mut scores = vec![0.0; size * size];

        if size > 0 {
            scores
                .par_chunks_mut(size)
                .enumerate()
                .for_each(|(i, row)| {
                    for (j, cell) in row.iter_mut().enumerate() {
                        *cell = metric.score(&vectors[i], &vectors[j]);
                    }
                });
        }

        Self { size, scores }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.scores[i * self.size + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.scores[i * self.size..(i + 1) * self.size]
    }

    /// The `k` highest-scoring rows other than `row`
    ///
    /// Ordered by descending score, ties by ascending row index.
    pub fn top_k_similar(&self, row: usize, k: usize) -> Vec<(usize, f64)> {
        if row >= self.size {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f64)> = self
            .row(row)
            .iter()
            .copied()
            .enumerate()
            .filter(|(j, _)| *j != row)
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scored.truncate(k);
        scored
    }
}
