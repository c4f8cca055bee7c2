use std::collections::{HashMap, HashSet};

use super::stopwords;

/// Sparse weighted-term vector: parallel arrays of coordinates and weights
///
/// Coordinates are sorted ascending so two vectors can be merged in one pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TermVector {
    pub indices: Vec<u32>,
    pub values: Vec<f64>,
}

impl TermVector {
    pub fn dot(&self, other: &TermVector) -> f64 {
        let mut sum = 0.0;
        let (mut i, mut j) = (0, 0);
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
            }
        }
        sum
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for v in &mut self.values {
                *v /= norm;
            }
        }
    }
}

/// Corpus-wide coordinate space: index → term
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vocabulary {
    terms: Vec<String>,
    index: HashMap<String, u32>,
}

impl Vocabulary {
    fn from_sorted(terms: Vec<String>) -> Self {
        let index = terms
            .iter()
            .enumerate()
            .map(|(i, term)| (term.clone(), i as u32))
            .collect();
        Self { terms, index }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn term(&self, index: u32) -> Option<&str> {
        self.terms.get(index as usize).map(String::as_str)
    }

    pub fn index_of(&self, term: &str) -> Option<u32> {
        self.index.get(term).copied()
    }
}

/// TF-IDF vectorizer with English stop words and a vocabulary cap
///
/// Weights are raw term counts times smoothed IDF, `ln((1 + n) / (1 + df)) + 1`,
/// then each row is L2-normalized.
pub struct Vectorizer {
    max_features: usize,
    stop_words: HashSet<&'static str>,
}

impl Vectorizer {
    pub fn new(max_features: usize) -> Self {
        Self {
            max_features,
            stop_words: stopwords::english(),
        }
    }

    /// Lowercased word tokens of at least two characters, stop words removed
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|token| token.chars().nth(1).is_some())
            .map(str::to_lowercase)
            .filter(|token| !self.stop_words.contains(token.as_str()))
            .collect()
    }

    /// Fits a vocabulary over `documents` and returns one vector per document
    ///
    /// Always refits from scratch. Empty documents yield zero vectors.
    pub fn fit_transform<S: AsRef<str>>(&self, documents: &[S]) -> (Vec<TermVector>, Vocabulary) {
        let counts: Vec<HashMap<String, usize>> = documents
            .iter()
            .map(|doc| {
                let mut counts = HashMap::new();
                for token in self.tokenize(doc.as_ref()) {
                    *counts.entry(token).or_insert(0) += 1;
                }
                counts
            })
            .collect();

        let mut term_freq: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for doc in &counts {
            for (term, count) in doc {
                *term_freq.entry(term.as_str()).or_insert(0) += count;
                *doc_freq.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        // Highest corpus-wide count wins the cap; ties go alphabetically
        let mut ranked: Vec<(&str, usize)> = term_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(self.max_features);

        let mut terms: Vec<String> = ranked.iter().map(|(term, _)| term.to_string()).collect();
        terms.sort();
        let vocabulary = Vocabulary::from_sorted(terms);

        let n = documents.len() as f64;
        let idf: Vec<f64> = vocabulary
            .terms
            .iter()
            .map(|term| {
                let df = doc_freq.get(term.as_str()).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        let vectors = counts
            .iter()
            .map(|doc| {
                let mut entries: Vec<(u32, f64)> = doc
                    .iter()
                    .filter_map(|(term, count)| {
                        let idx = vocabulary.index_of(term)?;
                        Some((idx, *count as f64 * idf[idx as usize]))
                    })
                    .collect();
                entries.sort_by_key(|(idx, _)| *idx);

                let mut vector = TermVector {
                    indices: entries.iter().map(|(idx, _)| *idx).collect(),
                    values: entries.iter().map(|(_, weight)| *weight).collect(),
                };
                vector.l2_normalize();
                vector
            })
            .collect();

        (vectors, vocabulary)
    }
}

impl Default for Vectorizer {
    fn default() -> Self {
        Self::new(5000)
    }
}
