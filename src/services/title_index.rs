use std::collections::HashMap;

/// Exact title → canonical row lookup
///
/// Duplicate titles keep the first row they appear on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TitleIndex {
    rows: HashMap<String, usize>,
}

impl TitleIndex {
    pub fn build<S: AsRef<str>>(titles: &[S]) -> Self {
        let mut rows = HashMap::with_capacity(titles.len());
        for (row, title) in titles.iter().enumerate() {
            rows.entry(title.as_ref().to_string()).or_insert(row);
        }
        Self { rows }
    }

    /// Case-sensitive; callers trim but do not lowercase
    pub fn lookup(&self, title: &str) -> Option<usize> {
        self.rows.get(title).copied()
    }

    /// Number of distinct titles
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
