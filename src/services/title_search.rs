use crate::{
    models::{DramaView, SEARCH_COLUMNS},
    services::recommendations::Snapshot,
};

/// Dramas whose title contains `query`, case-insensitive, in corpus order
///
/// A blank query matches nothing rather than everything.
pub fn search_titles(snapshot: &Snapshot, query: &str, limit: usize) -> Vec<DramaView> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    snapshot
        .titles()
        .iter()
        .enumerate()
        .filter(|(_, title)| title.to_lowercase().contains(&query))
        .take(limit)
        .map(|(row, _)| snapshot.view(row, SEARCH_COLUMNS))
        .collect()
}
