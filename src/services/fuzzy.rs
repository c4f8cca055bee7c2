/// Proposes titles for a query that has no exact match
///
/// Case-insensitive. Titles containing the whole query win; only when none
/// do, titles containing any whitespace-separated word of the query are
/// returned instead. Results keep corpus order and stop at `limit`.
pub fn suggest<S: AsRef<str>>(query: &str, all_titles: &[S], limit: usize) -> Vec<String> {
    let query = query.to_lowercase();
    let lowered: Vec<String> = all_titles
        .iter()
        .map(|t| t.as_ref().to_lowercase())
        .collect();

    let matches = |predicate: &dyn Fn(&str) -> bool| -> Vec<String> {
        all_titles
            .iter()
            .zip(&lowered)
            .filter(|(_, lower)| predicate(lower.as_str()))
            .map(|(title, _)| title.as_ref().to_string())
            .collect()
    };

    let mut found = matches(&|title: &str| title.contains(query.as_str()));

    if found.is_empty() {
        let words: Vec<&str> = query.split_whitespace().collect();
        if !words.is_empty() {
            found = matches(&|title: &str| words.iter().any(|w| title.contains(w)));
        }
    }

    found.truncate(limit);
    found
}
