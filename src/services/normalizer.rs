use crate::models::Drama;

/// Builds the text "soup" a drama is vectorized from
///
/// Synopsis, genres, tags, cast and director are joined with single spaces,
/// lowercased, and every whitespace run collapsed. Missing fields count as
/// empty strings.
pub fn normalize(drama: &Drama) -> String {
    let fields = [
        &drama.synopsis,
        &drama.genres,
        &drama.tags,
        &drama.cast,
        &drama.director,
    ];

    let soup = fields
        .iter()
        .map(|field| field.as_deref().unwrap_or_default())
        .collect::<Vec<_>>()
        .join(" ");

    clean_text(&soup)
}

/// Lowercases and collapses whitespace, trimming both ends
pub fn clean_text(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
