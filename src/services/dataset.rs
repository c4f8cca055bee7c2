use std::borrow::Cow;

use crate::{
    error::LoadError,
    models::{RawDataset, RawRecord},
};

/// Source column names and the canonical names the engine uses
const COLUMN_ALIASES: &[(&str, &str)] = &[
    ("Name", "title"),
    ("Synopsis", "synopsis"),
    ("Genre", "genres"),
    ("Tags", "tags"),
    ("Cast", "cast"),
    ("Director", "director"),
    ("Rating", "rating"),
    ("Year of release", "year"),
    ("Number of Episodes", "episodes"),
    ("Original Network", "network"),
];

fn canonical_column(header: &str) -> String {
    let header = header.trim();
    COLUMN_ALIASES
        .iter()
        .find(|(alias, _)| *alias == header)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| header.to_string())
}

/// Decodes as UTF-8, falling back to Latin-1
fn decode(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            tracing::warn!("Dataset is not valid UTF-8, decoding as Latin-1");
            Cow::Owned(bytes.iter().map(|&b| b as char).collect())
        }
    }
}

/// Parses a CSV dataset with a header row into raw records
pub fn parse_csv(bytes: &[u8]) -> Result<RawDataset, LoadError> {
    let text = decode(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader.headers()?.iter().map(canonical_column).collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let record: RawRecord = columns
            .iter()
            .cloned()
            .zip(row.iter().map(str::to_string))
            .collect();
        records.push(record);
    }

    tracing::info!(
        rows = records.len(),
        columns = ?columns,
        "Parsed dataset"
    );

    Ok(RawDataset { columns, records })
}
