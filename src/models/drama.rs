use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::error::LoadError;

/// One raw dataset row, keyed by canonical column name
pub type RawRecord = HashMap<String, String>;

/// Raw rows plus the column names they were read with
#[derive(Debug, Clone, Default)]
pub struct RawDataset {
    pub columns: Vec<String>,
    pub records: Vec<RawRecord>,
}

/// Columns exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Title,
    Synopsis,
    Genres,
    Rating,
    Year,
    Episodes,
    Network,
}

impl Column {
    pub fn name(self) -> &'static str {
        match self {
            Column::Title => "title",
            Column::Synopsis => "synopsis",
            Column::Genres => "genres",
            Column::Rating => "rating",
            Column::Year => "year",
            Column::Episodes => "episodes",
            Column::Network => "network",
        }
    }

    /// Text columns serialize a missing value as `""`, the rest as `null`
    fn is_text(self) -> bool {
        matches!(self, Column::Synopsis | Column::Genres)
    }
}

/// Fields returned by `list_items`
pub const LIST_COLUMNS: &[Column] = &[
    Column::Title,
    Column::Synopsis,
    Column::Genres,
    Column::Rating,
    Column::Year,
    Column::Episodes,
    Column::Network,
];

/// Fields returned by `search`
pub const SEARCH_COLUMNS: &[Column] = &[
    Column::Title,
    Column::Synopsis,
    Column::Genres,
    Column::Rating,
    Column::Year,
];

/// Which optional columns a dataset declares
///
/// Validated once per load. Queries consult it instead of inspecting individual rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub synopsis: bool,
    pub genres: bool,
    pub tags: bool,
    pub cast: bool,
    pub director: bool,
    pub rating: bool,
    pub year: bool,
    pub episodes: bool,
    pub network: bool,
}

impl Schema {
    pub fn from_columns<S: AsRef<str>>(columns: &[S]) -> Result<Self, LoadError> {
        let has = |name: &str| columns.iter().any(|c| c.as_ref() == name);

        if !has("title") {
            return Err(LoadError::MissingColumn("title".to_string()));
        }

        Ok(Self {
            synopsis: has("synopsis"),
            genres: has("genres"),
            tags: has("tags"),
            cast: has("cast"),
            director: has("director"),
            rating: has("rating"),
            year: has("year"),
            episodes: has("episodes"),
            network: has("network"),
        })
    }

    pub fn has(&self, column: Column) -> bool {
        match column {
            Column::Title => true,
            Column::Synopsis => self.synopsis,
            Column::Genres => self.genres,
            Column::Rating => self.rating,
            Column::Year => self.year,
            Column::Episodes => self.episodes,
            Column::Network => self.network,
        }
    }

    /// Text columns absent from the dataset schema
    pub fn missing_text_columns(&self) -> Vec<&'static str> {
        [
            ("synopsis", self.synopsis),
            ("genres", self.genres),
            ("tags", self.tags),
            ("cast", self.cast),
            ("director", self.director),
        ]
        .into_iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| name)
        .collect()
    }
}

/// A drama title as loaded from the dataset
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Drama {
    pub title: String,
    pub synopsis: Option<String>,
    pub genres: Option<String>,
    pub tags: Option<String>,
    pub cast: Option<String>,
    pub director: Option<String>,
    pub rating: Option<f64>,
    pub year: Option<i32>,
    pub episodes: Option<u32>,
    pub network: Option<String>,
}

impl Drama {
    /// Builds a drama from a raw row
    ///
    /// Returns `None` when the title is blank. Unparseable numbers become absent.
    pub fn from_record(record: &RawRecord) -> Option<Self> {
        let title = text(record, "title")?;

        Some(Self {
            title,
            synopsis: text(record, "synopsis"),
            genres: text(record, "genres"),
            tags: text(record, "tags"),
            cast: text(record, "cast"),
            director: text(record, "director"),
            rating: number(record, "rating", parse_rating),
            year: number(record, "year", |raw| {
                parse_integral(raw).and_then(|v| i32::try_from(v).ok())
            }),
            episodes: number(record, "episodes", |raw| {
                parse_integral(raw).and_then(|v| u32::try_from(v).ok())
            }),
            network: text(record, "network"),
        })
    }

    /// Individual genre names from the comma-separated genre field
    pub fn genre_names(&self) -> impl Iterator<Item = &str> {
        self.genres
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }

    fn value(&self, column: Column) -> Value {
        let value = match column {
            Column::Title => Some(Value::from(self.title.clone())),
            Column::Synopsis => self.synopsis.clone().map(Value::from),
            Column::Genres => self.genres.clone().map(Value::from),
            Column::Rating => self.rating.map(Value::from),
            Column::Year => self.year.map(Value::from),
            Column::Episodes => self.episodes.map(Value::from),
            Column::Network => self.network.clone().map(Value::from),
        };

        match value {
            Some(v) => v,
            None if column.is_text() => Value::from(""),
            None => Value::Null,
        }
    }
}

fn text(record: &RawRecord, column: &str) -> Option<String> {
    record
        .get(column)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn number<T>(record: &RawRecord, column: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    let raw = record.get(column)?.trim();
    if raw.is_empty() {
        return None;
    }
    let parsed = parse(raw);
    if parsed.is_none() {
        tracing::debug!(column, value = %raw, "Unparseable numeric field treated as absent");
    }
    parsed
}

fn parse_rating(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Accepts `2019` as well as `2019.0`
fn parse_integral(raw: &str) -> Option<i64> {
    if let Ok(v) = raw.parse::<i64>() {
        return Some(v);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.fract() == 0.0)
        .map(|v| v as i64)
}

/// A drama projected onto the columns a query exposes
///
/// Every query builds its output through [`DramaView::project`] so the
/// empty-string / null rule is applied the same way everywhere.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DramaView(Map<String, Value>);

impl DramaView {
    pub fn project(drama: &Drama, schema: &Schema, columns: &[Column]) -> Self {
        let fields = columns
            .iter()
            .filter(|column| schema.has(**column))
            .map(|column| (column.name().to_string(), drama.value(*column)))
            .collect();
        Self(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn title(&self) -> &str {
        self.0
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }
}
