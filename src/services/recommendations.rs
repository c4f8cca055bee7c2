use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::{
    config::EngineConfig,
    error::{AppError, AppResult, LoadError},
    models::{
        Column, Drama, DramaView, RawDataset, RecommendResult, Recommendation, Schema, Stats,
        YearRange, LIST_COLUMNS,
    },
    services::{
        fuzzy, normalizer, providers::DatasetSource, similarity::SimilarityMatrix,
        title_index::TitleIndex, title_search, vectorizer::Vectorizer,
    },
};

/// Everything derived from one corpus load
///
/// Built off to the side and published whole; never mutated afterwards.
#[derive(Debug)]
pub struct Snapshot {
    pub id: Uuid,
    pub loaded_at: DateTime<Utc>,
    schema: Schema,
    dramas: Vec<Drama>,
    titles: Vec<String>,
    index: TitleIndex,
    matrix: SimilarityMatrix,
    vocabulary_size: usize,
}

impl Snapshot {
    /// Runs the full pipeline: schema, documents, vectors, matrix, title index
    pub fn build(dataset: RawDataset, config: &EngineConfig) -> Result<Self, LoadError> {
        let start = Instant::now();
        let schema = Schema::from_columns(&dataset.columns)?;

        let missing = schema.missing_text_columns();
        if !missing.is_empty() {
            tracing::warn!(columns = ?missing, "Text columns not found in dataset");
        }

        let total_rows = dataset.records.len();
        let dramas: Vec<Drama> = dataset
            .records
            .iter()
            .filter_map(Drama::from_record)
            .collect();

        if dramas.len() < total_rows {
            tracing::warn!(
                skipped = total_rows - dramas.len(),
                "Skipped rows without a title"
            );
        }

        if dramas.is_empty() {
            return Err(LoadError::EmptyCorpus);
        }

        let documents: Vec<String> = dramas.iter().map(normalizer::normalize).collect();
        let (vectors, vocabulary) = Vectorizer::new(config.max_features).fit_transform(&documents);
        let matrix = SimilarityMatrix::build(&vectors, config.metric);

        let titles: Vec<String> = dramas.iter().map(|d| d.title.clone()).collect();
        let index = TitleIndex::build(&titles);

        let snapshot = Self {
            id: Uuid::new_v4(),
            loaded_at: Utc::now(),
            schema,
            dramas,
            titles,
            index,
            matrix,
            vocabulary_size: vocabulary.len(),
        };

        tracing::info!(
            snapshot_id = %snapshot.id,
            dramas = snapshot.len(),
            distinct_titles = snapshot.index.len(),
            vocabulary = snapshot.vocabulary_size,
            metric = ?config.metric,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Built corpus snapshot"
        );

        Ok(snapshot)
    }

    pub fn len(&self) -> usize {
        self.dramas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dramas.is_empty()
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn matrix(&self) -> &SimilarityMatrix {
        &self.matrix
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary_size
    }

    pub fn view(&self, row: usize, columns: &[Column]) -> DramaView {
        DramaView::project(&self.dramas[row], &self.schema, columns)
    }

    /// Top `k` titles similar to an exact `title`, or suggestions when absent
    pub fn recommend(&self, title: &str, k: usize, suggestion_limit: usize) -> RecommendResult {
        let Some(row) = self.index.lookup(title) else {
            let suggestions = fuzzy::suggest(title, &self.titles, suggestion_limit);
            tracing::debug!(
                title = %title,
                suggestions = suggestions.len(),
                "Title not found"
            );
            return RecommendResult::NotFound {
                message: format!("Drama '{}' not found in our database", title),
                suggestions,
                total_dramas: self.len(),
            };
        };

        let recommendations: Vec<Recommendation> = self
            .matrix
            .top_k_similar(row, k)
            .into_iter()
            .map(|(other, score)| Recommendation {
                drama: self.view(other, LIST_COLUMNS),
                similarity_score: round_to(score, 3),
            })
            .collect();

        RecommendResult::Found {
            input_item: self.view(row, LIST_COLUMNS),
            total_found: recommendations.len(),
            recommendations,
        }
    }

    pub fn list_items(&self) -> Vec<DramaView> {
        (0..self.len()).map(|row| self.view(row, LIST_COLUMNS)).collect()
    }

    pub fn stats(&self) -> Stats {
        let unique_genres = if self.schema.genres {
            let genres: HashSet<String> = self
                .dramas
                .iter()
                .flat_map(Drama::genre_names)
                .map(str::to_lowercase)
                .collect();
            (!genres.is_empty()).then_some(genres.len())
        } else {
            None
        };

        let years: Vec<i32> = if self.schema.year {
            self.dramas.iter().filter_map(|d| d.year).collect()
        } else {
            Vec::new()
        };

        let ratings: Vec<f64> = if self.schema.rating {
            self.dramas.iter().filter_map(|d| d.rating).collect()
        } else {
            Vec::new()
        };

        let avg_rating = if ratings.is_empty() {
            None
        } else {
            let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
            Some(round_to(mean, 2))
        };

        Stats {
            total_dramas: self.len(),
            unique_genres,
            year_range: YearRange {
                min: years.iter().min().copied(),
                max: years.iter().max().copied(),
            },
            avg_rating,
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Owns the published corpus snapshot and answers queries against it
///
/// `load` is the only writer. It builds a complete snapshot on a blocking
/// thread and then swaps the shared pointer, so readers see either the old
/// or the new snapshot, never a mix. A failed load leaves the old one live.
/// Loads are serialized: they publish in the order they were requested.
pub struct RecommendationService {
    config: EngineConfig,
    snapshot: RwLock<Option<Arc<Snapshot>>>,
    /// Held across build and publish
    load_lock: Mutex<()>,
}

impl Default for RecommendationService {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl RecommendationService {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            snapshot: RwLock::new(None),
            load_lock: Mutex::new(()),
        }
    }

    /// Builds a new snapshot from `dataset` and publishes it
    pub async fn load(&self, dataset: RawDataset) -> AppResult<Arc<Snapshot>> {
        let _writer = self.load_lock.lock().await;

        let config = self.config.clone();
        let snapshot = tokio::task::spawn_blocking(move || Snapshot::build(dataset, &config))
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
            .map_err(|e| {
                tracing::error!(error = %e, "Corpus load failed, keeping previous snapshot");
                e
            })?;

        let snapshot = Arc::new(snapshot);
        let previous = self.snapshot.write().await.replace(snapshot.clone());

        tracing::info!(
            snapshot_id = %snapshot.id,
            replaced = ?previous.map(|p| p.id),
            "Published corpus snapshot"
        );

        Ok(snapshot)
    }

    /// Fetches, parses and loads the dataset from `source`
    pub async fn load_from(&self, source: &dyn DatasetSource) -> AppResult<Arc<Snapshot>> {
        tracing::info!(source = source.name(), "Loading corpus");
        let bytes = source.fetch().await?;
        let dataset = super::dataset::parse_csv(&bytes)?;
        self.load(dataset).await
    }

    /// The currently published snapshot, if any
    pub async fn current(&self) -> Option<Arc<Snapshot>> {
        self.snapshot.read().await.clone()
    }

    async fn snapshot(&self) -> AppResult<Arc<Snapshot>> {
        self.current().await.ok_or(AppError::NotLoaded)
    }

    /// Recommends the configured number of similar dramas
    pub async fn recommend(&self, title: &str) -> AppResult<RecommendResult> {
        self.recommend_k(title, self.config.top_k).await
    }

    pub async fn recommend_k(&self, title: &str, k: usize) -> AppResult<RecommendResult> {
        let snapshot = self.snapshot().await?;
        let title = title.trim();
        if title.is_empty() {
            return Err(AppError::EmptyQuery("Title"));
        }
        Ok(snapshot.recommend(title, k, self.config.suggestion_limit))
    }

    pub async fn list_items(&self) -> AppResult<Vec<DramaView>> {
        Ok(self.snapshot().await?.list_items())
    }

    /// Case-insensitive title search; a blank query returns nothing
    pub async fn search(&self, query: &str) -> AppResult<Vec<DramaView>> {
        let snapshot = self.snapshot().await?;
        Ok(title_search::search_titles(
            &snapshot,
            query,
            self.config.search_limit,
        ))
    }

    pub async fn stats(&self) -> AppResult<Stats> {
        Ok(self.snapshot().await?.stats())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawRecord;
    use crate::services::providers::MockDatasetSource;
    use crate::services::similarity::SimilarityMetric;
    use serde_json::Value;
    use tokio_test::{assert_err, assert_ok};

    fn dataset(columns: &[&str], rows: &[&[&str]]) -> RawDataset {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let records = rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .cloned()
                    .zip(row.iter().map(|v| v.to_string()))
                    .collect::<RawRecord>()
            })
            .collect();
        RawDataset { columns, records }
    }

    fn sample() -> RawDataset {
        dataset(
            &["title", "synopsis", "genres", "rating", "year", "episodes", "network"],
            &[
                &["Business Proposal", "office romance with a ceo", "Romance, Comedy", "8.5", "2022", "12", "SBS"],
                &["What's Wrong with Secretary Kim", "ceo and secretary office romance", "Romance, Comedy", "8.4", "2018", "16", "tvN"],
                &["Kingdom", "zombie plague in joseon kingdom", "Thriller, Horror", "8.8", "2019", "12", "Netflix"],
                &["All of Us Are Dead", "zombie outbreak at a high school", "Thriller, Horror", "", "2022", "", "Netflix"],
                &["Show Time", "ghosts and a magician", "Fantasy", "7.9", "2014", "16", "MBC"],
            ],
        )
    }

    async fn loaded() -> RecommendationService {
        let service = RecommendationService::default();
        service.load(sample()).await.unwrap();
        service
    }

    #[tokio::test]
    async fn test_queries_fail_before_load() {
        let service = RecommendationService::default();
        assert!(matches!(service.recommend("Kingdom").await, Err(AppError::NotLoaded)));
        assert!(matches!(service.list_items().await, Err(AppError::NotLoaded)));
        assert!(matches!(service.search("king").await, Err(AppError::NotLoaded)));
        assert!(matches!(service.stats().await, Err(AppError::NotLoaded)));
    }

    #[tokio::test]
    async fn test_recommend_found() {
        let service = loaded().await;
        let result = service.recommend("  Business Proposal ").await.unwrap();

        let RecommendResult::Found {
            input_item,
            recommendations,
            total_found,
        } = result
        else {
            panic!("expected a match");
        };

        assert_eq!(input_item.title(), "Business Proposal");
        assert_eq!(total_found, 4);
        assert_eq!(recommendations.len(), 4);
        assert_eq!(
            recommendations[0].drama.title(),
            "What's Wrong with Secretary Kim"
        );
        assert!(recommendations
            .iter()
            .all(|r| r.drama.title() != "Business Proposal"));
        assert!(recommendations
            .iter()
            .all(|r| (0.0..=1.0).contains(&r.similarity_score)));
        assert!(recommendations
            .windows(2)
            .all(|w| w[0].similarity_score >= w[1].similarity_score));
    }

    #[tokio::test]
    async fn test_recommend_respects_k() {
        let service = loaded().await;
        let RecommendResult::Found { recommendations, .. } =
            service.recommend_k("Kingdom", 2).await.unwrap()
        else {
            panic!("expected a match");
        };
        assert_eq!(recommendations.len(), 2);
        assert_eq!(recommendations[0].drama.title(), "All of Us Are Dead");
    }

    #[tokio::test]
    async fn test_recommend_blank_is_empty_query() {
        let service = loaded().await;
        assert!(matches!(service.recommend("").await, Err(AppError::EmptyQuery(_))));
        assert!(matches!(service.recommend(" \t ").await, Err(AppError::EmptyQuery(_))));
    }

    #[tokio::test]
    async fn test_recommend_not_found_suggests_by_word() {
        let service = loaded().await;
        let result = service.recommend("Nonexistent Show").await.unwrap();

        match result {
            RecommendResult::NotFound {
                message,
                suggestions,
                total_dramas,
            } => {
                assert_eq!(message, "Drama 'Nonexistent Show' not found in our database");
                assert!(suggestions.contains(&"Show Time".to_string()));
                assert_eq!(total_dramas, 5);
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_recommend_is_case_sensitive() {
        let service = loaded().await;
        let result = service.recommend("kingdom").await.unwrap();
        let RecommendResult::NotFound { suggestions, .. } = result else {
            panic!("lookup should be exact");
        };
        assert_eq!(suggestions, vec!["Kingdom".to_string()]);
    }

    #[tokio::test]
    async fn test_duplicate_titles_use_first_row() {
        let service = RecommendationService::default();
        let data = dataset(
            &["title", "synopsis"],
            &[&["A", "pirates at sea"], &["B", "pirates treasure"], &["A", "space opera"]],
        );
        service.load(data).await.unwrap();

        let RecommendResult::Found { input_item, recommendations, .. } =
            service.recommend("A").await.unwrap()
        else {
            panic!("expected a match");
        };
        assert_eq!(input_item.get("synopsis"), Some(&Value::from("pirates at sea")));
        assert_eq!(recommendations[0].drama.title(), "B");
        // The duplicate row is still a distinct corpus item
        assert_eq!(recommendations.len(), 2);
    }

    #[tokio::test]
    async fn test_list_items_field_presence() {
        let service = loaded().await;
        let items = service.list_items().await.unwrap();

        assert_eq!(items.len(), 5);
        let dead = &items[3];
        assert_eq!(dead.get("rating"), Some(&Value::Null));
        assert_eq!(dead.get("episodes"), Some(&Value::Null));
        assert_eq!(dead.get("network"), Some(&Value::from("Netflix")));
    }

    #[tokio::test]
    async fn test_search() {
        let service = loaded().await;

        let results = service.search("KING").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title(), "Kingdom");
        assert_eq!(results[0].get("episodes"), None);

        assert!(service.search("").await.unwrap().is_empty());
        assert!(service.search("   ").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stats() {
        let service = loaded().await;
        let stats = service.stats().await.unwrap();

        assert_eq!(stats.total_dramas, 5);
        assert_eq!(stats.unique_genres, Some(5));
        assert_eq!(stats.year_range, YearRange { min: Some(2014), max: Some(2022) });
        // (8.5 + 8.4 + 8.8 + 7.9) / 4
        assert_eq!(stats.avg_rating, Some(8.4));
    }

    #[tokio::test]
    async fn test_stats_all_ratings_empty() {
        let service = RecommendationService::default();
        let data = dataset(
            &["title", "rating"],
            &[&["A", ""], &["B", "n/a"]],
        );
        service.load(data).await.unwrap();

        let stats = service.stats().await.unwrap();
        assert_eq!(stats.avg_rating, None);
        assert_eq!(stats.unique_genres, None);
        assert_eq!(stats.year_range, YearRange { min: None, max: None });
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_snapshot() {
        let service = loaded().await;
        let before = service.current().await.unwrap().id;

        let broken = dataset(&["synopsis"], &[&["no title column"]]);
        assert!(matches!(
            service.load(broken).await,
            Err(AppError::Load(LoadError::MissingColumn(_)))
        ));

        let empty = dataset(&["title"], &[&["  "]]);
        assert!(matches!(
            service.load(empty).await,
            Err(AppError::Load(LoadError::EmptyCorpus))
        ));

        assert_eq!(service.current().await.unwrap().id, before);
        assert_eq!(service.list_items().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_reload_is_deterministic() {
        let service = RecommendationService::default();
        let first = service.load(sample()).await.unwrap();
        let first_result = service.recommend("Kingdom").await.unwrap();

        let second = service.load(sample()).await.unwrap();
        let second_result = service.recommend("Kingdom").await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.matrix(), second.matrix());
        assert_eq!(first_result, second_result);
    }

    #[tokio::test]
    async fn test_all_empty_documents_load() {
        let service = RecommendationService::default();
        let data = dataset(&["title", "synopsis"], &[&["A", ""], &["B", "the"], &["C", ""]]);
        let snapshot = service.load(data).await.unwrap();

        assert_eq!(snapshot.vocabulary_size(), 0);
        let RecommendResult::Found { recommendations, .. } = service.recommend("B").await.unwrap()
        else {
            panic!("expected a match");
        };
        let scores: Vec<f64> = recommendations.iter().map(|r| r.similarity_score).collect();
        assert_eq!(scores, vec![0.0, 0.0]);
        assert_eq!(recommendations[0].drama.title(), "A");
    }

    #[tokio::test]
    async fn test_cosine_metric() {
        let service = RecommendationService::new(EngineConfig {
            metric: SimilarityMetric::Cosine,
            ..EngineConfig::default()
        });
        service.load(sample()).await.unwrap();

        let snapshot = service.current().await.unwrap();
        let matrix = snapshot.matrix();
        for i in 0..matrix.size() {
            assert!((matrix.get(i, i) - 1.0).abs() < 1e-9);
        }
    }

    fn large_dataset(rows: usize) -> RawDataset {
        let records = (0..rows)
            .map(|i| {
                [
                    ("title".to_string(), format!("Drama {}", i)),
                    (
                        "synopsis".to_string(),
                        format!("story{} plot{} romance thriller", i, i % 37),
                    ),
                ]
                .into_iter()
                .collect::<RawRecord>()
            })
            .collect();
        RawDataset {
            columns: vec!["title".to_string(), "synopsis".to_string()],
            records,
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_overlapping_loads_publish_in_call_order() {
        let service = Arc::new(RecommendationService::default());

        let slow = {
            let service = service.clone();
            tokio::spawn(async move { service.load(large_dataset(3000)).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let newer = service.load(sample()).await.unwrap();
        let older = slow.await.unwrap().unwrap();

        assert_ne!(older.id, newer.id);
        let live = service.current().await.unwrap();
        assert_eq!(live.id, newer.id);
        assert_eq!(live.len(), 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_queries_during_load_see_whole_snapshots() {
        let service = Arc::new(RecommendationService::default());
        service.load(sample()).await.unwrap();

        let loading = {
            let service = service.clone();
            tokio::spawn(async move { service.load(large_dataset(2000)).await })
        };

        while !loading.is_finished() {
            let items = service.list_items().await.unwrap();
            let stats = service.stats().await.unwrap();
            assert!(items.len() == 5 || items.len() == 2000);
            assert!(stats.total_dramas == 5 || stats.total_dramas == 2000);
            tokio::task::yield_now().await;
        }

        loading.await.unwrap().unwrap();
        assert_eq!(service.list_items().await.unwrap().len(), 2000);
        assert!(matches!(
            service.recommend("Drama 7").await.unwrap(),
            RecommendResult::Found { .. }
        ));
    }

    #[tokio::test]
    async fn test_titles_are_trimmed_at_load() {
        let service = RecommendationService::default();
        let data = dataset(&["title", "synopsis"], &[&["Kingdom ", "zombies"], &["Signal", "radio"]]);
        let snapshot = service.load(data).await.unwrap();

        assert_eq!(snapshot.titles(), &["Kingdom".to_string(), "Signal".to_string()]);
        assert!(matches!(
            service.recommend("Kingdom").await.unwrap(),
            RecommendResult::Found { .. }
        ));
    }

    #[tokio::test]
    async fn test_load_from_source() {
        let mut source = MockDatasetSource::new();
        source
            .expect_fetch()
            .times(1)
            .returning(|| Ok(b"Name,Synopsis,Genre\nGoblin,immortal goblin,Fantasy\nSignal,radio,Thriller\n".to_vec()));
        source.expect_name().return_const("mock");

        let service = RecommendationService::default();
        let snapshot = assert_ok!(service.load_from(&source).await);
        assert_eq!(snapshot.titles(), &["Goblin".to_string(), "Signal".to_string()]);
        assert!(snapshot.schema().genres);
        assert!(!snapshot.schema().rating);
    }

    #[tokio::test]
    async fn test_load_from_failing_source() {
        let mut source = MockDatasetSource::new();
        source
            .expect_fetch()
            .returning(|| Err(AppError::ExternalApi("down".to_string())));
        source.expect_name().return_const("mock");

        let service = RecommendationService::default();
        assert_err!(service.load_from(&source).await);
        assert!(service.current().await.is_none());
    }
}
