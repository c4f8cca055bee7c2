use std::path::PathBuf;

use crate::{
    error::{AppResult, LoadError},
    services::providers::DatasetSource,
};

/// Reads the dataset from a local CSV file
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl DatasetSource for FileSource {
    async fn fetch(&self) -> AppResult<Vec<u8>> {
        tracing::info!(path = %self.path.display(), "Reading dataset file");

        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            LoadError::Source(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        Ok(bytes)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
