use reqwest::Client as HttpClient;

use crate::{
    error::{AppError, AppResult},
    services::providers::DatasetSource,
};

/// Downloads the dataset over HTTP
///
/// The body is kept in memory; nothing is written to disk.
#[derive(Clone)]
pub struct HttpSource {
    http_client: HttpClient,
    url: String,
}

impl HttpSource {
    pub fn new(url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            url,
        }
    }
}

#[async_trait::async_trait]
impl DatasetSource for HttpSource {
    async fn fetch(&self) -> AppResult<Vec<u8>> {
        tracing::info!(url = %self.url, "Fetching dataset");

        let response = self.http_client.get(&self.url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(url = %self.url, status = %status, "Dataset download failed");
            return Err(AppError::ExternalApi(format!(
                "Dataset download returned status {}",
                status
            )));
        }

        let bytes = response.bytes().await?;
        tracing::debug!(size = bytes.len(), "Dataset downloaded");

        Ok(bytes.to_vec())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
