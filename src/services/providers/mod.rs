//! Dataset source abstraction
//!
//! The corpus CSV can come from a local file or a remote URL. Each source
//! only fetches raw bytes; parsing and indexing happen in the service.

use crate::error::AppResult;

pub mod file;
pub mod http;

pub use file::FileSource;
pub use http::HttpSource;

/// Trait for corpus data sources
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait DatasetSource: Send + Sync {
    /// Fetch the full dataset as raw CSV bytes
    async fn fetch(&self) -> AppResult<Vec<u8>>;

    /// Source name for logging and debugging
    fn name(&self) -> &'static str;
}
