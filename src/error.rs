use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failures while building a new corpus snapshot
///
/// Any of these aborts the load; the previously published snapshot stays live.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("Dataset contains no usable rows")]
    EmptyCorpus,

    #[error("Dataset is missing required column '{0}'")]
    MissingColumn(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Dataset source error: {0}")]
    Source(String),
}

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Data not loaded")]
    NotLoaded,

    #[error("{0} is required")]
    EmptyQuery(&'static str),

    #[error("Load failed: {0}")]
    Load(#[from] LoadError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::NotLoaded => StatusCode::SERVICE_UNAVAILABLE,
            AppError::EmptyQuery(_) => StatusCode::BAD_REQUEST,
            AppError::Load(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::HttpClient(_) | AppError::ExternalApi(_) => StatusCode::BAD_GATEWAY,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_message() {
        assert_eq!(AppError::EmptyQuery("Title").to_string(), "Title is required");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::NotLoaded.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::EmptyQuery("Query").into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Load(LoadError::EmptyCorpus).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::ExternalApi("boom".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
