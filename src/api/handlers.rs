use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{DramaView, RecommendResult, Stats};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub loaded: bool,
    pub snapshot_id: Option<Uuid>,
    pub loaded_at: Option<DateTime<Utc>>,
    pub total_dramas: usize,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub snapshot_id: Uuid,
    pub loaded_at: DateTime<Utc>,
    pub total_dramas: usize,
}

// Handlers

/// Health check endpoint, reporting the published snapshot
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let snapshot = state.service.current().await;
    Json(HealthResponse {
        status: "healthy",
        loaded: snapshot.is_some(),
        snapshot_id: snapshot.as_ref().map(|s| s.id),
        loaded_at: snapshot.as_ref().map(|s| s.loaded_at),
        total_dramas: snapshot.as_ref().map_or(0, |s| s.len()),
    })
}

/// Get all dramas
pub async fn get_dramas(State(state): State<AppState>) -> AppResult<Json<Vec<DramaView>>> {
    Ok(Json(state.service.list_items().await?))
}

/// Recommend dramas similar to the requested title
///
/// An unknown title answers 404 with suggestions in the body.
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> AppResult<Response> {
    let result = state.service.recommend(&request.title).await?;

    let status = match &result {
        RecommendResult::Found { total_found, .. } => {
            tracing::info!(
                title = %request.title.trim(),
                total_found,
                "Served recommendations"
            );
            StatusCode::OK
        }
        RecommendResult::NotFound { suggestions, .. } => {
            tracing::info!(
                title = %request.title.trim(),
                suggestions = suggestions.len(),
                "Recommendation title not found"
            );
            StatusCode::NOT_FOUND
        }
    };

    Ok((status, Json(result)).into_response())
}

/// Search dramas by title
pub async fn search_dramas(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<DramaView>>> {
    Ok(Json(state.service.search(&params.q).await?))
}

/// Get dataset statistics
pub async fn get_stats(State(state): State<AppState>) -> AppResult<Json<Stats>> {
    Ok(Json(state.service.stats().await?))
}

/// Re-fetch the corpus from the configured source and publish it
pub async fn reload(State(state): State<AppState>) -> AppResult<Json<ReloadResponse>> {
    let source = state
        .source
        .clone()
        .ok_or_else(|| AppError::Internal("No dataset source configured".to_string()))?;

    let snapshot = state.service.load_from(source.as_ref()).await?;

    Ok(Json(ReloadResponse {
        snapshot_id: snapshot.id,
        loaded_at: snapshot.loaded_at,
        total_dramas: snapshot.len(),
    }))
}
