use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tokio::time::Instant;

use crate::orchestrator::{QueryResult, SourceSummary, SystemStatus};
use crate::web::responses::{ApiResponse, AppError};
use crate::web::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Resolve a search query against cache, live sources, or sample data.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ApiResponse<QueryResult>>, AppError> {
    let query = params
        .q
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("missing search query parameter 'q'"))?;

    let started = Instant::now();
    let result = state.orchestrator.resolve(&query).await;

    let meta = json!({
        "query": query,
        "origin": result.origin,
        "count": result.records.len(),
        "elapsed_ms": started.elapsed().as_millis() as u64,
    });

    Ok(Json(ApiResponse::success_with_meta(result, meta)))
}

pub async fn list_sources(State(state): State<AppState>) -> Json<ApiResponse<Vec<SourceSummary>>> {
    Json(ApiResponse::success(state.orchestrator.list_sources().await))
}

pub async fn get_source(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SourceSummary>>, AppError> {
    let source = state
        .orchestrator
        .registry()
        .get(&id)
        .ok_or_else(|| AppError::not_found(format!("source '{id}'")))?;

    let live_record_count = state.orchestrator.cache().count_by_source(&source.id).await;

    Ok(Json(ApiResponse::success(SourceSummary {
        id: source.id.clone(),
        display_name: source.display_name.clone(),
        live_record_count,
    })))
}

pub async fn system_status(State(state): State<AppState>) -> Json<ApiResponse<SystemStatus>> {
    Json(ApiResponse::success(state.orchestrator.status().await))
}
