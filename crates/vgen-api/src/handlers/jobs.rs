//! Local job history and provider list passthrough.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use vgen_models::JobRecord;

use crate::error::ApiResult;
use crate::state::AppState;

/// Most records the history endpoint will return.
const HISTORY_CAP: usize = 50;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<u32>,
}

/// `GET /api/history`: locally recorded jobs, newest first.
pub async fn history(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<JobRecord>>> {
    let limit = query
        .limit
        .map(|l| l as usize)
        .unwrap_or(HISTORY_CAP)
        .min(HISTORY_CAP);
    let records = state.jobs.list(limit).await?;
    Ok(Json(records))
}

/// `GET /api/job/:id`: one locally recorded job.
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobRecord>> {
    let record = state.jobs.get(&id).await?;
    Ok(Json(record))
}

/// `GET /api/list?limit=`: provider-side job list, passed through untouched.
pub async fn list_provider_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let limit = query.limit.unwrap_or(10).min(100);
    let value = state.provider.list_videos(limit).await?;
    Ok(Json(value))
}
