//! Snapshot preset handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use vgen_models::{normalize_seconds, normalize_size, Snapshot};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSnapshotRequest {
    pub name: Option<String>,
    pub prompt: String,
    #[serde(default)]
    pub seconds: String,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub model: String,
    pub character: Option<String>,
}

/// `POST /api/snapshots`: save the current parameter set as a preset.
pub async fn create_snapshot(
    State(state): State<AppState>,
    Json(req): Json<CreateSnapshotRequest>,
) -> ApiResult<Json<Snapshot>> {
    let prompt = req.prompt.trim().to_string();
    if prompt.is_empty() {
        return Err(ApiError::invalid_request("prompt is required"));
    }

    let name = req
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| {
            let mut n: String = prompt.chars().take(40).collect();
            if prompt.chars().count() > 40 {
                n.push('…');
            }
            n
        });

    let model = if req.model.trim().is_empty() {
        state.config.default_model.clone()
    } else {
        req.model.trim().to_string()
    };

    let snapshot = Snapshot::new(
        name,
        prompt,
        normalize_seconds(&req.seconds),
        normalize_size(&req.size).to_string(),
        model,
        req.character.filter(|c| !c.trim().is_empty()),
    );

    state.snapshots.insert(snapshot.clone()).await?;
    Ok(Json(snapshot))
}

/// `GET /api/snapshots`: all presets, newest first.
pub async fn list_snapshots(State(state): State<AppState>) -> ApiResult<Json<Vec<Snapshot>>> {
    Ok(Json(state.snapshots.list().await?))
}

/// `GET /api/snapshots/:id`
pub async fn get_snapshot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Snapshot>> {
    Ok(Json(state.snapshots.get(&id).await?))
}

/// `DELETE /api/snapshots/:id`
pub async fn delete_snapshot(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    state.snapshots.delete(&id).await?;
    Ok(Json(serde_json::json!({ "deleted": id })))
}
