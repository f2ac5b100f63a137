//! Status polling handler.

use axum::extract::{Path, State};
use axum::Json;

use vgen_models::JobStatusView;

use crate::error::ApiResult;
use crate::services::poll_status;
use crate::state::AppState;

/// `GET /api/status/:id`: reconcile with the provider and answer.
pub async fn get_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<JobStatusView>> {
    let view = poll_status(state.provider.as_ref(), &state.jobs, &id).await?;
    Ok(Json(view))
}
