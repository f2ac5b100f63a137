//! Render submission handler.

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;

use vgen_models::JobRecord;

use crate::error::{ApiError, ApiResult};
use crate::services::{submit_render, RenderInput, RenderPolicy};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub job: JobRecord,
}

/// `POST /api/render`: multipart submission.
///
/// Text fields: `prompt`, `seconds`, `size`, `fit`, `model`, `character`,
/// `useLock`. File field `reference` (alias `ref`) attaches an ad-hoc
/// reference image.
pub async fn render(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<RenderResponse>> {
    let mut input = RenderInput::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::invalid_request(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "reference" | "ref" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::invalid_request(format!("reference upload: {e}")))?;
                if !bytes.is_empty() {
                    input.reference = Some(bytes.to_vec());
                }
            }
            "prompt" => input.prompt = text_field(field, "prompt").await?,
            "seconds" => input.seconds = text_field(field, "seconds").await?,
            "size" => input.size = text_field(field, "size").await?,
            "fit" => input.fit = text_field(field, "fit").await?,
            "model" => input.model = text_field(field, "model").await?,
            "character" => {
                let value = text_field(field, "character").await?;
                if !value.trim().is_empty() {
                    input.character = Some(value);
                }
            }
            "useLock" | "use_lock" => {
                let value = text_field(field, "useLock").await?;
                input.use_lock = matches!(
                    value.trim().to_ascii_lowercase().as_str(),
                    "1" | "true" | "yes" | "on"
                );
            }
            _ => {}
        }
    }

    let policy = RenderPolicy::from(&state.config);
    let outcome = submit_render(
        state.provider.as_ref(),
        &state.characters,
        &state.jobs,
        &policy,
        input,
    )
    .await?;

    Ok(Json(RenderResponse {
        id: outcome.job_id,
        note: outcome.note,
        job: outcome.record,
    }))
}

async fn text_field(field: axum::extract::multipart::Field<'_>, name: &str) -> ApiResult<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::invalid_request(format!("field {name}: {e}")))
}
