//! Character profile handlers.

use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use vgen_image::normalize_reference;
use vgen_models::{Character, FitMode, DEFAULT_SIZE};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveCharacterRequest {
    pub name: String,
    pub bible: Option<String>,
}

/// `POST /api/characters`: create or update a profile.
///
/// An existing profile keeps its lock-image flag; only the bible changes.
pub async fn save_character(
    State(state): State<AppState>,
    Json(req): Json<SaveCharacterRequest>,
) -> ApiResult<Json<Character>> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::invalid_request("character name is required"));
    }

    let bible = req.bible.map(|b| b.trim().to_string()).filter(|b| !b.is_empty());

    let mut character = match state.characters.get(&name).await {
        Ok(existing) => existing,
        Err(e) if e.is_not_found() => Character::new(&name),
        Err(e) => return Err(e.into()),
    };
    character.bible = bible;

    state.characters.save(character.clone()).await?;
    Ok(Json(character))
}

/// `GET /api/characters`: all profiles, newest first.
pub async fn list_characters(State(state): State<AppState>) -> ApiResult<Json<Vec<Character>>> {
    Ok(Json(state.characters.list().await?))
}

/// `GET /api/characters/:name`
pub async fn get_character(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Character>> {
    Ok(Json(state.characters.get(&name).await?))
}

/// `DELETE /api/characters/:name`: profile and lock image.
pub async fn delete_character(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    state.characters.delete(&name).await?;
    info!(character = %name, "deleted character");
    Ok(Json(serde_json::json!({ "deleted": name })))
}

/// `POST /api/characters/:name/lock`: upload a lock image (multipart,
/// `image` field). The image is normalized to baseline geometry on upload so
/// render-time processing always starts from a decodable JPEG.
pub async fn upload_lock_image(
    State(state): State<AppState>,
    Path(name): Path<String>,
    mut multipart: Multipart,
) -> ApiResult<Json<Character>> {
    let mut uploaded: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::invalid_request(format!("malformed multipart body: {e}")))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        if matches!(field_name.as_str(), "image" | "file" | "reference") {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::invalid_request(format!("image upload: {e}")))?;
            if !bytes.is_empty() {
                uploaded = Some(bytes.to_vec());
            }
        }
    }

    let bytes = uploaded.ok_or_else(|| ApiError::invalid_request("image field is required"))?;
    let normalized = normalize_reference(&bytes, DEFAULT_SIZE, FitMode::Cover)?;

    state
        .characters
        .save_lock_image(&name, &normalized.bytes)
        .await?;
    info!(character = %name, bytes = normalized.bytes.len(), "lock image saved");

    Ok(Json(state.characters.get(&name).await?))
}

/// `GET /api/characters/:name/lock`: the stored lock image.
pub async fn get_lock_image(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Response> {
    let bytes = state.characters.lock_image(&name).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "image/jpeg"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        bytes,
    )
        .into_response())
}
