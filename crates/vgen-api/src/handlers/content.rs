//! Content proxy handlers.
//!
//! Failures here answer with plain text rather than the JSON error envelope;
//! these routes are consumed by media elements, not API clients.

use axum::body::Body;
use vgen_provider::VideoBackend;
use axum::extract::{Path, Query, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use vgen_provider::{AssetKind, ContentProbe};

use crate::error::provider_status;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ContentQuery {
    /// Asset selector; unknown values fall back to the video track.
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl ContentQuery {
    fn kind(&self) -> AssetKind {
        self.kind
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

/// `GET /api/ping-content/:id?type=`: cheap existence probe.
pub async fn ping_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ContentQuery>,
) -> Response {
    match state.provider.probe_content(&id, query.kind()).await {
        Ok(probe) => Json(probe).into_response(),
        Err(e) => (provider_status(&e), format!("Content probe failed: {e}")).into_response(),
    }
}

/// `GET /api/content/:id?type=`: relay provider bytes without buffering.
///
/// HEAD requests are answered from a probe so a player can check
/// availability without pulling the asset.
pub async fn stream_content(
    State(state): State<AppState>,
    method: Method,
    Path(id): Path<String>,
    Query(query): Query<ContentQuery>,
) -> Response {
    let kind = query.kind();

    if method == Method::HEAD {
        return match state.provider.probe_content(&id, kind).await {
            Ok(ContentProbe { ok: true, .. }) => (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, kind.default_mime()),
                    (header::CACHE_CONTROL, "no-store"),
                ],
            )
                .into_response(),
            Ok(ContentProbe { status, .. }) => StatusCode::from_u16(status)
                .unwrap_or(StatusCode::BAD_GATEWAY)
                .into_response(),
            Err(e) => (provider_status(&e), format!("Content probe failed: {e}")).into_response(),
        };
    }

    match state.provider.stream_content(&id, kind).await {
        Ok(stream) => {
            let content_type = stream
                .content_type()
                .unwrap_or(kind.default_mime())
                .to_string();
            (
                [
                    (header::CONTENT_TYPE, content_type),
                    (header::CACHE_CONTROL, "no-store".to_string()),
                ],
                Body::from_stream(stream.bytes_stream()),
            )
                .into_response()
        }
        Err(e) => (provider_status(&e), format!("Content fetch failed: {e}")).into_response(),
    }
}
