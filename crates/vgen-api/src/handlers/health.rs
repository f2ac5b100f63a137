//! Liveness endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    default_model: String,
    fallback_model: Option<String>,
    moderation_fallback: bool,
}

/// Health check with a config echo so a deployment's model policy is
/// visible at a glance.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        default_model: state.config.default_model.clone(),
        fallback_model: state.config.fallback_model.clone(),
        moderation_fallback: state.config.moderation_fallback,
    })
}
