//! API routes.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::characters::{
    delete_character, get_character, get_lock_image, list_characters, save_character,
    upload_lock_image,
};
use crate::handlers::content::{ping_content, stream_content};
use crate::handlers::health::health;
use crate::handlers::jobs::{get_job, history, list_provider_jobs};
use crate::handlers::render::render;
use crate::handlers::snapshots::{
    create_snapshot, delete_snapshot, get_snapshot, list_snapshots,
};
use crate::handlers::status::get_status;
use crate::middleware::{
    access_gate, cors_layer, rate_limit_middleware, request_id, request_logging,
    security_headers, RateLimiterCache,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let render_routes = Router::new()
        .route("/render", post(render))
        .route("/status/:id", get(get_status))
        .route("/ping-content/:id", get(ping_content))
        .route("/content/:id", get(stream_content))
        .route("/list", get(list_provider_jobs))
        .route("/history", get(history))
        .route("/job/:id", get(get_job));

    let character_routes = Router::new()
        .route("/characters", get(list_characters).post(save_character))
        .route("/characters/:name", get(get_character).delete(delete_character))
        .route(
            "/characters/:name/lock",
            get(get_lock_image).post(upload_lock_image),
        );

    let snapshot_routes = Router::new()
        .route("/snapshots", get(list_snapshots).post(create_snapshot))
        .route("/snapshots/:id", get(get_snapshot).delete(delete_snapshot));

    let rate_limiter = Arc::new(RateLimiterCache::new(state.config.rate_limit_rps));

    let api_routes = Router::new()
        .merge(render_routes)
        .merge(character_routes)
        .merge(snapshot_routes)
        .layer(middleware::from_fn_with_state(state.clone(), access_gate))
        .layer(middleware::from_fn_with_state(
            rate_limiter,
            rate_limit_middleware,
        ));

    let health_routes = Router::new().route("/health", get(health));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        // Multipart reference uploads exceed axum's 2 MB default.
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
