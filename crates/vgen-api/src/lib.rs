//! Axum HTTP API server.
//!
//! This crate provides:
//! - The render submission endpoint with its fallback policy
//! - Status polling with store reconciliation
//! - Streaming content proxy
//! - Character/snapshot management
//! - Shared-secret gate, rate limiting and security headers

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
