//! Axum API server binary.

use std::net::SocketAddr;

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vgen_api::{create_router, ApiConfig, AppState};
use vgen_provider::ProviderConfig;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    // Required for rustls 0.23+
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        error!("failed to install rustls crypto provider");
        std::process::exit(1);
    }

    info!("starting vgen-api");

    let config = ApiConfig::from_env();
    info!(host = %config.host, port = config.port, "loaded API config");

    let provider_config = match ProviderConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            error!("provider configuration error: {e}");
            std::process::exit(1);
        }
    };

    let state = match AppState::new(config.clone(), provider_config).await {
        Ok(s) => s,
        Err(e) => {
            error!("failed to create application state: {e}");
            std::process::exit(1);
        }
    };

    let app = create_router(state);

    let addr: SocketAddr = match format!("{}:{}", config.host, config.port).parse() {
        Ok(a) => a,
        Err(e) => {
            error!("invalid bind address: {e}");
            std::process::exit(1);
        }
    };

    info!("listening on {addr}");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("server error: {e}");
        std::process::exit(1);
    }

    info!("server shutdown complete");
}

/// Colored output for dev, JSON when LOG_FORMAT=json.
fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,vgen=debug"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        error!("failed to install CTRL+C handler");
        return;
    }
    info!("received shutdown signal");
}
