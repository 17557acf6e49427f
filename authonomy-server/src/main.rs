mod api;
mod config;
mod errors;
mod identity_client;
mod models;
mod openapi;
mod provider_client;
mod seed;
mod state;
mod store;
#[cfg(test)]
mod test_utils;

use crate::config::AuthonomyConfig;
use crate::state::AppState;
use axum::Router;
use log::{error, info};
use std::fmt::Display;
use std::net::SocketAddr;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

/// Logs a startup failure and exits with status 1
fn fatal(context: &str, err: impl Display) -> ! {
    error!("{}: {}", context, err);
    std::process::exit(1)
}

#[tokio::main]
async fn main() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AuthonomyConfig::new().unwrap_or_else(|e| fatal("Configuration error", e));

    // A missing signing secret aborts here, before the store is connected
    let state = AppState::new(config.clone())
        .await
        .unwrap_or_else(|e| fatal("Failed to initialize application state", e));

    if config.reset {
        info!(
            "Resetting store and seeding demo schemas from {}",
            config.schemas_dir.display()
        );
        if let Err(e) = seed::reset_and_seed(&state.store, &state.identity, &config.schemas_dir).await {
            fatal("Failed to seed demo schemas", e);
        }
    }

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| fatal(&format!("Failed to bind to {addr}"), e));

    info!("Authonomy listening on {}", addr);
    if let Err(e) = axum::serve(listener, create_app(state).await)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        fatal("Server error", e);
    }
    info!("Server stopped");
}

/// Router with the API, its OpenAPI document and the Scalar UI
pub async fn create_app(state: AppState) -> Router {
    let (openapi_router, api_doc) =
        OpenApiRouter::with_openapi(openapi::ApiDoc::openapi()).split_for_parts();

    Router::new()
        .merge(api::router(&state))
        .merge(openapi_router)
        .merge(Scalar::with_url("/scalar", api_doc))
        .with_state(state)
}

/// Resolves on Ctrl+C, or SIGTERM on unix
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler");
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.expect("Failed to install Ctrl+C handler");
                info!("Received Ctrl+C, shutting down");
            }
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
        info!("Received Ctrl+C, shutting down");
    }
}
