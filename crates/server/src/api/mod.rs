//! API module wiring the HTTP server together.
//!
//! This module is organized into submodules:
//! - `health` - Health check endpoint (/healthz)
//! - `debug` - In-memory state inspection (/debug/*)
//! - `openapi` - OpenAPI/Utoipa configuration
//!
//! The ESIA endpoints themselves live in [`crate::oauth2`].

pub mod debug;
pub mod health;
pub mod openapi;

pub use debug::DEBUG_TAG;
pub use health::MISC_TAG;

use crate::config::AppConfig;
use crate::oauth2::{self, OAuth2State};
use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_redoc::{Redoc, Servable};

/// Builds the full application router.
pub fn app(state: OAuth2State, config: &AppConfig) -> Router {
    let mut api = OpenApiRouter::with_openapi(openapi::ApiDoc::openapi())
        .merge(oauth2::router(state.clone()))
        .routes(routes!(health::health));

    if config.debug_endpoints {
        api = api.nest("/debug", debug::router(state));
    }

    let (router, api) = api
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .split_for_parts();

    router.merge(Redoc::with_url("/api-docs", api))
}

/// Starts the web server and runs until Ctrl-C.
#[tracing::instrument(skip(state, config))]
pub async fn start_webserver(state: OAuth2State, config: &AppConfig) -> color_eyre::Result<()> {
    let router = app(state, config);

    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    tracing::info!(
        addr = %config.bind_address,
        issuer = %config.issuer(),
        "ESIA mock server started"
    );
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| color_eyre::Report::msg(format!("Failed to start server: {e}")))?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
