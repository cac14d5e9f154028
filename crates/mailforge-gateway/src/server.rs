// SPDX-FileCopyrightText: 2026 Mailforge Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the campaign API.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

use mailforge_config::model::ServerConfig;
use mailforge_core::MailforgeError;
use mailforge_dispatch::DispatchService;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// The dispatch service constructed by the binary.
    pub service: Arc<DispatchService>,
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
}

impl GatewayState {
    pub fn new(service: Arc<DispatchService>) -> Self {
        Self {
            service,
            start_time: std::time::Instant::now(),
        }
    }
}

/// Build the application router.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/campaigns", post(handlers::post_campaigns))
        .route("/campaigns", get(handlers::get_campaigns))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the gateway HTTP server.
///
/// Binds to the configured host:port and serves until `shutdown` fires:
/// - POST /campaigns — run a campaign to completion
/// - GET /campaigns — status by id, or the owning user's campaign list
/// - GET /health — liveness
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), MailforgeError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| MailforgeError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| MailforgeError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
