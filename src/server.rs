//! HTTP Server
//!
//! This module implements the Prometheus exporter HTTP server.
//!
//! # Architecture
//!
//! - **HTTP Server**: Axum-based server exposing `/metrics`, `/health`, and `/` endpoints
//! - **Collection**: every `/metrics` request runs a fresh, concurrent scrape of the Freebox
//! - **State Management**: Shared state (collection context, health flag) using Arc
//!
//! # Endpoints
//!
//! - `GET /` - HTML landing page with links to metrics and health
//! - `GET /metrics` - Prometheus metrics in text format
//! - `GET /health` - 200 if the last scrape collected at least one category, 503 otherwise
//!
//! # Error Handling
//!
//! Category failures only shrink the scrape; `/metrics` still answers 200.
//! On shutdown (Ctrl-C or SIGTERM) the session is closed with a best-effort logout.

use crate::collectors::{self, CollectionContext};
use crate::config::Config;
use crate::freebox::FreeboxClient;
use crate::metrics;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    ctx: CollectionContext,
    healthy: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(ctx: CollectionContext) -> Self {
        Self {
            ctx,
            // Startup already logged in successfully
            healthy: Arc::new(AtomicBool::new(true)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Serve metrics until a shutdown signal, then log out
pub async fn start(config: Config, client: Arc<FreeboxClient>) -> anyhow::Result<()> {
    let ctx = CollectionContext {
        client: client.clone(),
        config: Arc::new(config.metrics.clone()),
    };
    let app = router(AppState::new(ctx));

    let addr = format!("{}:{}", config.server.addr, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Metrics server listening on {}", addr);
    info!("Metrics available at http://{}/metrics", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down");
    if let Err(e) = client.logout().await {
        warn!("Logout failed: {}", e);
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn root_handler() -> impl IntoResponse {
    axum::response::Html(
        r#"<html>
<head><title>Freebox Exporter</title></head>
<body>
<h1>Freebox Prometheus Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
<p><a href="/health">Health</a></p>
</body>
</html>"#,
    )
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    let scrape = collectors::collect_all(&state.ctx).await;
    state.healthy.store(scrape.any_success(), Ordering::Relaxed);
    info!(
        "Collected {} samples ({})",
        scrape.samples.len(),
        if scrape.all_success() {
            "complete"
        } else {
            "partial"
        }
    );

    match metrics::render(&scrape.samples) {
        Ok(body) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error rendering metrics: {}", e),
            )
                .into_response()
        }
    }
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    if state.healthy.load(Ordering::Relaxed) {
        (StatusCode::OK, "OK")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Freebox API unreachable")
    }
}
