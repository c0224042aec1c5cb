//! stockroom-server: HTTP layer for the items service
//!
//! Thin plumbing over the connection lifecycle core: axum routes for the
//! items CRUD surface, a liveness endpoint, an OpenAPI document, and the
//! serverless invocation adapter. Handlers reach the store only through
//! the core's narrow query interface.

pub mod error;
pub mod models;
pub mod routes;
pub mod serverless;
pub mod state;

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use stockroom_core::Database;

pub use error::ApiError;
pub use state::AppState;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 0.0.0.0:3000)
    pub bind_addr: SocketAddr,

    /// Serve the OpenAPI document at /api-docs/openapi.json.
    pub expose_docs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            expose_docs: true,
        }
    }
}

/// Build the application router with all routes.
pub fn build_router(state: AppState) -> Router {
    let mut app = Router::new()
        .nest("/api/v1", routes::items::router())
        .merge(routes::health::router());

    if state.docs_exposed() {
        app = app.merge(routes::docs::router());
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the long-running HTTP server.
pub async fn run_server(db: Database, config: ServerConfig) -> Result<(), ServeError> {
    // The process starts even when the store is down; handlers answer 503
    // until a later schema check succeeds.
    if let Err(err) = db.ensure_schema().await {
        tracing::warn!(error = %err, "schema not ready at startup, serving degraded");
    }

    let state = AppState::new(db, config.expose_docs);
    let app = build_router(state);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 3000);
        assert!(config.expose_docs);
    }
}
