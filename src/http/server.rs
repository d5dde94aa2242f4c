//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router (one catch-all route into the dispatcher)
//! - Wire up ambient middleware (tracing, timeout, body limit, request ID)
//! - Bind the server to a listener with graceful shutdown
//!
//! # Design Decisions
//! - No per-service axum routes: the dispatcher's selector match is the
//!   routing table, so the HTTP layer stays a thin shell
//! - Collaborators (object store, telemetry) are injected here once and
//!   travel to handlers via the request context, never via globals

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::any, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::observability::{Telemetry, TracingTelemetry};
use crate::routing::route_request;
use crate::storage::{FsObjectStore, ObjectStore};

/// Ceiling for buffered request bodies, comfortably above the largest
/// accepted upload.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application state injected into the dispatcher.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ObjectStore>,
    pub telemetry: Arc<dyn Telemetry>,
    pub client: reqwest::Client,
}

/// HTTP server hosting the edge services.
pub struct HttpServer {
    router: Router,
    config: Arc<AppConfig>,
}

impl HttpServer {
    /// Create a server with production collaborators.
    pub fn new(config: AppConfig) -> Self {
        let store = Arc::new(FsObjectStore::new(config.upload_store_dir.clone()));
        let telemetry = Arc::new(TracingTelemetry::new(config.environment.clone()));
        Self::with_collaborators(config, store, telemetry)
    }

    /// Create a server with injected collaborators (tests use this).
    pub fn with_collaborators(
        config: AppConfig,
        store: Arc<dyn ObjectStore>,
        telemetry: Arc<dyn Telemetry>,
    ) -> Self {
        let config = Arc::new(config);
        let state = AppState {
            config: config.clone(),
            store,
            telemetry,
            client: reqwest::Client::new(),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(route_request))
            .route("/", any(route_request))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(TraceLayer::new_for_http())
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.request_timeout_secs,
                    ))),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            environment = %self.config.environment,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received");
}
