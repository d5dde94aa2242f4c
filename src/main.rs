//! Edge services entry point.
//!
//! A stateless edge function hosting a small family of HTTP handlers
//! behind one dispatcher:
//!
//! ```text
//!                    ┌──────────────────────────────────────────────┐
//!                    │                EDGE SERVICES                  │
//!                    │                                               │
//!  Client Request    │  ┌────────┐   ┌────────────┐   ┌──────────┐  │
//!  ──────────────────┼─▶│  http  │──▶│  routing   │──▶│ services │  │
//!                    │  │ server │   │ dispatcher │   │ handlers │  │
//!                    │  └────────┘   └─────┬──────┘   └────┬─────┘  │
//!                    │                     │               │        │
//!                    │                     ▼               ▼        │
//!                    │              ┌────────────┐  ┌────────────┐  │
//!  Client Response   │              │ error      │  │ storage /  │  │
//!  ◀─────────────────┼──────────────│ wrapper    │  │ telemetry  │  │
//!                    │              └────────────┘  └────────────┘  │
//!                    └──────────────────────────────────────────────┘
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod routing;
pub mod services;

// Collaborators and data
pub mod data;
pub mod observability;
pub mod storage;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::AppConfig;
use crate::http::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "edge_services=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("edge-services v{} starting", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::from_env();

    tracing::info!(
        bind_address = %config.bind_address,
        environment = %config.environment,
        telemetry_configured = config.telemetry_dsn.is_some(),
        upload_store_dir = %config.upload_store_dir.display(),
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    let server = HttpServer::new(config);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
