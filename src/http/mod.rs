//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, ambient layers, catch-all route)
//!     → context.rs (per-request read-only bundle: headers, geo, body)
//!     → [dispatcher selects service handler]
//!     → response.rs (response construction helpers)
//!     → Send to client
//! ```

pub mod context;
pub mod response;
pub mod server;

pub use context::{GeoMetadata, RequestContext, Transport};
pub use server::HttpServer;
