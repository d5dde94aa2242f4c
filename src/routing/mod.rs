//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (method, headers, body)
//!     → router.rs (service URL, legacy host rewrite)
//!     → first path segment = service selector
//!     → telemetry tagging (unconditional, even for 404s)
//!     → static handler table → error-normalization wrapper
//! ```
//!
//! # Design Decisions
//! - One catch-all route; no per-service axum routes, the selector match
//!   IS the routing table
//! - Unknown selectors bypass the wrapper: "no such service" is not an
//!   application error and reports nothing
//! - Deterministic: same URL always selects the same handler

pub mod router;

pub use router::{route_request, run_service};
