//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! dispatcher / handlers
//!     → telemetry.rs (tags, extras, breadcrumbs, captured errors)
//!     → tracing events (structured fields)
//!     → Log aggregation / crash collector (off-host)
//! ```
//!
//! # Design Decisions
//! - One narrow trait at the collaborator seam; handlers never see the
//!   concrete client
//! - Reporting is best-effort: no telemetry call can fail a request
//! - Correlation ids minted per captured error, logged alongside the
//!   response for later joining

pub mod telemetry;

pub use telemetry::{RecordingTelemetry, Telemetry, TracingTelemetry};
