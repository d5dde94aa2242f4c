//! Service handlers.
//!
//! # Data Flow
//! ```text
//! dispatcher (routing/router.rs)
//!     → one handler per service selector
//!     → handler returns a success Response or raises a ServiceError
//!     → error-normalization wrapper renders failures
//! ```
//!
//! # Design Decisions
//! - Handlers are pure functions of (url, context); no handler owns state
//! - Handlers never build error bodies; the wrapper is the single place
//!   failure semantics are decided (the assist validator's precondition
//!   rejections are the one sanctioned exception)

pub mod assist;
pub mod error;
pub mod newsletter;
pub mod webrtc;
pub mod whoami;

pub use error::{ErrorKind, ServiceError};
