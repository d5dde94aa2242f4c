//! Telemetry collaborator contract and implementations.
//!
//! The dispatcher and handlers talk to an external crash-reporting client
//! through this narrow trait. Every method is infallible from the caller's
//! perspective; a telemetry outage must never surface in a response.

use crate::services::error::ServiceError;
use serde_json::Value;

/// Crash-reporting / context-tagging collaborator.
pub trait Telemetry: Send + Sync {
    fn add_breadcrumb(&self, message: &str);
    fn set_tag(&self, key: &str, value: &str);
    fn set_extra(&self, key: &str, value: Value);
    fn set_user(&self, email: &str);

    /// Report an error upstream, returning an opaque correlation id when
    /// the report was accepted.
    fn capture_exception(&self, error: &ServiceError) -> Option<String>;
}

/// Production implementation backed by `tracing`.
///
/// Correlation ids are minted locally (UUID v4) so log lines can be joined
/// with whatever collector ships these events off-host.
pub struct TracingTelemetry {
    environment: String,
}

impl TracingTelemetry {
    pub fn new(environment: impl Into<String>) -> Self {
        Self {
            environment: environment.into(),
        }
    }
}

impl Telemetry for TracingTelemetry {
    fn add_breadcrumb(&self, message: &str) {
        tracing::debug!(environment = %self.environment, breadcrumb = %message, "Telemetry breadcrumb");
    }

    fn set_tag(&self, key: &str, value: &str) {
        tracing::debug!(environment = %self.environment, tag = %key, value = %value, "Telemetry tag");
    }

    fn set_extra(&self, key: &str, value: Value) {
        tracing::debug!(environment = %self.environment, extra = %key, value = %value, "Telemetry extra");
    }

    fn set_user(&self, email: &str) {
        tracing::debug!(environment = %self.environment, user = %email, "Telemetry user");
    }

    fn capture_exception(&self, error: &ServiceError) -> Option<String> {
        let correlation_id = uuid::Uuid::new_v4().to_string();
        tracing::error!(
            environment = %self.environment,
            kind = %error.kind(),
            status = %error.status(),
            message = %error.message(),
            correlation_id = %correlation_id,
            "Captured service error"
        );
        Some(correlation_id)
    }
}

/// Recording double for tests.
#[derive(Default)]
pub struct RecordingTelemetry {
    inner: std::sync::Mutex<Recorded>,
}

#[derive(Default, Clone)]
pub struct Recorded {
    pub breadcrumbs: Vec<String>,
    pub tags: Vec<(String, String)>,
    pub extras: Vec<(String, Value)>,
    pub users: Vec<String>,
    /// (kind wire form, message) per captured error.
    pub captured: Vec<(String, String)>,
}

impl RecordingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Recorded {
        self.inner.lock().unwrap().clone()
    }
}

impl Telemetry for RecordingTelemetry {
    fn add_breadcrumb(&self, message: &str) {
        self.inner.lock().unwrap().breadcrumbs.push(message.into());
    }

    fn set_tag(&self, key: &str, value: &str) {
        self.inner
            .lock()
            .unwrap()
            .tags
            .push((key.into(), value.into()));
    }

    fn set_extra(&self, key: &str, value: Value) {
        self.inner.lock().unwrap().extras.push((key.into(), value));
    }

    fn set_user(&self, email: &str) {
        self.inner.lock().unwrap().users.push(email.into());
    }

    fn capture_exception(&self, error: &ServiceError) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .captured
            .push((error.kind().as_str().into(), error.message().into()));
        Some("test-correlation-id".into())
    }
}
