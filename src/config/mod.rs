//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! process environment
//!     → AppConfig::from_env() (typed, defaulted)
//!     → shared via Arc to the dispatcher and handlers
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the hosting platform restarts the
//!   process to change it
//! - All fields have defaults so local runs need no environment at all
//! - Secrets (API keys, DSN) only ever come from the environment

use std::path::PathBuf;

/// Runtime configuration for the edge services.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Bind address (e.g. "0.0.0.0:8080"). `EDGE_BIND_ADDRESS`.
    pub bind_address: String,

    /// Environment name reported with telemetry. `WORKER_ENV`.
    pub environment: String,

    /// Crash-collector DSN, if any. `TELEMETRY_DSN`.
    pub telemetry_dsn: Option<String>,

    /// API key sent with newsletter signups. `NEWSLETTER_API_KEY`.
    pub newsletter_api_key: String,

    /// Base URL of the subscription API. `NEWSLETTER_API_URL`.
    pub newsletter_api_url: String,

    /// Directory backing the wake-word upload store. `UPLOAD_STORE_DIR`.
    pub upload_store_dir: PathBuf,

    /// Whole-request timeout applied by the ambient timeout layer.
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            environment: "development".to_string(),
            telemetry_dsn: None,
            newsletter_api_key: String::new(),
            newsletter_api_url: "https://api.mailerlite.com/api/v2/subscribers".to_string(),
            upload_store_dir: PathBuf::from("wake-word-uploads"),
            request_timeout_secs: 30,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: env_or("EDGE_BIND_ADDRESS", defaults.bind_address),
            environment: env_or("WORKER_ENV", defaults.environment),
            telemetry_dsn: std::env::var("TELEMETRY_DSN").ok().filter(|v| !v.is_empty()),
            newsletter_api_key: env_or("NEWSLETTER_API_KEY", defaults.newsletter_api_key),
            newsletter_api_url: env_or("NEWSLETTER_API_URL", defaults.newsletter_api_url),
            upload_store_dir: std::env::var("UPLOAD_STORE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_store_dir),
            request_timeout_secs: defaults.request_timeout_secs,
        }
    }
}

fn env_or(key: &str, default: String) -> String {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => value,
        _ => default,
    }
}
