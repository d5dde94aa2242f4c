//! Edge service endpoints behind a single dispatcher.

pub mod config;
pub mod data;
pub mod http;
pub mod observability;
pub mod routing;
pub mod services;
pub mod storage;

pub use config::AppConfig;
pub use http::HttpServer;
pub use services::error::{ErrorKind, ServiceError};
