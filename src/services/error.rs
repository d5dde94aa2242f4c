//! Domain error taxonomy shared by the service handlers.
//!
//! Handlers either return a success response or raise a [`ServiceError`];
//! only the dispatcher's normalization wrapper turns errors into response
//! bodies. The wire form of an error is its kind (snake_case), never the
//! internal message, unless the error explicitly carries a vetted
//! user-facing detail.

use axum::http::StatusCode;
use thiserror::Error;

/// Machine-readable error kind, rendered snake_case on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Anything not recognized as a domain failure.
    Unexpected,
    /// Request shape is wrong (method, path, content type, unknown key).
    NotValid,
    /// Request is well-formed but forbidden on this transport.
    NotAllowed,
    /// A required projection key has no value.
    MissingKeyValue,
    /// Signup form without an email field.
    MissingEmail,
    /// Upstream subscription API failure.
    Subscription,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Unexpected => "unexpected",
            ErrorKind::NotValid => "not_valid",
            ErrorKind::NotAllowed => "not_allowed",
            ErrorKind::MissingKeyValue => "missing_key_value",
            ErrorKind::MissingEmail => "missing_email",
            ErrorKind::Subscription => "subscription",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed failure raised by a service handler.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    kind: ErrorKind,
    message: String,
    status: StatusCode,
    /// Set only for errors whose text is allow-listed for end users; the
    /// wrapper renders this instead of the generic `Error: <kind>` body.
    user_facing_detail: Option<String>,
}

impl ServiceError {
    pub fn new(kind: ErrorKind, message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            kind,
            message: message.into(),
            status,
            user_facing_detail: None,
        }
    }

    /// Coercion target for failures that are not domain errors.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Unexpected,
            message,
            StatusCode::INTERNAL_SERVER_ERROR,
        )
    }

    /// Attach a vetted detail that may be shown to the caller.
    pub fn with_user_facing_detail(mut self, detail: impl Into<String>) -> Self {
        self.user_facing_detail = Some(detail.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn user_facing_detail(&self) -> Option<&str> {
        self.user_facing_detail.as_deref()
    }
}

impl From<crate::storage::StoreError> for ServiceError {
    fn from(err: crate::storage::StoreError) -> Self {
        ServiceError::unexpected(err.to_string())
    }
}
