//! Response construction helpers.
//!
//! Builders for the handful of response shapes the services produce,
//! decoupled from handler logic. Cross-origin use is expected for every
//! body-carrying response, so those builders attach the permissive CORS
//! header themselves.

use axum::body::Body;
use axum::http::{header, StatusCode};
use axum::response::Response;
use serde_json::Value;

pub const ALLOW_ANY_ORIGIN: (&str, &str) = ("access-control-allow-origin", "*");

/// Empty-bodied response with only a status code.
pub fn empty_status(status: StatusCode) -> Response {
    build(Response::builder().status(status).body(Body::empty()))
}

/// Unconditional 301 to a fixed location.
pub fn redirect(location: &str) -> Response {
    build(
        Response::builder()
            .status(StatusCode::MOVED_PERMANENTLY)
            .header(header::LOCATION, location)
            .body(Body::empty()),
    )
}

/// Bare scalar as plain text (single-key identity queries).
pub fn text(body: String) -> Response {
    build(
        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "text/plain;charset=UTF-8")
            .header(ALLOW_ANY_ORIGIN.0, ALLOW_ANY_ORIGIN.1)
            .body(Body::from(body)),
    )
}

/// Indented JSON body with the given status.
pub fn pretty_json(status: StatusCode, value: &Value) -> Response {
    let body = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
    build(
        Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, "application/json;charset=UTF-8")
            .header(ALLOW_ANY_ORIGIN.0, ALLOW_ANY_ORIGIN.1)
            .body(Body::from(body)),
    )
}

/// Fixed HTML body (newsletter success page).
pub fn html(status: StatusCode, body: &'static str) -> Response {
    build(
        Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, "text/html;charset=UTF-8")
            .header(ALLOW_ANY_ORIGIN.0, ALLOW_ANY_ORIGIN.1)
            .body(Body::from(body)),
    )
}

fn build(result: Result<Response, axum::http::Error>) -> Response {
    result.unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to build response");
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    })
}
