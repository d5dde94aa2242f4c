//! Service dispatch and error normalization.
//!
//! # Responsibilities
//! - Rebuild the caller-facing URL (scheme, host, path, query)
//! - Rewrite the legacy identity host alias
//! - Select a handler by first path segment
//! - Funnel every handler failure through one typed-error pipeline with
//!   content negotiation on the `Accept` header

use std::future::Future;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use serde_json::{json, Value};
use url::Url;

use crate::http::context::{RequestContext, Transport};
use crate::http::response;
use crate::http::server::{AppState, MAX_BODY_BYTES};
use crate::observability::Telemetry;
use crate::services::error::ServiceError;
use crate::services::{assist, newsletter, webrtc, whoami};

/// Host every service is reachable under.
pub const CANONICAL_HOST: &str = "services.openhome.dev";

/// Hosts with this prefix are the retired identity-only address; requests
/// to them are folded into the canonical layout.
const LEGACY_HOST_PREFIX: &str = "whoami";

/// Rebuild the service URL, applying the legacy host rewrite. Pure string
/// substitution; no redirect is issued here.
pub fn service_url(
    transport: Transport,
    host: &str,
    path_and_query: &str,
) -> Result<Url, url::ParseError> {
    let url = Url::parse(&format!(
        "{scheme}://{host}{path_and_query}",
        scheme = transport.scheme()
    ))?;

    if url
        .host_str()
        .is_some_and(|h| h.starts_with(LEGACY_HOST_PREFIX))
    {
        return Url::parse(&format!(
            "{scheme}://{CANONICAL_HOST}/whoami{path}",
            scheme = transport.scheme(),
            path = url.path()
        ));
    }
    Ok(url)
}

/// First path segment of a normalized path; empty for `/`.
pub fn first_path_segment(path: &str) -> &str {
    path.split('/').nth(1).unwrap_or("")
}

/// Dispatcher entry point; the catch-all axum route feeds every request
/// here.
pub async fn route_request(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => return response::empty_status(StatusCode::PAYLOAD_TOO_LARGE),
    };

    let ctx = RequestContext::new(
        parts.method.clone(),
        parts.headers.clone(),
        body,
        state.config.clone(),
        state.store.clone(),
        state.client.clone(),
    );

    let host = ctx.header("host").unwrap_or_else(|| CANONICAL_HOST.into());
    let path_and_query = parts
        .uri
        .path_and_query()
        .map_or("/", |pq| pq.as_str());
    let url = match service_url(ctx.transport, &host, path_and_query) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(host = %host, path = %path_and_query, error = %e, "Unparseable request URL");
            return response::empty_status(StatusCode::BAD_REQUEST);
        }
    };

    let service = first_path_segment(url.path()).to_string();
    let telemetry = state.telemetry.as_ref();

    // Tag before dispatch so even a 404 is traceable.
    telemetry.set_tag("service", &service);
    telemetry.set_extra(
        "request_id",
        ctx.header("x-request-id").map_or(Value::Null, Value::from),
    );
    telemetry.set_extra(
        "request_url",
        json!({
            "protocol": url.scheme(),
            "pathname": url.path(),
            "url": url.as_str(),
        }),
    );

    let accept = ctx.header(header::ACCEPT.as_str()).unwrap_or_default();
    match service.as_str() {
        "whoami" => run_service(telemetry, &accept, whoami::handle(&url, &ctx, telemetry)).await,
        "newsletter" => {
            run_service(telemetry, &accept, newsletter::handle(&url, &ctx, telemetry)).await
        }
        "assist" => run_service(telemetry, &accept, assist::handle(&url, &ctx)).await,
        "webrtc" => run_service(telemetry, &accept, webrtc::handle(&url, &ctx)).await,
        _ => {
            tracing::debug!(service = %service, "No such service");
            response::empty_status(StatusCode::NOT_FOUND)
        }
    }
}

/// Error-normalization wrapper around a single handler invocation.
///
/// The one place failure semantics are decided: report the error, pick the
/// body format from the `Accept` header, and answer with the error's
/// status. Never fails itself.
pub async fn run_service<F>(telemetry: &dyn Telemetry, accept: &str, handler: F) -> Response
where
    F: Future<Output = Result<Response, ServiceError>>,
{
    let err = match handler.await {
        Ok(response) => return response,
        Err(err) => err,
    };

    telemetry.add_breadcrumb(err.message());
    let correlation_id = telemetry.capture_exception(&err);

    let kind = err.kind().as_str();
    let (content_type, body) = if accept.contains("json") {
        let payload = match err.user_facing_detail() {
            Some(detail) => json!({ "error": kind, "message": detail }),
            None => json!({ "error": kind }),
        };
        ("application/json;charset=UTF-8", payload.to_string())
    } else {
        let body = match err.user_facing_detail() {
            Some(detail) => detail.to_string(),
            None => format!("Error: {kind}"),
        };
        ("text/plain;charset=UTF-8", body)
    };

    tracing::error!(
        status = %err.status(),
        body = %body,
        correlation_id = correlation_id.as_deref().unwrap_or("unreported"),
        "Service request failed"
    );

    let builder = Response::builder()
        .status(err.status())
        .header(header::CONTENT_TYPE, content_type)
        .header(response::ALLOW_ANY_ORIGIN.0, response::ALLOW_ANY_ORIGIN.1);
    builder
        .body(Body::from(body))
        .unwrap_or_else(|_| response::empty_status(err.status()))
}
