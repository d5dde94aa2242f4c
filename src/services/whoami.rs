//! Caller identity/geo lookup with tiered field visibility.
//!
//! # Data Flow
//! ```text
//! GET /whoami/v1[/<key>]
//!     → method / path-prefix / geo gates
//!     → build restricted + full projections (one instant)
//!     → single-key request: transport gate, bare scalar
//!     → whole-object request: required-key check, JSON projection
//! ```
//!
//! # Design Decisions
//! - The restricted map is the authoritative subset; the full map is built
//!   by extending it, never the other way around
//! - The plaintext/encrypted gate is evaluated per key against restricted
//!   membership, not against a blanket list
//! - Absent source values are omitted from the maps, except `ip` and
//!   `currency` which serialize as explicit `null`

use axum::http::{Method, StatusCode};
use axum::response::Response;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use url::Url;

use crate::data::currency::country_currency;
use crate::http::context::RequestContext;
use crate::http::response;
use crate::observability::Telemetry;
use crate::services::error::{ErrorKind, ServiceError};

const VERSIONED_PREFIX: &str = "/whoami/v1";
const DOCS_URL: &str = "https://github.com/openhome-dev/edge-services";

/// Keys that must resolve on the whole-object path, checked in this order.
const REQUIRED_KEYS: [&str; 2] = ["country", "timezone"];

/// Countries whose edge metadata routinely lacks a timezone.
fn timezone_fallback(country: &str) -> Option<&'static str> {
    match country {
        "CN" => Some("Asia/Shanghai"),
        _ => None,
    }
}

/// The two security-tiered views of the request metadata.
///
/// Invariant: every restricted entry appears in the full map with the same
/// value.
pub(crate) struct Projections {
    pub restricted: Map<String, Value>,
    pub full: Map<String, Value>,
}

pub(crate) fn build_projections(
    geo: &crate::http::context::GeoMetadata,
    client_ip: Option<&str>,
    now: DateTime<Utc>,
) -> Projections {
    let mut restricted = Map::new();
    let timezone = geo.timezone.clone().or_else(|| {
        geo.country
            .as_deref()
            .and_then(timezone_fallback)
            .map(str::to_string)
    });
    if let Some(timezone) = timezone {
        restricted.insert("timezone".into(), Value::String(timezone));
    }
    restricted.insert(
        "iso_time".into(),
        Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    restricted.insert("timestamp".into(), Value::from(now.timestamp()));

    let mut full = Map::new();
    full.insert(
        "ip".into(),
        client_ip.map_or(Value::Null, |ip| Value::String(ip.to_string())),
    );
    insert_if_present(&mut full, "city", geo.city.as_deref());
    insert_if_present(&mut full, "continent", geo.continent.as_deref());
    insert_if_present(&mut full, "country", geo.country.as_deref());
    full.insert(
        "currency".into(),
        geo.country
            .as_deref()
            .and_then(country_currency)
            .map_or(Value::Null, |c| Value::String(c.to_string())),
    );
    insert_if_present(&mut full, "latitude", geo.latitude.as_deref());
    insert_if_present(&mut full, "longitude", geo.longitude.as_deref());
    insert_if_present(&mut full, "postal_code", geo.postal_code.as_deref());
    insert_if_present(&mut full, "region_code", geo.region_code.as_deref());
    insert_if_present(&mut full, "region", geo.region.as_deref());
    for (key, value) in &restricted {
        full.insert(key.clone(), value.clone());
    }

    Projections { restricted, full }
}

fn insert_if_present(map: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(value) = value {
        map.insert(key.to_string(), Value::String(value.to_string()));
    }
}

/// Bare scalar rendering for single-key queries.
fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub async fn handle(
    url: &Url,
    ctx: &RequestContext,
    telemetry: &dyn Telemetry,
) -> Result<Response, ServiceError> {
    if ctx.method != Method::GET {
        return Ok(response::empty_status(StatusCode::METHOD_NOT_ALLOWED));
    }

    if !url.path().starts_with(VERSIONED_PREFIX) {
        // Navigation aid for non-versioned paths, not an error.
        return Ok(response::redirect(DOCS_URL));
    }

    let Some(geo) = ctx.geo.as_ref() else {
        return Ok(response::empty_status(StatusCode::BAD_REQUEST));
    };

    let projections = build_projections(geo, ctx.client_ip.as_deref(), Utc::now());

    for (key, value) in &projections.full {
        telemetry.set_extra(key, value.clone());
    }

    // A trailing segment is a single-key request and takes priority over
    // the whole-object form.
    let requested_key = url
        .path()
        .strip_prefix(VERSIONED_PREFIX)
        .and_then(|rest| rest.strip_prefix('/'));
    if let Some(key) = requested_key {
        if let Some(value) = projections.full.get(key) {
            if ctx.transport.is_plaintext() && !projections.restricted.contains_key(key) {
                return Err(ServiceError::new(
                    ErrorKind::NotAllowed,
                    "Requested key not allowed for http",
                    StatusCode::METHOD_NOT_ALLOWED,
                ));
            }
            return Ok(response::text(scalar_text(value)));
        }
        return Err(ServiceError::new(
            ErrorKind::NotValid,
            format!("The requested key \"{key}\" is not valid"),
            StatusCode::METHOD_NOT_ALLOWED,
        ));
    }

    for key in REQUIRED_KEYS {
        if !projections.full.contains_key(key) {
            return Err(ServiceError::new(
                ErrorKind::MissingKeyValue,
                format!("Value for required key \"{key}\" is undefined"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ));
        }
    }

    let map = if ctx.transport.is_plaintext() {
        projections.restricted
    } else {
        projections.full
    };
    Ok(response::pretty_json(StatusCode::OK, &Value::Object(map)))
}
