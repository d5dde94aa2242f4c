//! Per-request context.
//!
//! Built once by the dispatcher from the inbound request plus the
//! platform-supplied edge headers, never mutated, dropped when the
//! response goes out. Handlers receive everything through this bundle;
//! there are no ambient globals.

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};

use crate::config::AppConfig;
use crate::storage::ObjectStore;

/// Header carrying the client address, set by the fronting edge.
pub const CONNECTING_IP_HEADER: &str = "x-connecting-ip";

/// Transport scheme the caller used, as seen by the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Plaintext,
    Encrypted,
}

impl Transport {
    pub fn is_plaintext(self) -> bool {
        matches!(self, Transport::Plaintext)
    }

    pub fn scheme(self) -> &'static str {
        match self {
            Transport::Plaintext => "http",
            Transport::Encrypted => "https",
        }
    }
}

/// Geo/network metadata the edge attaches to each request.
///
/// All fields are optional; the struct itself is absent when the edge
/// supplied no geo header at all.
#[derive(Debug, Clone, Default)]
pub struct GeoMetadata {
    pub country: Option<String>,
    pub continent: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub postal_code: Option<String>,
    pub region: Option<String>,
    pub region_code: Option<String>,
    pub timezone: Option<String>,
}

impl GeoMetadata {
    /// Parse the `x-geo-*` header family. Returns `None` when not a single
    /// geo header is present, which handlers treat as "no metadata".
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let geo = Self {
            country: header_value(headers, "x-geo-country"),
            continent: header_value(headers, "x-geo-continent"),
            city: header_value(headers, "x-geo-city"),
            latitude: header_value(headers, "x-geo-latitude"),
            longitude: header_value(headers, "x-geo-longitude"),
            postal_code: header_value(headers, "x-geo-postal-code"),
            region: header_value(headers, "x-geo-region"),
            region_code: header_value(headers, "x-geo-region-code"),
            timezone: header_value(headers, "x-geo-timezone"),
        };

        let any_present = geo.country.is_some()
            || geo.continent.is_some()
            || geo.city.is_some()
            || geo.latitude.is_some()
            || geo.longitude.is_some()
            || geo.postal_code.is_some()
            || geo.region.is_some()
            || geo.region_code.is_some()
            || geo.timezone.is_some();

        any_present.then_some(geo)
    }
}

/// Read-only per-invocation bundle handed to every service handler.
pub struct RequestContext {
    pub method: Method,
    pub headers: HeaderMap,
    pub transport: Transport,
    pub body: Bytes,
    pub geo: Option<GeoMetadata>,
    pub client_ip: Option<String>,
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ObjectStore>,
    pub client: reqwest::Client,
}

impl RequestContext {
    pub fn new(
        method: Method,
        headers: HeaderMap,
        body: Bytes,
        config: Arc<AppConfig>,
        store: Arc<dyn ObjectStore>,
        client: reqwest::Client,
    ) -> Self {
        let transport = match header_value(&headers, "x-forwarded-proto").as_deref() {
            Some("https") => Transport::Encrypted,
            _ => Transport::Plaintext,
        };
        let geo = GeoMetadata::from_headers(&headers);
        let client_ip = header_value(&headers, CONNECTING_IP_HEADER);

        Self {
            method,
            headers,
            transport,
            body,
            geo,
            client_ip,
            config,
            store,
            client,
        }
    }

    /// UTF-8 value of a header, if present and non-empty.
    pub fn header(&self, name: &str) -> Option<String> {
        header_value(&self.headers, name)
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
