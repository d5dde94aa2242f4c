//! ICE server discovery.
//!
//! Picks the closest STUN endpoint from a static routing table, most
//! specific match first: country, then continent, then the default.

use axum::http::{Method, StatusCode};
use axum::response::Response;
use serde_json::json;
use url::Url;

use crate::http::context::RequestContext;
use crate::http::response;
use crate::services::error::ServiceError;

const ICE_SERVERS_PATH: &str = "/webrtc/ice_servers";

const STUN_US_EAST: &str = "stun:44.197.212.58:3478";
const STUN_EU_CENTRAL: &str = "stun:44.197.212.58:3478";
const STUN_AP_SOUTHEAST: &str = "stun:44.197.212.58:3478";

fn stun_server(country: Option<&str>, continent: Option<&str>) -> &'static str {
    match country {
        Some("IL") | Some("LB") => return STUN_EU_CENTRAL,
        _ => {}
    }
    match continent {
        Some("EU") => STUN_EU_CENTRAL,
        Some("AS") | Some("OC") => STUN_AP_SOUTHEAST,
        _ => STUN_US_EAST,
    }
}

pub async fn handle(url: &Url, ctx: &RequestContext) -> Result<Response, ServiceError> {
    if ctx.method != Method::GET {
        return Ok(response::empty_status(StatusCode::METHOD_NOT_ALLOWED));
    }

    if url.path() != ICE_SERVERS_PATH {
        return Ok(response::empty_status(StatusCode::NOT_FOUND));
    }

    let Some(geo) = ctx.geo.as_ref() else {
        return Ok(response::empty_status(StatusCode::BAD_REQUEST));
    };

    let stun = stun_server(geo.country.as_deref(), geo.continent.as_deref());
    Ok(response::pretty_json(
        StatusCode::OK,
        &json!([{ "urls": [stun] }]),
    ))
}
