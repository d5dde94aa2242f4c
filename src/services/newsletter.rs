//! Newsletter signup, delegating to the external subscription API.
//!
//! # Design Decisions
//! - Upstream error text is only surfaced to callers when the message is
//!   on an explicit allow-list; everything else renders the generic
//!   `subscription` body
//! - The signup carries the caller's country name so upstream audience
//!   segments stay readable

use axum::http::{Method, StatusCode};
use axum::response::Response;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::data::countries::country_name;
use crate::http::context::RequestContext;
use crate::http::response;
use crate::observability::Telemetry;
use crate::services::error::{ErrorKind, ServiceError};

const SIGNUP_PATH: &str = "/newsletter/signup";
const API_KEY_HEADER: &str = "X-MailerLite-ApiKey";

/// Upstream messages vetted for end users. Anything else stays internal.
const SURFACED_UPSTREAM_ERRORS: [&str; 2] = ["Invalid email address", "Unsubscribed email address"];

pub const SUCCESS_PAGE: &str = "\
<html>
  <head>
    <title>Success</title>
  </head>
  <body>
    <p>You are now subscribed to the newsletter \u{1f389}</p>
    <button onclick=\"window.close();\">Close</button>
  </body>
</html>
";

/// Body sent to the subscription API.
#[derive(Serialize)]
struct SignupPayload<'a> {
    email: &'a str,
    fields: SignupFields<'a>,
}

#[derive(Serialize)]
struct SignupFields<'a> {
    country: &'a str,
}

fn not_valid(message: &str) -> ServiceError {
    ServiceError::new(ErrorKind::NotValid, message, StatusCode::BAD_REQUEST)
}

fn subscription(message: impl Into<String>) -> ServiceError {
    ServiceError::new(
        ErrorKind::Subscription,
        message,
        StatusCode::INTERNAL_SERVER_ERROR,
    )
}

pub async fn handle(
    url: &Url,
    ctx: &RequestContext,
    telemetry: &dyn Telemetry,
) -> Result<Response, ServiceError> {
    let content_type = ctx.header("content-type").unwrap_or_default();
    if ctx.method != Method::POST || url.path() != SIGNUP_PATH || !content_type.contains("form") {
        return Err(not_valid("Invalid request"));
    }

    let Some(email) = form_field(&ctx.body, "email") else {
        return Err(ServiceError::new(
            ErrorKind::MissingEmail,
            "Missing email",
            StatusCode::BAD_REQUEST,
        ));
    };

    telemetry.set_user(&email);

    let country = ctx.geo.as_ref().and_then(|geo| geo.country.as_deref());
    let payload = SignupPayload {
        email: &email,
        fields: SignupFields {
            country: country_name(country),
        },
    };

    let upstream = ctx
        .client
        .post(&ctx.config.newsletter_api_url)
        .header(API_KEY_HEADER, &ctx.config.newsletter_api_key)
        .json(&payload)
        .send()
        .await
        .map_err(|_| subscription("Could not subscribe"))?;

    if !upstream.status().is_success() {
        let data: Value = upstream
            .json()
            .await
            .map_err(|_| subscription("Could not subscribe (unknown error)"))?;
        telemetry.add_breadcrumb(&data.to_string());

        let message = data["error"]["message"].as_str();
        let mut err = subscription(message.unwrap_or("Could not subscribe"));
        if let Some(message) = message {
            if SURFACED_UPSTREAM_ERRORS.contains(&message) {
                err = err.with_user_facing_detail(format!("{message} {email}"));
            }
        }
        return Err(err);
    }

    Ok(response::html(StatusCode::CREATED, SUCCESS_PAGE))
}

/// First value of a field in a form-encoded body.
fn form_field(body: &[u8], field: &str) -> Option<String> {
    url::form_urlencoded::parse(body)
        .find(|(key, _)| key == field)
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::observability::RecordingTelemetry;
    use crate::storage::MemoryObjectStore;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, HeaderValue};
    use std::sync::Arc;

    fn ctx(method: Method, content_type: &'static str, body: &'static [u8]) -> RequestContext {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static(content_type));
        RequestContext::new(
            method,
            headers,
            Bytes::from_static(body),
            Arc::new(AppConfig::default()),
            Arc::new(MemoryObjectStore::new()),
            reqwest::Client::new(),
        )
    }

    fn signup_url() -> Url {
        Url::parse("https://services.openhome.dev/newsletter/signup").unwrap()
    }

    #[test]
    fn form_field_parses_urlencoded() {
        assert_eq!(
            form_field(b"email=test%40test.test&name=x", "email").as_deref(),
            Some("test@test.test")
        );
        assert_eq!(form_field(b"name=x", "email"), None);
    }

    #[tokio::test]
    async fn wrong_method_is_not_valid() {
        let telemetry = RecordingTelemetry::new();
        let err = handle(
            &signup_url(),
            &ctx(Method::GET, "application/x-www-form-urlencoded", b""),
            &telemetry,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotValid);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn wrong_path_is_not_valid() {
        let telemetry = RecordingTelemetry::new();
        let url = Url::parse("https://services.openhome.dev/newsletter/bad").unwrap();
        let err = handle(
            &url,
            &ctx(Method::POST, "application/x-www-form-urlencoded", b""),
            &telemetry,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotValid);
    }

    #[tokio::test]
    async fn non_form_content_type_is_not_valid() {
        let telemetry = RecordingTelemetry::new();
        let err = handle(
            &signup_url(),
            &ctx(Method::POST, "application/json", b"{}"),
            &telemetry,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotValid);
    }

    #[tokio::test]
    async fn missing_email_field() {
        let telemetry = RecordingTelemetry::new();
        let err = handle(
            &signup_url(),
            &ctx(
                Method::POST,
                "application/x-www-form-urlencoded",
                b"name=somebody",
            ),
            &telemetry,
        )
        .await
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingEmail);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
