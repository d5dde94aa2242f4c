//! Wake-word training-sample upload.
//!
//! # Design Decisions
//! - Precondition failures are rejections, not exceptional failures: the
//!   validator short-circuits with its own JSON bodies in a fixed check
//!   order (first failing check wins) instead of raising domain errors
//! - Storage keys are derived, never caller-chosen: sanitized label plus
//!   content-type extension plus an uploader hash
//! - "Negative" wake words (samples that must not trigger) land under a
//!   `negative-` key prefix so training jobs can split them cheaply

use axum::http::{Method, StatusCode};
use axum::response::Response;
use chrono::Utc;
use serde_json::json;
use sha2::{Digest, Sha256};
use url::Url;

use crate::http::context::RequestContext;
use crate::http::response;
use crate::services::error::ServiceError;

const UPLOAD_PATH: &str = "/assist/wake_word/training_data/upload";

const MIN_CONTENT_LENGTH: usize = 10 * 1024;
const MAX_CONTENT_LENGTH: usize = 250 * 1024;
const MAX_USER_CONTENT_LENGTH: usize = 100;

const WAKE_WORDS: [&str; 3] = ["hey_atlas", "hey_luna", "hey_nothing"];
/// Sub-category of samples that must NOT trigger the wake word.
const NEGATIVE_WAKE_WORDS: [&str; 1] = ["hey_nothing"];

/// File extension for an allowed audio content type; parameters after `;`
/// are ignored (`audio/ogg;codec=opus` is still ogg).
fn extension_for(content_type: &str) -> Option<&'static str> {
    let base = content_type.split(';').next().unwrap_or_default().trim();
    match base {
        "audio/webm" => Some(".webm"),
        "audio/ogg" => Some(".ogg"),
        "audio/mp4" => Some(".mp4"),
        "audio/mpeg" => Some(".mp3"),
        "audio/wav" => Some(".wav"),
        _ => None,
    }
}

/// Lowercase, collapse every non-alphanumeric run to a single `-`, trim
/// edge dashes.
fn sanitize_label(raw: &str) -> String {
    let mut label = String::with_capacity(raw.len());
    let mut pending_dash = false;
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !label.is_empty() {
                label.push('-');
            }
            pending_dash = false;
            label.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    label
}

struct Upload<'a> {
    wake_word: String,
    label: String,
    extension: &'static str,
    negative: bool,
    client_ip: &'a str,
}

/// Linear precondition chain; the first failing check produces the
/// response.
fn validate<'a>(url: &Url, ctx: &'a RequestContext) -> Result<Upload<'a>, (StatusCode, String)> {
    if ctx.method != Method::PUT {
        return Err((StatusCode::METHOD_NOT_ALLOWED, "Invalid method".into()));
    }

    let content_type = ctx.header("content-type").unwrap_or_default();
    let Some(extension) = extension_for(&content_type) else {
        return Err((
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            format!(
                "Invalid content-type, received: {content_type}, \
                 allowed: audio/webm, audio/ogg, audio/mp4, audio/mpeg, audio/wav"
            ),
        ));
    };

    let content_length = ctx
        .header("content-length")
        .and_then(|v| v.parse::<usize>().ok());
    match content_length {
        Some(length) if (MIN_CONTENT_LENGTH..=MAX_CONTENT_LENGTH).contains(&length) => {}
        _ => {
            let received = content_length.map_or_else(|| "none".to_string(), |l| l.to_string());
            return Err((
                StatusCode::PAYLOAD_TOO_LARGE,
                format!(
                    "Invalid content-length, received: {received}, \
                     allowed: [{MIN_CONTENT_LENGTH}-{MAX_CONTENT_LENGTH}]"
                ),
            ));
        }
    }

    let wake_word = query_param(url, "wake_word");
    let user_content = query_param(url, "user_content");
    let (Some(wake_word), Some(user_content)) = (wake_word, user_content) else {
        return Err((
            StatusCode::BAD_REQUEST,
            "Invalid parameters: missing user_content or wake_word".into(),
        ));
    };

    if !WAKE_WORDS.contains(&wake_word.as_str()) {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Invalid wake word, received: {wake_word}"),
        ));
    }

    let label = sanitize_label(&user_content);
    if label.len() > MAX_USER_CONTENT_LENGTH {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "Invalid user content length, received: {}, allowed: {MAX_USER_CONTENT_LENGTH}",
                label.len()
            ),
        ));
    }

    let negative = NEGATIVE_WAKE_WORDS.contains(&wake_word.as_str());
    Ok(Upload {
        wake_word,
        label,
        extension,
        negative,
        client_ip: ctx.client_ip.as_deref().unwrap_or_default(),
    })
}

/// Deterministic storage key:
/// `[negative-]<wake_word>-<instant>-<label>-<uploader hash><ext>`.
fn storage_key(upload: &Upload<'_>, instant: &str) -> String {
    let uploader_hash = hex_sha256(upload.client_ip);
    let prefix = if upload.negative { "negative-" } else { "" };
    format!(
        "{prefix}{wake_word}-{instant}-{label}-{uploader_hash}{extension}",
        wake_word = upload.wake_word,
        label = upload.label,
        extension = upload.extension,
    )
}

fn hex_sha256(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

pub async fn handle(url: &Url, ctx: &RequestContext) -> Result<Response, ServiceError> {
    if url.path() != UPLOAD_PATH {
        return Ok(response::html(StatusCode::NOT_FOUND, "Not found"));
    }

    let upload = match validate(url, ctx) {
        Ok(upload) => upload,
        Err((status, message)) => {
            return Ok(response::pretty_json(status, &json!({ "message": message })));
        }
    };

    let instant = Utc::now()
        .format("%Y-%m-%dT%H-%M-%S%.3f")
        .to_string();
    let key = storage_key(&upload, &instant);
    ctx.store.put(&key, ctx.body.clone()).await?;

    Ok(response::pretty_json(
        StatusCode::CREATED,
        &json!({ "message": "success", "key": key }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::storage::MemoryObjectStore;
    use axum::body::Bytes;
    use axum::http::{HeaderMap, HeaderValue};
    use std::sync::Arc;

    fn upload_url(query: &str) -> Url {
        Url::parse(&format!(
            "https://services.openhome.dev{UPLOAD_PATH}?{query}"
        ))
        .unwrap()
    }

    fn upload_ctx(
        method: Method,
        content_type: &str,
        content_length: usize,
        store: Arc<MemoryObjectStore>,
    ) -> RequestContext {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_str(content_type).unwrap());
        headers.insert(
            "content-length",
            HeaderValue::from_str(&content_length.to_string()).unwrap(),
        );
        headers.insert("x-connecting-ip", HeaderValue::from_static("1.2.3.4"));
        RequestContext::new(
            method,
            headers,
            Bytes::from_static(b"audio-bytes"),
            Arc::new(AppConfig::default()),
            store,
            reqwest::Client::new(),
        )
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn sanitize_collapses_and_trims() {
        assert_eq!(sanitize_label("hello world"), "hello-world");
        assert_eq!(sanitize_label("  Hello,   World!  "), "hello-world");
        assert_eq!(sanitize_label("__a__b__"), "a-b");
        assert_eq!(sanitize_label("!!!"), "");
    }

    #[test]
    fn extension_ignores_parameters() {
        assert_eq!(extension_for("audio/ogg;codec=opus"), Some(".ogg"));
        assert_eq!(extension_for("audio/webm"), Some(".webm"));
        assert_eq!(extension_for("json"), None);
    }

    #[tokio::test]
    async fn successful_upload_stores_object() {
        let store = Arc::new(MemoryObjectStore::new());
        let url = upload_url("wake_word=hey_atlas&user_content=hello%20world");
        let ctx = upload_ctx(Method::PUT, "audio/webm", 150 * 1024, store.clone());
        let response = handle(&url, &ctx).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["message"], "success");
        let key = body["key"].as_str().unwrap();
        assert!(key.starts_with("hey_atlas-"));
        assert!(key.ends_with(".webm"));
        assert!(key.contains("hello-world"));
        assert_eq!(store.keys(), vec![key.to_string()]);
    }

    #[tokio::test]
    async fn negative_wake_word_prefixes_key() {
        let store = Arc::new(MemoryObjectStore::new());
        let url = upload_url("wake_word=hey_nothing&user_content=quiet");
        let ctx = upload_ctx(Method::PUT, "audio/wav", 64 * 1024, store);
        let response = handle(&url, &ctx).await.unwrap();
        let body = body_json(response).await;
        assert!(body["key"].as_str().unwrap().starts_with("negative-"));
    }

    #[tokio::test]
    async fn wrong_method_is_405() {
        let store = Arc::new(MemoryObjectStore::new());
        let url = upload_url("wake_word=hey_atlas&user_content=x");
        let ctx = upload_ctx(Method::GET, "audio/webm", 64 * 1024, store);
        let response = handle(&url, &ctx).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body_json(response).await["message"], "Invalid method");
    }

    #[tokio::test]
    async fn bad_content_type_is_415() {
        let store = Arc::new(MemoryObjectStore::new());
        let url = upload_url("wake_word=hey_atlas&user_content=x");
        let ctx = upload_ctx(Method::PUT, "application/json", 64 * 1024, store);
        let response = handle(&url, &ctx).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let message = body_json(response).await["message"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(message.contains("application/json"));
    }

    #[tokio::test]
    async fn content_length_boundaries() {
        let store = Arc::new(MemoryObjectStore::new());
        let url = upload_url("wake_word=hey_atlas&user_content=x");

        // Exactly at the ceiling is accepted.
        let ctx = upload_ctx(Method::PUT, "audio/webm", MAX_CONTENT_LENGTH, store.clone());
        let response = handle(&url, &ctx).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        // One byte over is rejected.
        let ctx = upload_ctx(
            Method::PUT,
            "audio/webm",
            MAX_CONTENT_LENGTH + 1,
            store.clone(),
        );
        let response = handle(&url, &ctx).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

        // Exactly at the floor is accepted.
        let ctx = upload_ctx(Method::PUT, "audio/webm", MIN_CONTENT_LENGTH, store.clone());
        let response = handle(&url, &ctx).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        // One byte under the floor is rejected.
        let ctx = upload_ctx(Method::PUT, "audio/webm", MIN_CONTENT_LENGTH - 1, store);
        let response = handle(&url, &ctx).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn missing_parameters_are_400() {
        let store = Arc::new(MemoryObjectStore::new());
        let url = upload_url("wake_word=hey_atlas");
        let ctx = upload_ctx(Method::PUT, "audio/webm", 64 * 1024, store);
        let response = handle(&url, &ctx).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["message"],
            "Invalid parameters: missing user_content or wake_word"
        );
    }

    #[tokio::test]
    async fn unknown_wake_word_echoes_value() {
        let store = Arc::new(MemoryObjectStore::new());
        let url = upload_url("wake_word=unknown&user_content=x");
        let ctx = upload_ctx(Method::PUT, "audio/webm", 64 * 1024, store);
        let response = handle(&url, &ctx).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["message"],
            "Invalid wake word, received: unknown"
        );
    }

    #[tokio::test]
    async fn oversized_label_is_400() {
        let store = Arc::new(MemoryObjectStore::new());
        let long = "a".repeat(MAX_USER_CONTENT_LENGTH + 1);
        let url = upload_url(&format!("wake_word=hey_atlas&user_content={long}"));
        let ctx = upload_ctx(Method::PUT, "audio/webm", 64 * 1024, store);
        let response = handle(&url, &ctx).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let message = body_json(response).await["message"]
            .as_str()
            .unwrap()
            .to_string();
        assert!(message.contains("Invalid user content length"));
    }

    #[tokio::test]
    async fn other_assist_path_is_404() {
        let store = Arc::new(MemoryObjectStore::new());
        let url = Url::parse("https://services.openhome.dev/assist/unknown").unwrap();
        let ctx = upload_ctx(Method::PUT, "audio/webm", 64 * 1024, store);
        let response = handle(&url, &ctx).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
