//! End-to-end tests for dispatch and error normalization.

use edge_services::AppConfig;
use serde_json::Value;

mod common;

#[tokio::test]
async fn unknown_service_is_404_and_unreported() {
    let (addr, _, telemetry) = common::spawn_server(AppConfig::default()).await;
    let client = common::client();

    let res = client
        .get(format!("http://{addr}/unknown/anything"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    assert_eq!(res.text().await.unwrap(), "");

    // "No such service" is not an application error.
    assert!(telemetry.recorded().captured.is_empty());
}

#[tokio::test]
async fn service_tag_is_set_even_for_404() {
    let (addr, _, telemetry) = common::spawn_server(AppConfig::default()).await;
    let client = common::client();

    client
        .get(format!("http://{addr}/unknown/anything"))
        .send()
        .await
        .unwrap();

    let tags = telemetry.recorded().tags;
    assert!(tags.contains(&("service".to_string(), "unknown".to_string())));
}

#[tokio::test]
async fn error_negotiated_as_json() {
    let (addr, _, _) = common::spawn_server(AppConfig::default()).await;
    let client = common::client();

    let res = client
        .get(format!("http://{addr}/whoami/v1/ip"))
        .header("accept", "application/json")
        .header("x-geo-country", "US")
        .header("x-connecting-ip", "1.2.3.4")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 405);
    assert_eq!(
        res.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "not_allowed");
}

#[tokio::test]
async fn error_negotiated_as_text_by_default() {
    let (addr, _, _) = common::spawn_server(AppConfig::default()).await;
    let client = common::client();

    let res = client
        .get(format!("http://{addr}/whoami/v1/ip"))
        .header("x-geo-country", "US")
        .header("x-connecting-ip", "1.2.3.4")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 405);
    assert_eq!(res.text().await.unwrap(), "Error: not_allowed");
}

#[tokio::test]
async fn webrtc_ice_servers_follow_geo() {
    let (addr, _, _) = common::spawn_server(AppConfig::default()).await;
    let client = common::client();

    let res = client
        .get(format!("http://{addr}/webrtc/ice_servers"))
        .header("x-geo-country", "US")
        .header("x-geo-continent", "NA")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let body: Value = res.json().await.unwrap();
    let urls = body[0]["urls"].as_array().unwrap();
    assert_eq!(urls.len(), 1);
    assert!(urls[0].as_str().unwrap().starts_with("stun:"));
}

#[tokio::test]
async fn webrtc_without_geo_is_400() {
    let (addr, _, _) = common::spawn_server(AppConfig::default()).await;
    let client = common::client();

    let res = client
        .get(format!("http://{addr}/webrtc/ice_servers"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
}
