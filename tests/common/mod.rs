//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::Arc;

use edge_services::observability::{RecordingTelemetry, Telemetry};
use edge_services::storage::{MemoryObjectStore, ObjectStore};
use edge_services::{AppConfig, HttpServer};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Spawn the real server on an ephemeral loopback port with recording
/// collaborators.
#[allow(dead_code)]
pub async fn spawn_server(
    config: AppConfig,
) -> (SocketAddr, Arc<MemoryObjectStore>, Arc<RecordingTelemetry>) {
    let store = Arc::new(MemoryObjectStore::new());
    let telemetry = Arc::new(RecordingTelemetry::new());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::with_collaborators(
        config,
        store.clone() as Arc<dyn ObjectStore>,
        telemetry.clone() as Arc<dyn Telemetry>,
    );
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });

    (addr, store, telemetry)
}

/// Start a mock subscription upstream returning a fixed response.
#[allow(dead_code)]
pub async fn start_mock_upstream(status: u16, body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        // Drain the request before answering.
                        let mut buf = [0u8; 8192];
                        let _ = socket.read(&mut buf).await;

                        let status_text = match status {
                            200 => "200 OK",
                            201 => "201 Created",
                            400 => "400 Bad Request",
                            429 => "429 Too Many Requests",
                            500 => "500 Internal Server Error",
                            _ => "200 OK",
                        };
                        let response = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Client that never follows redirects, so 301s stay observable.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}
