//! Shared utilities for integration testing.

use std::future::Future;
use std::net::SocketAddr;

use axum::{
    extract::Multipart,
    http::{header::CONTENT_TYPE, StatusCode},
    response::IntoResponse,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use image_relay::config::RelayConfig;
use image_relay::http::HttpServer;
use image_relay::lifecycle::Shutdown;

/// Start a mock upstream that answers every route with a fixed response.
pub async fn start_mock_upstream(
    status: u16,
    content_type: &'static str,
    body: &'static [u8],
) -> SocketAddr {
    start_programmable_upstream(move || async move { (status, content_type, body.to_vec()) }).await
}

/// Start a programmable mock upstream.
pub async fn start_programmable_upstream<F, Fut>(f: F) -> SocketAddr
where
    F: Fn() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = (u16, &'static str, Vec<u8>)> + Send + 'static,
{
    let app = Router::new().fallback(move || {
        let f = f.clone();
        async move {
            let (status, content_type, body) = f().await;
            (
                StatusCode::from_u16(status).unwrap(),
                [(CONTENT_TYPE, content_type)],
                body,
            )
                .into_response()
        }
    });

    spawn_app(app).await
}

/// Start a mock upstream that echoes multipart fields back as JSON, so
/// tests can assert byte-for-byte file preservation.
#[allow(dead_code)]
pub async fn start_multipart_echo_upstream() -> SocketAddr {
    async fn echo(mut multipart: Multipart) -> Json<Value> {
        let mut fields = serde_json::Map::new();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            if field.file_name().is_some() || field.content_type().is_some() {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.unwrap();
                fields.insert(
                    name,
                    json!({
                        "filename": filename,
                        "content_type": content_type,
                        "bytes": data.to_vec(),
                    }),
                );
            } else {
                let value = field.text().await.unwrap();
                fields.insert(name, json!(value));
            }
        }
        Json(Value::Object(fields))
    }

    spawn_app(Router::new().fallback(echo)).await
}

async fn spawn_app(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Config pointed at a mock upstream.
pub fn relay_config(upstream_addr: SocketAddr) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.upstream.base_url = format!("http://{upstream_addr}");
    config
}

/// Spawn a relay server on an ephemeral port. The `Shutdown` handle stops
/// it at the end of the test.
pub async fn start_relay(config: RelayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config).expect("failed to build relay");

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}
