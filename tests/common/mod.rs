//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::{
    body::Body,
    http::{HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    Json, Router,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use driver_gateway::config::GatewayConfig;
use driver_gateway::{HttpServer, Shutdown};

/// Start a gateway on an ephemeral port. The returned [`Shutdown`] stops it.
pub async fn start_gateway(mut config: GatewayConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let server = HttpServer::new(config).expect("valid test config");
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Gateway config pointing at `backend`.
pub fn config_for(backend: SocketAddr) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.upstream.base_url = format!("http://{}", backend);
    config
}

/// An address nothing is listening on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Start an axum backend that describes each request it receives as JSON.
///
/// The reply can be steered with request headers:
/// - `x-reply-status`: status code to answer with
/// - `x-reply-content-type`: answer with a plain body of this content type
///
/// Every reply also carries `x-backend-only` and `set-cookie` headers that
/// the gateway must not relay.
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().fallback(echo);

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

async fn echo(request: Request<Body>) -> Response {
    let status = request
        .headers()
        .get("x-reply-status")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u16>().ok())
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::OK);
    let reply_content_type = request.headers().get("x-reply-content-type").cloned();

    let method = request.method().to_string();
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();
    let mut headers = serde_json::Map::new();
    for (name, value) in request.headers() {
        headers.insert(
            name.to_string(),
            serde_json::Value::String(value.to_str().unwrap_or_default().to_string()),
        );
    }
    let body = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .unwrap_or_default();

    let mut response = match reply_content_type {
        Some(content_type) => {
            let mut response = Response::new(Body::from("plain reply"));
            response.headers_mut().insert("content-type", content_type);
            response
        }
        None => Json(serde_json::json!({
            "method": method,
            "target": target,
            "headers": headers,
            "body": String::from_utf8_lossy(&body),
        }))
        .into_response(),
    };

    *response.status_mut() = status;
    response
        .headers_mut()
        .insert("x-backend-only", HeaderValue::from_static("secret"));
    response
        .headers_mut()
        .insert("set-cookie", HeaderValue::from_static("session=abc"));
    response
}

/// Start a raw TCP backend that reads the request head, writes `reply`
/// verbatim and closes the connection.
pub async fn start_raw_backend(reply: &'static [u8]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let mut buf = [0u8; 4096];
                        let _ = socket.read(&mut buf).await;
                        let _ = socket.write_all(reply).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}
