//! HttpSource against a real local HTTP server
//!
//! Each test binds an axum server on an ephemeral port serving fixed bodies.

use std::net::SocketAddr;

use axum::{
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use parl_common::Error;
use parl_viewer::loader::{HttpSource, JsonSource};
use serde_json::{json, Value};

async fn echo_cache_headers(headers: HeaderMap) -> Json<Value> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    Json(json!({
        "cache_control": header("cache-control"),
        "pragma": header("pragma"),
    }))
}

async fn start_server() -> SocketAddr {
    let app = Router::new()
        .route("/strict.json", get(|| async { r#"{"status": "OUI", "score": 1.5}"# }))
        .route(
            "/nan.json",
            get(|| async { r#"{"analysis": {"status": "NON", "score": NaN, "low": -Infinity}}"# }),
        )
        .route("/malformed.json", get(|| async { r#"{"status": "OUI""# }))
        .route(
            "/gone.json",
            get(|| async { (StatusCode::NOT_FOUND, "not here") }),
        )
        .route("/headers.json", get(echo_cache_headers));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server");
    });
    addr
}

#[tokio::test]
async fn test_strict_body_parses() {
    let addr = start_server().await;
    let source = HttpSource::new().unwrap();

    let value = source
        .fetch_json(&format!("http://{}/strict.json", addr))
        .await
        .unwrap();
    assert_eq!(value["status"], "OUI");
}

#[tokio::test]
async fn test_nan_and_infinity_are_sanitized() {
    let addr = start_server().await;
    let source = HttpSource::new().unwrap();

    let value = source
        .fetch_json(&format!("http://{}/nan.json", addr))
        .await
        .unwrap();
    assert_eq!(value["analysis"]["status"], "NON");
    assert!(value["analysis"]["score"].is_null());
    assert!(value["analysis"]["low"].is_null());
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let addr = start_server().await;
    let source = HttpSource::new().unwrap();
    let url = format!("http://{}/malformed.json", addr);

    let err = source.fetch_json(&url).await.unwrap_err();
    assert!(matches!(err, Error::Parse { .. }));
    assert!(err.to_string().starts_with("JSON parse error:"));
    assert_eq!(err.url(), Some(url.as_str()));
}

#[tokio::test]
async fn test_non_success_status_is_transport_error() {
    let addr = start_server().await;
    let source = HttpSource::new().unwrap();

    let err = source
        .fetch_json(&format!("http://{}/gone.json", addr))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport { .. }));
    assert_eq!(err.to_string(), "HTTP 404 Not Found");
}

#[tokio::test]
async fn test_requests_bypass_caches() {
    let addr = start_server().await;
    let source = HttpSource::new().unwrap();

    let value = source
        .fetch_json(&format!("http://{}/headers.json", addr))
        .await
        .unwrap();
    assert!(value["cache_control"].as_str().unwrap().contains("no-store"));
    assert_eq!(value["pragma"], "no-cache");
}
