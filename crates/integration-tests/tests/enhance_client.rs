//! Integration tests for the enhancement client against in-process stubs.
//!
//! These exercise the full HTTP path: URL construction, query encoding, the
//! request bound, and the response-body rules for both tiers.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{Router, extract::Query, http::StatusCode, routing::get};

use promptforge_integration_tests::spawn_stub;
use promptforge_site::config::EnhanceConfig;
use promptforge_site::enhance::{EnhanceClient, EnhanceError};

/// Build a client pointed at the given stub addresses.
fn client_for(free: SocketAddr, pro: SocketAddr, timeout: Duration) -> EnhanceClient {
    EnhanceClient::new(&EnhanceConfig {
        free_base: format!("http://{free}"),
        pro_base: format!("http://{pro}"),
        timeout,
    })
    .expect("Failed to build enhancement client")
}

/// Stub answering both tier shapes with a fixed body.
fn fixed_body_stub(body: &'static str) -> Router {
    Router::new()
        .route("/enhance", get(move || async move { body }))
        .route("/", get(move || async move { body }))
}

#[tokio::test]
async fn test_free_round_trip_body_returned_exactly() {
    let addr = spawn_stub(fixed_body_stub("Hello world")).await;
    let client = client_for(addr, addr, Duration::from_secs(5));

    let result = client
        .enhance_free("greet me")
        .await
        .expect("enhancement should succeed");
    assert_eq!(result, "Hello world");
}

#[tokio::test]
async fn test_free_prompt_url_encoded_and_decoded() {
    // Echo the decoded prompt back so the round trip proves the encoding.
    let router = Router::new().route(
        "/enhance",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            params.get("prompt").cloned().unwrap_or_default()
        }),
    );
    let addr = spawn_stub(router).await;
    let client = client_for(addr, addr, Duration::from_secs(5));

    let prompt = "tell me about cats & dogs / 100% of them";
    let result = client
        .enhance_free(prompt)
        .await
        .expect("enhancement should succeed");
    assert_eq!(result, prompt);
}

#[tokio::test]
async fn test_pro_uses_message_parameter() {
    let router = Router::new().route(
        "/",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            format!("echo:{}", params.get("message").cloned().unwrap_or_default())
        }),
    );
    let addr = spawn_stub(router).await;
    let client = client_for(addr, addr, Duration::from_secs(5));

    let result = client
        .enhance_pro("improve this")
        .await
        .expect("enhancement should succeed");
    assert_eq!(result, "echo:improve this");
}

#[tokio::test]
async fn test_slow_endpoint_times_out() {
    let router = Router::new().route(
        "/enhance",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            "too late"
        }),
    );
    let addr = spawn_stub(router).await;
    let client = client_for(addr, addr, Duration::from_millis(200));

    let err = client
        .enhance_free("anything")
        .await
        .expect_err("request should time out");
    assert!(matches!(err, EnhanceError::Timeout), "got {err:?}");
}

#[tokio::test]
async fn test_non_success_status_surfaced_with_body() {
    let router = Router::new().route(
        "/enhance",
        get(|| async { (StatusCode::BAD_GATEWAY, "upstream unavailable") }),
    );
    let addr = spawn_stub(router).await;
    let client = client_for(addr, addr, Duration::from_secs(5));

    let err = client
        .enhance_free("anything")
        .await
        .expect_err("5xx should be an error");
    match err {
        EnhanceError::Remote { status, body } => {
            assert_eq!(status, 502);
            assert!(body.contains("upstream unavailable"));
        }
        other => panic!("expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_free_body_is_server_fault() {
    let addr = spawn_stub(fixed_body_stub("")).await;
    let client = client_for(addr, addr, Duration::from_secs(5));

    let err = client
        .enhance_free("anything")
        .await
        .expect_err("empty free body should be an error");
    assert!(matches!(err, EnhanceError::Remote { status: 200, .. }), "got {err:?}");
}

#[tokio::test]
async fn test_empty_pro_body_passes_through() {
    let addr = spawn_stub(fixed_body_stub("")).await;
    let client = client_for(addr, addr, Duration::from_secs(5));

    let result = client
        .enhance_pro("anything")
        .await
        .expect("empty pro body is accepted");
    assert_eq!(result, "");
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    // Nothing listens on the free port after we take a different one.
    let client = EnhanceClient::new(&EnhanceConfig {
        free_base: "http://127.0.0.1:1".to_string(),
        pro_base: "http://127.0.0.1:1".to_string(),
        timeout: Duration::from_secs(1),
    })
    .expect("Failed to build enhancement client");

    let err = client
        .enhance_free("anything")
        .await
        .expect_err("connection refused should be an error");
    assert!(
        matches!(err, EnhanceError::Transport(_) | EnhanceError::Timeout),
        "got {err:?}"
    );
}
