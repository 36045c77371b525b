//! End-to-end tests against a running site.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//!   (pf-cli migrate site)
//! - The site server running (cargo run -p promptforge-site)
//!
//! Run with: cargo test -p promptforge-integration-tests -- --include-ignored

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

/// Base URL for the site (configurable via environment).
fn site_base_url() -> String {
    std::env::var("SITE_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_health() {
    let resp = client()
        .get(format!("{}/health", site_base_url()))
        .send()
        .await
        .expect("Failed to reach site");

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.expect("Failed to read body"), "ok");
}

// ============================================================================
// Demo Enhancement API
// ============================================================================

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_demo_free_capitalizes_and_appends_checklist() {
    let resp = client()
        .post(format!("{}/api/enhance/free", site_base_url()))
        .json(&json!({ "prompt": "write a story about a dragon" }))
        .send()
        .await
        .expect("Failed to reach site");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse body");
    let result = body["result"].as_str().expect("result missing");
    assert!(result.starts_with("Write A Story About A Dragon"));
    assert!(result.contains("Please provide:"));
}

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_demo_free_rejects_empty_prompt() {
    let resp = client()
        .post(format!("{}/api/enhance/free", site_base_url()))
        .json(&json!({ "prompt": "   " }))
        .send()
        .await
        .expect("Failed to reach site");

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("Failed to parse body");
    assert!(body["error"].is_string());
}

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_demo_pro_requires_bearer() {
    let resp = client()
        .post(format!("{}/api/enhance/pro", site_base_url()))
        .json(&json!({ "prompt": "improve this" }))
        .send()
        .await
        .expect("Failed to reach site");

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_demo_pro_appends_template_with_bearer() {
    let resp = client()
        .post(format!("{}/api/enhance/pro", site_base_url()))
        .bearer_auth("demo-token")
        .json(&json!({ "prompt": "improve this" }))
        .send()
        .await
        .expect("Failed to reach site");

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("Failed to parse body");
    let result = body["result"].as_str().expect("result missing");
    assert!(result.starts_with("improve this"));
    assert!(result.contains("Context Optimization"));
}

// ============================================================================
// Pages
// ============================================================================

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_pricing_page_renders() {
    let resp = client()
        .get(format!("{}/pages/pricing", site_base_url()))
        .send()
        .await
        .expect("Failed to reach site");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("Pricing"));
}

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_unknown_page_is_404() {
    let resp = client()
        .get(format!("{}/pages/does-not-exist", site_base_url()))
        .send()
        .await
        .expect("Failed to reach site");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Auth gating
// ============================================================================

#[tokio::test]
#[ignore = "Requires running site server"]
async fn test_account_redirects_anonymous_to_login() {
    let no_redirect = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client");

    let resp = no_redirect
        .get(format!("{}/account", site_base_url()))
        .send()
        .await
        .expect("Failed to reach site");

    assert!(resp.status().is_redirection());
    let location = resp
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(location.contains("/auth/login"));
}
