//! Integration tests for `PromptForge`.
//!
//! # Test Categories
//!
//! - `enhance_client` - drives the real enhancement client against
//!   in-process stub servers; runs with plain `cargo test`
//! - `site_e2e` - end-to-end tests against a running site; `#[ignore]`d by
//!   default and require `SITE_BASE_URL` (default `http://localhost:3000`)
//!
//! # Running Tests
//!
//! ```bash
//! # Stub-server tests only
//! cargo test -p promptforge-integration-tests
//!
//! # Everything, against a running site
//! cargo run -p promptforge-site &
//! cargo test -p promptforge-integration-tests -- --include-ignored
//! ```

use std::net::SocketAddr;

use axum::Router;

/// Spawn an in-process stub server on an ephemeral port.
///
/// The server runs until the test process exits; tests bind fresh listeners
/// so there is no cross-test interference.
///
/// # Panics
///
/// Panics if the listener cannot be bound (tests only).
pub async fn spawn_stub(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub listener");
    let addr = listener.local_addr().expect("Failed to read stub address");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Stub server error");
    });

    addr
}
