//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page (enhancer form)
//! POST /enhance                - Enhance a prompt (form submission)
//! GET  /health                 - Health check
//!
//! # Demo enhancement API (self-contained JSON endpoints)
//! POST /api/enhance/free       - Free-tier demo handler
//! POST /api/enhance/pro        - Pro-tier demo handler (Bearer required)
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/register          - Register page
//! POST /auth/register          - Register action
//! POST /auth/logout            - Logout action
//!
//! # Federated sign-in (OAuth 2.0 authorization code)
//! GET  /auth/federated/login     - Redirect to the identity provider
//! GET  /auth/federated/callback  - Handle the OAuth callback
//!
//! # Account (requires auth)
//! GET  /account                - Account overview
//! GET  /account/live           - Live account updates (SSE)
//! POST /account/subscription/cancel     - Cancel at period end
//! POST /account/subscription/reactivate - Undo a pending cancellation
//!
//! # Payment (requires auth)
//! GET  /payment                - Card form
//! POST /payment                - Submit card, upgrade to pro
//!
//! # Marketing pages
//! GET  /pages/{slug}           - Markdown page (pricing, docs, features, terms)
//! ```

pub mod account;
pub mod auth;
pub mod enhance;
pub mod home;
pub mod oauth;
pub mod pages;
pub mod payment;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
        // Federated sign-in
        .route("/federated/login", get(oauth::login))
        .route("/federated/callback", get(oauth::callback))
}

/// Create the account routes router.
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(account::index))
        .route("/live", get(account::live))
        .route("/subscription/cancel", post(account::cancel_subscription))
        .route(
            "/subscription/reactivate",
            post(account::reactivate_subscription),
        )
}

/// Create the demo enhancement API router.
pub fn demo_api_routes() -> Router<AppState> {
    Router::new()
        .route("/free", post(enhance::demo_free))
        .route("/pro", post(enhance::demo_pro))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page and enhancer form
        .route("/", get(home::home))
        .route("/enhance", post(enhance::enhance))
        // Account routes
        .nest("/account", account_routes())
        // Payment flow
        .route("/payment", get(payment::form).post(payment::submit))
        // Auth routes (strict limiter: login/registration brute force)
        .nest("/auth", auth_routes().layer(auth_rate_limiter()))
        // Demo enhancement API (relaxed limiter)
        .nest("/api/enhance", demo_api_routes().layer(api_rate_limiter()))
        // Marketing pages
        .route("/pages/{slug}", get(pages::show))
}
