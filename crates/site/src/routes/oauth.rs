//! Federated sign-in route handlers.
//!
//! Generic OAuth 2.0 authorization code flow:
//! - Login: redirects to the identity provider's authorization page
//! - Callback: validates state, exchanges the code, fetches the identity,
//!   and finds or creates the matching account
//!
//! The whole flow is disabled when the `OAUTH_*` configuration block is
//! absent.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use rand::Rng;
use secrecy::ExposeSecret;
use serde::Deserialize;
use tower_sessions::Session;

use crate::config::OAuthConfig;
use crate::db::AccountRepository;
use crate::error::set_sentry_user;
use crate::middleware::set_current_user;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

use promptforge_core::Email;

/// Query parameters from the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    /// Authorization code to exchange for a token.
    pub code: Option<String>,
    /// State parameter for CSRF protection.
    pub state: Option<String>,
    /// Error code if authorization failed.
    pub error: Option<String>,
    /// Error description.
    pub error_description: Option<String>,
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Userinfo endpoint response.
#[derive(Debug, Deserialize)]
struct Userinfo {
    email: String,
    #[serde(default)]
    name: Option<String>,
}

/// Generate a cryptographically secure random string.
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            // SAFETY: idx is always within bounds since random_range returns 0..CHARSET.len()
            char::from(*CHARSET.get(idx).expect("idx within bounds"))
        })
        .collect()
}

/// Initiate federated sign-in.
///
/// Generates a state parameter, stores it in the session, and redirects to
/// the identity provider's authorization page.
///
/// # Route
///
/// `GET /auth/federated/login`
pub async fn login(State(state): State<AppState>, session: Session) -> Response {
    let Some(oauth) = state.config().oauth.as_ref() else {
        return Redirect::to("/auth/login?error=federated_disabled").into_response();
    };

    let oauth_state = generate_random_string(32);

    if let Err(e) = session
        .insert(session_keys::OAUTH_STATE, &oauth_state)
        .await
    {
        tracing::error!("Failed to store OAuth state in session: {e}");
        return Redirect::to("/auth/login?error=session").into_response();
    }

    let redirect_uri = callback_uri(&state);
    let auth_url = format!(
        "{}?response_type=code&client_id={}&redirect_uri={}&scope=openid%20email%20profile&state={}",
        oauth.auth_url,
        urlencoding::encode(&oauth.client_id),
        urlencoding::encode(&redirect_uri),
        urlencoding::encode(&oauth_state),
    );

    Redirect::to(&auth_url).into_response()
}

/// Handle the OAuth callback.
///
/// Validates the state parameter, exchanges the authorization code, fetches
/// the identity, and signs the matching account in (creating it with the
/// initial credit grant on first contact).
///
/// # Route
///
/// `GET /auth/federated/callback`
pub async fn callback(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let Some(oauth) = state.config().oauth.as_ref() else {
        return Redirect::to("/auth/login?error=federated_disabled").into_response();
    };

    // Check for OAuth errors from the provider
    if let Some(error) = query.error {
        let description = query.error_description.unwrap_or_default();
        tracing::warn!("OAuth error: {error} - {description}");
        return Redirect::to("/auth/login?error=federated_denied").into_response();
    }

    let Some(code) = query.code else {
        tracing::warn!("OAuth callback missing code");
        return Redirect::to("/auth/login?error=missing_code").into_response();
    };

    // Verify state parameter (CSRF protection)
    let Some(returned_state) = query.state else {
        tracing::warn!("OAuth callback missing state");
        return Redirect::to("/auth/login?error=missing_state").into_response();
    };

    let stored_state: Option<String> = session
        .get(session_keys::OAUTH_STATE)
        .await
        .ok()
        .flatten();

    if stored_state.as_ref() != Some(&returned_state) {
        tracing::warn!("OAuth state mismatch");
        return Redirect::to("/auth/login?error=invalid_state").into_response();
    }

    // Clear the stored state (one-time use)
    let _ = session.remove::<String>(session_keys::OAUTH_STATE).await;

    // Exchange the code and fetch the identity
    let userinfo = match fetch_identity(oauth, &code, &callback_uri(&state)).await {
        Ok(info) => info,
        Err(e) => {
            tracing::error!("Federated identity fetch failed: {e}");
            return Redirect::to("/auth/login?error=token_exchange").into_response();
        }
    };

    let Ok(email) = Email::parse(&userinfo.email) else {
        tracing::warn!("Identity provider returned an invalid email");
        return Redirect::to("/auth/login?error=invalid_identity").into_response();
    };

    // Find or create the account; every entry path gets the same grant
    let repo = AccountRepository::new(state.pool());
    let display_name = userinfo
        .name
        .as_deref()
        .map_or_else(|| email.local_part().to_owned(), str::to_owned);

    let account = match repo.find_or_create_federated(&email, &display_name).await {
        Ok(account) => account,
        Err(e) => {
            tracing::error!("Failed to find or create federated account: {e}");
            return Redirect::to("/auth/login?error=failed").into_response();
        }
    };

    let user = CurrentUser {
        id: account.id,
        email: account.email.clone(),
    };

    if let Err(e) = set_current_user(&session, &user).await {
        tracing::error!("Failed to set session: {e}");
        return Redirect::to("/auth/login?error=session").into_response();
    }

    set_sentry_user(&account.id, Some(account.email.as_str()));
    tracing::info!(account_id = %account.id, "federated sign-in completed");

    Redirect::to("/account").into_response()
}

/// Build the callback URI (must match between authorization and exchange).
fn callback_uri(state: &AppState) -> String {
    format!("{}/auth/federated/callback", state.config().base_url)
}

/// Exchange the authorization code and fetch the identity.
async fn fetch_identity(
    oauth: &OAuthConfig,
    code: &str,
    redirect_uri: &str,
) -> Result<Userinfo, reqwest::Error> {
    let client = reqwest::Client::new();

    let token: TokenResponse = client
        .post(&oauth.token_url)
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", &oauth.client_id),
            ("client_secret", oauth.client_secret.expose_secret()),
        ])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    client
        .get(&oauth.userinfo_url)
        .bearer_auth(&token.access_token)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_random_string_length_and_charset() {
        let s = generate_random_string(32);
        assert_eq!(s.len(), 32);
        assert!(s.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generated_states_differ() {
        assert_ne!(generate_random_string(32), generate_random_string(32));
    }
}
