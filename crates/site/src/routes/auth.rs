//! Authentication route handlers.
//!
//! Email/password login and registration backed by the auth service.
//! Registration signs the user in directly; there is no activation step.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub display_name: String,
    /// Where to land after a successful registration (`pro` returns to the
    /// enhancer with the pro tier selected).
    pub redirect: Option<String>,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error/success display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Query parameters carried into the registration page.
#[derive(Debug, Deserialize)]
pub struct RegisterQuery {
    pub error: Option<String>,
    pub redirect: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
    pub federated_enabled: bool,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
    pub redirect: Option<String>,
    pub federated_enabled: bool,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    LoginTemplate {
        error: query.error,
        success: query.success,
        federated_enabled: state.config().oauth.is_some(),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let service = AuthService::new(state.pool());
    let password = SecretString::from(form.password);

    match service.login(&form.email, &password).await {
        Ok(account) => {
            let user = CurrentUser {
                id: account.id,
                email: account.email.clone(),
            };

            if let Err(e) = set_current_user(&session, &user).await {
                tracing::error!("Failed to set session: {e}");
                return Redirect::to("/auth/login?error=session").into_response();
            }

            set_sentry_user(&account.id, Some(account.email.as_str()));
            Redirect::to("/account").into_response()
        }
        Err(AuthError::InvalidCredentials | AuthError::InvalidEmail(_)) => {
            Redirect::to("/auth/login?error=credentials").into_response()
        }
        Err(e) => {
            tracing::error!("Login failed: {e}");
            Redirect::to("/auth/login?error=failed").into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(
    State(state): State<AppState>,
    Query(query): Query<RegisterQuery>,
) -> impl IntoResponse {
    RegisterTemplate {
        error: query.error,
        redirect: query.redirect,
        federated_enabled: state.config().oauth.is_some(),
    }
}

/// Handle registration form submission.
///
/// New accounts start on the free plan with the initial credit grant and are
/// signed in immediately.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    let retry_target = |error: &str| {
        let mut url = format!("/auth/register?error={error}");
        if let Some(redirect) = &form.redirect {
            url.push_str("&redirect=");
            url.push_str(&urlencoding::encode(redirect));
        }
        url
    };

    if form.password != form.password_confirm {
        return Redirect::to(&retry_target("password_mismatch")).into_response();
    }

    let service = AuthService::new(state.pool());
    let password = SecretString::from(form.password);

    match service
        .register(&form.email, &form.display_name, &password)
        .await
    {
        Ok(account) => {
            let user = CurrentUser {
                id: account.id,
                email: account.email.clone(),
            };

            if let Err(e) = set_current_user(&session, &user).await {
                tracing::error!("Failed to set session: {e}");
                return Redirect::to("/auth/login?error=session").into_response();
            }

            set_sentry_user(&account.id, Some(account.email.as_str()));

            // Registrations triggered by a pro enhancement attempt return to
            // the enhancer instead of the account page.
            let destination = match form.redirect.as_deref() {
                Some("pro") => "/",
                _ => "/account",
            };
            Redirect::to(destination).into_response()
        }
        Err(AuthError::EmailTaken) => Redirect::to(&retry_target("email_taken")).into_response(),
        Err(AuthError::WeakPassword { .. }) => {
            Redirect::to(&retry_target("password_too_short")).into_response()
        }
        Err(AuthError::InvalidEmail(_)) => {
            Redirect::to(&retry_target("invalid_email")).into_response()
        }
        Err(e) => {
            tracing::error!("Registration failed: {e}");
            Redirect::to(&retry_target("failed")).into_response()
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Handle logout: flush the session and clear the error-tracking user.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = clear_current_user(&session).await {
        tracing::warn!("Failed to clear session user: {e}");
    }
    if let Err(e) = session.flush().await {
        tracing::warn!("Failed to flush session: {e}");
    }

    clear_sentry_user();
    Redirect::to("/").into_response()
}
