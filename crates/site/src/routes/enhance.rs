//! Enhancement route handlers.
//!
//! `POST /enhance` drives the orchestrator from the home-page form. The
//! `/api/enhance/*` handlers are self-contained JSON demo endpoints that
//! model the hosted enhancement services without calling out anywhere.

use std::time::Duration;

use axum::{
    Form, Json,
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::json;
use tower_sessions::Session;
use tracing::instrument;

use promptforge_core::Tier;

use crate::error::AppError;
use crate::middleware::OptionalAuth;
use crate::models::session_keys;
use crate::routes::home::{self, HomeTemplate};
use crate::services::{Enhancer, EnhancerError};
use crate::state::AppState;

/// Enhancement form data.
#[derive(Debug, Deserialize)]
pub struct EnhanceForm {
    pub prompt: String,
    pub tier: Tier,
    /// Result from the previous render, carried in a hidden field so a
    /// failed attempt does not clobber it.
    #[serde(default)]
    pub prev_result: String,
}

/// Handle the enhancer form submission.
///
/// Persists the tier selection, runs the orchestrator, and re-renders the
/// home page with the result or an error banner. An unauthenticated pro
/// request redirects to sign-up instead of erroring.
#[instrument(skip_all, fields(tier = %form.tier))]
pub async fn enhance(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<EnhanceForm>,
) -> Result<Response, AppError> {
    if let Err(e) = session.insert(session_keys::PREFERRED_TIER, form.tier).await {
        tracing::warn!("Failed to persist tier preference: {e}");
    }

    let enhancer = Enhancer::new(state.enhance(), state.pool(), state.feed());
    let outcome = enhancer
        .enhance(&form.prompt, form.tier, user.as_ref())
        .await;

    let (result, error) = match outcome {
        Ok(text) => (Some(text), None),
        Err(EnhancerError::Enhance(crate::enhance::EnhanceError::AuthRequired)) => {
            return Ok(Redirect::to("/auth/register?redirect=pro").into_response());
        }
        Err(EnhancerError::Enhance(e)) => {
            let prior = (!form.prev_result.is_empty()).then(|| form.prev_result.clone());
            (prior, Some(e.to_string()))
        }
        Err(EnhancerError::Repository(e)) => return Err(AppError::Database(e)),
    };

    let account = home::load_account(&state, user.as_ref()).await?;

    Ok(HomeTemplate {
        user,
        account,
        tier: form.tier,
        prompt: form.prompt,
        result,
        error,
        federated_enabled: state.config().oauth.is_some(),
    }
    .into_response())
}

// =============================================================================
// Demo API Handlers
// =============================================================================

/// Simulated processing time for the free demo handler.
const DEMO_FREE_DELAY: Duration = Duration::from_millis(800);

/// Simulated processing time for the pro demo handler.
const DEMO_PRO_DELAY: Duration = Duration::from_millis(500);

/// Fixed checklist appended by the free demo handler.
const FREE_CHECKLIST: &str =
    "\n\nPlease provide:\n- Detailed descriptions\n- Specific requirements\n- Expected outcomes";

/// Fixed multi-section template appended by the pro demo handler.
const PRO_TEMPLATE: &str = "Enhanced with the pro model:\n\
    1. Context Optimization:\n   \
    - Added environmental context\n   \
    - Enhanced situational relevance\n\
    2. Structural Improvements:\n   \
    - Optimized for clarity and impact\n   \
    - Added specific action items\n\
    3. Advanced Parameters:\n   \
    - Included behavioral constraints\n   \
    - Added quality metrics\n\
    4. Custom Instructions:\n   \
    - Incorporated user preferences\n   \
    - Added domain-specific guidelines";

/// Demo request body.
#[derive(Debug, Deserialize)]
pub struct DemoRequest {
    #[serde(default)]
    pub prompt: String,
}

/// Free-tier demo handler.
///
/// Capitalizes the first letter of each word and appends the checklist.
#[instrument(skip_all)]
pub async fn demo_free(Json(body): Json<DemoRequest>) -> Response {
    let prompt = body.prompt.trim();
    if prompt.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Prompt is required");
    }

    tokio::time::sleep(DEMO_FREE_DELAY).await;

    let enhanced = format!("{}{FREE_CHECKLIST}", capitalize_words(prompt));
    Json(json!({ "result": enhanced })).into_response()
}

/// Pro-tier demo handler.
///
/// Requires a Bearer credential (any value) and appends the multi-section
/// template.
#[instrument(skip_all)]
pub async fn demo_pro(headers: HeaderMap, Json(body): Json<DemoRequest>) -> Response {
    let prompt = body.prompt.trim();
    if prompt.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Prompt is required");
    }

    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer "));
    if !authorized {
        return error_response(StatusCode::UNAUTHORIZED, "Authentication required");
    }

    tokio::time::sleep(DEMO_PRO_DELAY).await;

    let enhanced = format!("{prompt}\n\n{PRO_TEMPLATE}");
    Json(json!({ "result": enhanced })).into_response()
}

/// Build a JSON error response.
fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Capitalize the first letter of each whitespace-separated word.
fn capitalize_words(text: &str) -> String {
    text.split_inclusive(char::is_whitespace)
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capitalize_words() {
        assert_eq!(capitalize_words("hello world"), "Hello World");
        assert_eq!(capitalize_words("a"), "A");
        assert_eq!(capitalize_words("multi  spaced"), "Multi  Spaced");
        assert_eq!(capitalize_words("line\nbreak"), "Line\nBreak");
    }
}
