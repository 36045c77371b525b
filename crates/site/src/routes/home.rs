//! Home page route handler.
//!
//! Hosts the enhancer form, the tier selector, and the result panel. The
//! last tier selection is persisted in the session as the single local
//! preference.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use promptforge_core::Tier;

use crate::db::AccountRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalAuth;
use crate::models::{Account, CurrentUser, session_keys};
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Signed-in identity, if any.
    pub user: Option<CurrentUser>,
    /// Account record for the signed-in identity.
    pub account: Option<Account>,
    /// Currently selected tier.
    pub tier: Tier,
    /// Prompt text to re-fill the form with.
    pub prompt: String,
    /// Enhancement result, if one was produced.
    pub result: Option<String>,
    /// Error banner text. A failure never clobbers a previous result; both
    /// can be set at once.
    pub error: Option<String>,
    /// Whether the federated sign-in button is shown.
    pub federated_enabled: bool,
}

/// Read the persisted tier preference, defaulting to free.
pub async fn preferred_tier(session: &Session) -> Tier {
    session
        .get::<Tier>(session_keys::PREFERRED_TIER)
        .await
        .ok()
        .flatten()
        .unwrap_or(Tier::Free)
}

/// Load the account record for the signed-in identity, if any.
pub async fn load_account(
    state: &AppState,
    user: Option<&CurrentUser>,
) -> Result<Option<Account>> {
    match user {
        Some(user) => {
            let repo = AccountRepository::new(state.pool());
            Ok(repo.get_by_id(user.id).await?)
        }
        None => Ok(None),
    }
}

/// Display the home page.
#[instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
) -> Result<HomeTemplate> {
    let tier = preferred_tier(&session).await;
    let account = load_account(&state, user.as_ref()).await?;

    Ok(HomeTemplate {
        user,
        account,
        tier,
        prompt: String::new(),
        result: None,
        error: None,
        federated_enabled: state.config().oauth.is_some(),
    })
}
