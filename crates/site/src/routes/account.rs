//! Account route handlers.
//!
//! Overview page, subscription management, and the live account stream that
//! keeps the quota counter and plan badge current without a refresh.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    response::{IntoResponse, Redirect, Response},
};
use tokio_stream::{Stream, StreamExt, wrappers::WatchStream};
use tracing::instrument;

use crate::db::AccountRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::Account;
use crate::services::{QuotaLedger, SessionTracker};
use crate::state::AppState;

/// Account overview template.
#[derive(Template, WebTemplate)]
#[template(path = "account/index.html")]
pub struct AccountTemplate {
    pub account: Account,
}

/// Display the account overview.
///
/// # Route
///
/// `GET /account`
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<AccountTemplate> {
    let ledger = QuotaLedger::new(state.pool(), state.feed());
    let account = ledger.ensure_initialized(&user).await?;

    Ok(AccountTemplate { account })
}

/// Stream live account snapshots as Server-Sent Events.
///
/// Opens with the current record, then pushes a new `account` event on every
/// change (credit consumed, plan upgraded, subscription toggled).
///
/// # Route
///
/// `GET /account/live`
#[instrument(skip_all)]
pub async fn live(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, axum::Error>>>> {
    let ledger = QuotaLedger::new(state.pool(), state.feed());
    let account = ledger.ensure_initialized(&user).await?;

    // Subscribe first, then seed: the stream's first poll sees the snapshot.
    let mut tracker = SessionTracker::new(state.feed().clone());
    tracker.sign_in(user);
    state.feed().publish(&account);

    let rx = tracker
        .into_subscription()
        .ok_or_else(|| AppError::Internal("account subscription missing".to_string()))?;

    let stream = WatchStream::new(rx)
        .filter_map(|snapshot| snapshot.map(|account| Event::default().event("account").json_data(&account)));

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Flag the subscription for cancellation at period end.
///
/// # Route
///
/// `POST /account/subscription/cancel`
#[instrument(skip_all)]
pub async fn cancel_subscription(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    set_cancel_flag(&state, user.id, true).await?;
    Ok(Redirect::to("/account").into_response())
}

/// Undo a pending cancellation.
///
/// # Route
///
/// `POST /account/subscription/reactivate`
#[instrument(skip_all)]
pub async fn reactivate_subscription(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Response> {
    set_cancel_flag(&state, user.id, false).await?;
    Ok(Redirect::to("/account").into_response())
}

/// Toggle cancel-at-period-end and push the refreshed record to the feed.
async fn set_cancel_flag(
    state: &AppState,
    id: promptforge_core::AccountId,
    cancel: bool,
) -> Result<()> {
    let repo = AccountRepository::new(state.pool());
    let account = repo.set_cancel_at_period_end(id, cancel).await?;
    state.feed().publish(&account);
    Ok(())
}
