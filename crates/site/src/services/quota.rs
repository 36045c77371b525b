//! Quota ledger.
//!
//! Gatekeeping for the free-tier request allowance. The decrement is a
//! single conditional UPDATE in the repository, so concurrent requests from
//! the same account can never push the counter below zero or consume more
//! credits than were granted.

use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, instrument};

use crate::db::{AccountRepository, RepositoryError};
use crate::models::{Account, CurrentUser};
use crate::services::session_tracker::AccountFeed;

/// Errors from quota checks.
#[derive(Debug, Error)]
pub enum QuotaError {
    /// Free-plan account with zero remaining requests.
    #[error("trial requests exhausted - please upgrade to pro")]
    Exhausted,

    /// Database failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Ledger over the per-account request allowance.
pub struct QuotaLedger<'a> {
    repo: AccountRepository<'a>,
    feed: &'a AccountFeed,
}

impl<'a> QuotaLedger<'a> {
    /// Create a ledger over the given pool and feed.
    #[must_use]
    pub const fn new(pool: &'a PgPool, feed: &'a AccountFeed) -> Self {
        Self {
            repo: AccountRepository::new(pool),
            feed,
        }
    }

    /// Fetch the account record, creating it with the initial grant if this
    /// identity has never touched the ledger (first federated sign-in).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the lookup or creation fails.
    pub async fn ensure_initialized(
        &self,
        user: &CurrentUser,
    ) -> Result<Account, RepositoryError> {
        if let Some(account) = self.repo.get_by_id(user.id).await? {
            return Ok(account);
        }
        self.repo
            .find_or_create_federated(&user.email, user.email.local_part())
            .await
    }

    /// Check the allowance and consume one credit.
    ///
    /// Pro accounts pass through untouched. Free accounts consume one credit
    /// atomically; the refreshed record is published to the account feed so
    /// open sessions see the new count. The credit is spent before the
    /// enhancement call is dispatched, so a failed call still costs one.
    ///
    /// # Errors
    ///
    /// Returns `QuotaError::Exhausted` when a free account has no credits
    /// left, or `QuotaError::Repository` on database failure.
    #[instrument(skip(self, user), fields(account_id = %user.id))]
    pub async fn check_and_consume(&self, user: &CurrentUser) -> Result<Account, QuotaError> {
        let account = self.ensure_initialized(user).await?;

        if account.is_pro {
            return Ok(account);
        }

        match self.repo.try_consume_credit(user.id).await? {
            Some(updated) => {
                info!(
                    remaining = updated.requests_remaining.as_i32(),
                    "consumed one trial credit"
                );
                self.feed.publish(&updated);
                Ok(updated)
            }
            // No row matched: not pro (checked above), so the counter is zero.
            None => Err(QuotaError::Exhausted),
        }
    }
}
