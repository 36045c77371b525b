//! Enhancement orchestrator.
//!
//! Single entry point for "enhance this prompt": validates input, gates the
//! pro tier behind a signed-in identity, settles quota, then dispatches to
//! the matching remote endpoint. Route handlers never talk to the client or
//! the ledger directly.

use sqlx::PgPool;
use thiserror::Error;
use tracing::instrument;

use promptforge_core::Tier;

use crate::db::RepositoryError;
use crate::enhance::{EnhanceClient, EnhanceError};
use crate::models::CurrentUser;
use crate::services::quota::{QuotaError, QuotaLedger};
use crate::services::session_tracker::AccountFeed;

/// Errors from an orchestrated enhancement.
///
/// `Enhance` variants carry user-facing messages; `Repository` is an
/// internal fault the handler maps to a 500.
#[derive(Debug, Error)]
pub enum EnhancerError {
    #[error(transparent)]
    Enhance(#[from] EnhanceError),

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<QuotaError> for EnhancerError {
    fn from(e: QuotaError) -> Self {
        match e {
            QuotaError::Exhausted => Self::Enhance(EnhanceError::QuotaExhausted),
            QuotaError::Repository(e) => Self::Repository(e),
        }
    }
}

/// Orchestrates validation, gating, quota, and dispatch for one request.
pub struct Enhancer<'a> {
    client: &'a EnhanceClient,
    pool: &'a PgPool,
    feed: &'a AccountFeed,
}

impl<'a> Enhancer<'a> {
    /// Create an orchestrator over the shared client, pool, and feed.
    #[must_use]
    pub const fn new(client: &'a EnhanceClient, pool: &'a PgPool, feed: &'a AccountFeed) -> Self {
        Self { client, pool, feed }
    }

    /// Enhance a prompt on the selected tier.
    ///
    /// Free tier needs no identity and no quota. Pro tier requires a
    /// signed-in user and an available credit (pro subscribers bypass the
    /// counter); the credit is settled before dispatch.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty prompt
    /// - `AuthRequired` for the pro tier with no identity
    /// - `QuotaExhausted` for a free-plan account out of credits
    /// - the client's `Timeout`/`Remote`/`Transport` faults
    /// - `Repository` on database failure
    #[instrument(skip_all, fields(tier = %tier))]
    pub async fn enhance(
        &self,
        prompt: &str,
        tier: Tier,
        user: Option<&CurrentUser>,
    ) -> Result<String, EnhancerError> {
        if prompt.trim().is_empty() {
            return Err(EnhanceError::InvalidInput.into());
        }

        match tier {
            Tier::Free => Ok(self.client.enhance_free(prompt).await?),
            Tier::Pro => {
                let user = user.ok_or(EnhanceError::AuthRequired)?;
                let ledger = QuotaLedger::new(self.pool, self.feed);
                ledger.check_and_consume(user).await?;
                Ok(self.client.enhance_pro(prompt).await?)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::time::Duration;

    use sqlx::postgres::PgPoolOptions;

    use crate::config::EnhanceConfig;

    /// Pool that never connects; these tests must fail before any I/O.
    fn lazy_pool() -> PgPool {
        PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap()
    }

    fn client() -> EnhanceClient {
        // Port 9 (discard) is never contacted.
        EnhanceClient::new(&EnhanceConfig {
            free_base: "http://127.0.0.1:9".to_owned(),
            pro_base: "http://127.0.0.1:9".to_owned(),
            timeout: Duration::from_secs(1),
        })
        .unwrap()
    }

    #[test]
    fn test_quota_error_maps_to_user_facing_variant() {
        let err = EnhancerError::from(QuotaError::Exhausted);
        assert!(matches!(
            err,
            EnhancerError::Enhance(EnhanceError::QuotaExhausted)
        ));
    }

    #[tokio::test]
    async fn test_pro_without_identity_rejected_before_dispatch() {
        let pool = lazy_pool();
        let feed = AccountFeed::new();
        let client = client();
        let enhancer = Enhancer::new(&client, &pool, &feed);

        let err = enhancer.enhance("improve this", Tier::Pro, None).await;
        assert!(matches!(
            err,
            Err(EnhancerError::Enhance(EnhanceError::AuthRequired))
        ));
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected_for_both_tiers() {
        let pool = lazy_pool();
        let feed = AccountFeed::new();
        let client = client();
        let enhancer = Enhancer::new(&client, &pool, &feed);

        assert!(matches!(
            enhancer.enhance("  \n", Tier::Free, None).await,
            Err(EnhancerError::Enhance(EnhanceError::InvalidInput))
        ));
        assert!(matches!(
            enhancer.enhance("", Tier::Pro, None).await,
            Err(EnhancerError::Enhance(EnhanceError::InvalidInput))
        ));
    }
}
