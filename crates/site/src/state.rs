//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::SiteConfig;
use crate::content::ContentStore;
use crate::enhance::EnhanceClient;
use crate::services::AccountFeed;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds the configuration, database pool,
/// enhancement client, account feed, and the loaded marketing content.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    pool: PgPool,
    enhance: EnhanceClient,
    feed: AccountFeed,
    content: ContentStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the enhancement client cannot be built.
    pub fn new(
        config: SiteConfig,
        pool: PgPool,
        content: ContentStore,
    ) -> Result<Self, reqwest::Error> {
        let enhance = EnhanceClient::new(&config.enhance)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                enhance,
                feed: AccountFeed::new(),
                content,
            }),
        })
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the enhancement client.
    #[must_use]
    pub fn enhance(&self) -> &EnhanceClient {
        &self.inner.enhance
    }

    /// Get a reference to the account update feed.
    #[must_use]
    pub fn feed(&self) -> &AccountFeed {
        &self.inner.feed
    }

    /// Get a reference to the loaded marketing content.
    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }
}
