//! Live account-state tracking.
//!
//! Two pieces carry live account state over explicit channels instead of
//! ambient globals:
//!
//! - [`AccountFeed`]: process-wide registry of `watch` channels, one per
//!   account. Repositories publish a fresh snapshot after every mutation;
//!   subscribers (the SSE stream on the account page) observe it without
//!   polling.
//! - [`SessionTracker`]: an owned composition of the current identity and the
//!   matching feed subscription. Replacing the identity resubscribes; dropping
//!   the tracker releases everything.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use promptforge_core::AccountId;

use crate::models::{Account, CurrentUser};

/// Registry of per-account watch channels.
///
/// Cheaply cloneable; all clones share one registry. Senders for accounts
/// with no remaining subscribers are pruned on the next publish.
#[derive(Clone, Default)]
pub struct AccountFeed {
    inner: Arc<Mutex<HashMap<AccountId, watch::Sender<Option<Account>>>>>,
}

impl AccountFeed {
    /// Create an empty feed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to updates for one account.
    ///
    /// The receiver is seeded with `None` until the first publish; callers
    /// that need an immediate snapshot read the repository first.
    #[must_use]
    pub fn subscribe(&self, id: AccountId) -> watch::Receiver<Option<Account>> {
        let mut channels = self.lock();

        if let Some(tx) = channels.get(&id)
            && !tx.is_closed()
        {
            return tx.subscribe();
        }

        let (tx, rx) = watch::channel(None);
        channels.insert(id, tx);
        rx
    }

    /// Publish a fresh snapshot to this account's subscribers.
    ///
    /// A no-op when nobody is subscribed; closed channels are pruned.
    pub fn publish(&self, account: &Account) {
        let mut channels = self.lock();

        if let Some(tx) = channels.get(&account.id) {
            if tx.send(Some(account.clone())).is_err() {
                channels.remove(&account.id);
            }
        }
    }

    /// Number of accounts with a live channel (diagnostics).
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no account has a live channel.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<AccountId, watch::Sender<Option<Account>>>> {
        // A poisoned registry only means a panic mid-publish; the map itself
        // stays usable.
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Owned view over the current identity and its live account record.
///
/// Lifecycle: `sign_in` replaces the identity and resubscribes to the new
/// account's feed; `sign_out` clears both; dropping the tracker releases the
/// subscription.
pub struct SessionTracker {
    feed: AccountFeed,
    identity: Option<CurrentUser>,
    account_rx: Option<watch::Receiver<Option<Account>>>,
}

impl SessionTracker {
    /// Create a tracker with no identity.
    #[must_use]
    pub const fn new(feed: AccountFeed) -> Self {
        Self {
            feed,
            identity: None,
            account_rx: None,
        }
    }

    /// Replace the current identity and resubscribe to its account feed.
    pub fn sign_in(&mut self, user: CurrentUser) {
        self.account_rx = Some(self.feed.subscribe(user.id));
        self.identity = Some(user);
    }

    /// Clear the identity and release the account subscription.
    pub fn sign_out(&mut self) {
        self.identity = None;
        self.account_rx = None;
    }

    /// The current identity, if any.
    #[must_use]
    pub const fn identity(&self) -> Option<&CurrentUser> {
        self.identity.as_ref()
    }

    /// Read-only, eventually-consistent view of identity and account record.
    #[must_use]
    pub fn snapshot(&self) -> (Option<CurrentUser>, Option<Account>) {
        let account = self
            .account_rx
            .as_ref()
            .and_then(|rx| rx.borrow().clone());
        (self.identity.clone(), account)
    }

    /// Consume the tracker, yielding the raw account subscription.
    ///
    /// Used to hand the channel to a stream adapter; `None` while no
    /// identity is set.
    #[must_use]
    pub fn into_subscription(self) -> Option<watch::Receiver<Option<Account>>> {
        self.account_rx
    }

    /// Wait for the next account update.
    ///
    /// Resolves with the new snapshot, or `None` if the feed side was
    /// dropped. Pends forever while no identity is set, so callers can
    /// `select!` against it safely.
    pub async fn changed(&mut self) -> Option<Account> {
        match self.account_rx.as_mut() {
            Some(rx) => {
                rx.changed().await.ok()?;
                rx.borrow_and_update().clone()
            }
            None => std::future::pending().await,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use chrono::Utc;
    use promptforge_core::{Credits, Email};

    fn account(id: i32, credits: i32) -> Account {
        Account {
            id: AccountId::new(id),
            email: Email::parse("user@example.com").unwrap(),
            display_name: "user".to_string(),
            requests_remaining: Credits::new(credits),
            is_pro: false,
            subscription: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn user(id: i32) -> CurrentUser {
        CurrentUser {
            id: AccountId::new(id),
            email: Email::parse("user@example.com").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_subscriber_sees_published_snapshot() {
        let feed = AccountFeed::new();
        let mut rx = feed.subscribe(AccountId::new(1));
        assert!(rx.borrow().is_none());

        feed.publish(&account(1, 9));

        rx.changed().await.unwrap();
        let snapshot = rx.borrow().clone().unwrap();
        assert_eq!(snapshot.requests_remaining, Credits::new(9));
    }

    #[tokio::test]
    async fn test_publish_to_other_account_not_delivered() {
        let feed = AccountFeed::new();
        let rx = feed.subscribe(AccountId::new(1));

        feed.publish(&account(2, 5));

        assert!(rx.borrow().is_none());
    }

    #[tokio::test]
    async fn test_tracker_resubscribes_on_identity_change() {
        let feed = AccountFeed::new();
        let mut tracker = SessionTracker::new(feed.clone());

        tracker.sign_in(user(1));
        feed.publish(&account(1, 8));
        assert_eq!(
            tracker.changed().await.unwrap().requests_remaining,
            Credits::new(8)
        );

        // New identity: old account's updates no longer arrive.
        tracker.sign_in(user(2));
        feed.publish(&account(1, 7));
        feed.publish(&account(2, 3));
        assert_eq!(
            tracker.changed().await.unwrap().requests_remaining,
            Credits::new(3)
        );
    }

    #[tokio::test]
    async fn test_sign_out_clears_view() {
        let feed = AccountFeed::new();
        let mut tracker = SessionTracker::new(feed.clone());

        tracker.sign_in(user(1));
        feed.publish(&account(1, 8));
        tracker.sign_out();

        let (identity, record) = tracker.snapshot();
        assert!(identity.is_none());
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn test_closed_channels_pruned_on_publish() {
        let feed = AccountFeed::new();
        drop(feed.subscribe(AccountId::new(1)));

        feed.publish(&account(1, 5));
        assert!(feed.is_empty());
    }
}
