//! Account domain types.
//!
//! These types represent validated domain objects separate from database row
//! types. `Account` is the long-lived entity everything else derives from.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use promptforge_core::{AccountId, BillingCycle, Credits, Email, SubscriptionStatus};

/// A site account (domain type).
///
/// Holds the quota counter, the pro flag, and the optional subscription.
/// Serialized snapshots of this type are streamed to the account page over
/// SSE, so it derives `Serialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique account ID.
    pub id: AccountId,
    /// Account email address.
    pub email: Email,
    /// Display name shown in the navbar.
    pub display_name: String,
    /// Remaining free-trial enhancement requests.
    pub requests_remaining: Credits,
    /// Whether the account is on the unlimited pro plan.
    pub is_pro: bool,
    /// Active subscription, present once the account has upgraded.
    pub subscription: Option<Subscription>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Whether a pro-tier request would be rejected for this account.
    #[must_use]
    pub const fn quota_exhausted(&self) -> bool {
        !self.is_pro && self.requests_remaining.is_exhausted()
    }
}

/// Subscription metadata attached to an upgraded account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// Plan identifier (currently always `pro`).
    pub plan: String,
    /// Lifecycle state.
    pub status: SubscriptionStatus,
    /// Billing interval.
    pub billing_cycle: BillingCycle,
    /// Amount charged per cycle.
    pub amount: Decimal,
    /// ISO currency code.
    pub currency: String,
    /// Next renewal date.
    pub renewal_date: DateTime<Utc>,
    /// Whether the subscription ends at the current period instead of renewing.
    pub cancel_at_period_end: bool,
}

/// Card details submitted through the payment form.
///
/// WARNING: this prototype persists these fields verbatim, including the CVC.
/// That is unsafe for any real deployment; a real payment flow must tokenize
/// through a processor. `Debug` is implemented manually so the number and CVC
/// never reach logs.
#[derive(Clone)]
pub struct CardDetails {
    /// Card number, digits only.
    pub number: String,
    /// Name printed on the card.
    pub holder_name: String,
    /// Two-digit expiry month.
    pub expiry_month: String,
    /// Two-digit expiry year.
    pub expiry_year: String,
    /// Three-digit security code.
    pub cvc: String,
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("number", &"[REDACTED]")
            .field("holder_name", &self.holder_name)
            .field("expiry_month", &self.expiry_month)
            .field("expiry_year", &self.expiry_year)
            .field("cvc", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(credits: i32, is_pro: bool) -> Account {
        Account {
            id: AccountId::new(1),
            email: Email::parse("user@example.com").expect("valid email"),
            display_name: "user".to_string(),
            requests_remaining: Credits::new(credits),
            is_pro,
            subscription: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_quota_exhausted_only_when_free_and_zero() {
        assert!(account(0, false).quota_exhausted());
        assert!(!account(3, false).quota_exhausted());
        assert!(!account(0, true).quota_exhausted());
    }

    #[test]
    fn test_card_debug_redacts_sensitive_fields() {
        let card = CardDetails {
            number: "4242424242424242".to_string(),
            holder_name: "Ada Lovelace".to_string(),
            expiry_month: "04".to_string(),
            expiry_year: "30".to_string(),
            cvc: "123".to_string(),
        };

        let debug = format!("{card:?}");
        assert!(!debug.contains("4242424242424242"));
        assert!(!debug.contains("123"));
        assert!(debug.contains("Ada Lovelace"));
        assert!(debug.contains("[REDACTED]"));
    }
}
