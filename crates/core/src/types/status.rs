//! Tier and subscription status enums.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Enhancement tier selected for a request.
///
/// Selects which remote endpoint and quota rules apply. Also persisted as the
/// visitor's last-selected preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Pro,
}

impl Tier {
    /// Stable string form used in forms and session storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
        }
    }

    /// Whether this is the free tier.
    #[must_use]
    pub const fn is_free(&self) -> bool {
        matches!(self, Self::Free)
    }

    /// Whether this is the pro tier.
    #[must_use]
    pub const fn is_pro(&self) -> bool {
        matches!(self, Self::Pro)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error parsing a [`Tier`] from a string.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown tier: {0}")]
pub struct TierParseError(pub String);

impl std::str::FromStr for Tier {
    type Err = TierParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            other => Err(TierParseError(other.to_owned())),
        }
    }
}

/// Lifecycle state of a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Canceled,
    Expired,
}

impl SubscriptionStatus {
    /// Stable string form stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Canceled => "canceled",
            Self::Expired => "expired",
        }
    }

    /// Parse from the stored string form, defaulting unknown values to
    /// `Expired` so a corrupt row never grants access.
    #[must_use]
    pub fn from_db(s: &str) -> Self {
        match s {
            "active" => Self::Active,
            "canceled" => Self::Canceled,
            _ => Self::Expired,
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Billing interval for a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    #[default]
    Monthly,
    Yearly,
}

impl BillingCycle {
    /// Stable string form stored in the database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Parse from the stored string form.
    #[must_use]
    pub fn from_db(s: &str) -> Self {
        match s {
            "yearly" => Self::Yearly,
            _ => Self::Monthly,
        }
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_round_trip() {
        assert_eq!("free".parse::<Tier>().unwrap(), Tier::Free);
        assert_eq!("pro".parse::<Tier>().unwrap(), Tier::Pro);
        assert!("enterprise".parse::<Tier>().is_err());
    }

    #[test]
    fn test_tier_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Tier::Pro).unwrap(), "\"pro\"");
    }

    #[test]
    fn test_subscription_status_from_db_unknown() {
        assert_eq!(
            SubscriptionStatus::from_db("garbage"),
            SubscriptionStatus::Expired
        );
    }

    #[test]
    fn test_billing_cycle_from_db() {
        assert_eq!(BillingCycle::from_db("yearly"), BillingCycle::Yearly);
        assert_eq!(BillingCycle::from_db("monthly"), BillingCycle::Monthly);
    }
}
