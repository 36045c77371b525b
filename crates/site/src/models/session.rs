//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use promptforge_core::{AccountId, Email};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the signed-in user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Account's database ID.
    pub id: AccountId,
    /// Account's email address.
    pub email: Email,
}

/// Session keys for authentication and preference data.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the last-selected enhancement tier.
    pub const PREFERRED_TIER: &str = "preferred_tier";

    /// Key for OAuth state (CSRF protection).
    pub const OAUTH_STATE: &str = "oauth_state";
}
