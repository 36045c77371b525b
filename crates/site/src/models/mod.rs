//! Domain and session types for the site.

pub mod account;
pub mod session;

pub use account::{Account, CardDetails, Subscription};
pub use session::{CurrentUser, keys as session_keys};
