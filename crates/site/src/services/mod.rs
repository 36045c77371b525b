//! Application services.
//!
//! Thin coordinators over the repository, the enhancement client, and the
//! account feed. Route handlers construct these per request.

pub mod auth;
pub mod enhancer;
pub mod quota;
pub mod session_tracker;

pub use enhancer::{Enhancer, EnhancerError};
pub use quota::{QuotaError, QuotaLedger};
pub use session_tracker::{AccountFeed, SessionTracker};
