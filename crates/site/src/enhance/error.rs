//! Enhancement error taxonomy.

use thiserror::Error;

/// Errors from the enhancement request lifecycle.
///
/// `InvalidInput`, `AuthRequired`, and `QuotaExhausted` are produced before
/// any network call; the remaining variants are transport/server faults
/// surfaced to the user verbatim.
#[derive(Debug, Error)]
pub enum EnhanceError {
    /// Prompt was empty or whitespace-only. Recovered locally.
    #[error("please enter a prompt to enhance")]
    InvalidInput,

    /// Pro tier requested with no signed-in identity. The UI redirects to
    /// sign-up instead of showing this message.
    #[error("authentication required for the pro model")]
    AuthRequired,

    /// Free-plan account with zero remaining requests.
    #[error("trial requests exhausted - please upgrade to pro")]
    QuotaExhausted,

    /// The request exceeded the configured bound and was aborted.
    #[error("request timeout")]
    Timeout,

    /// The endpoint answered with a non-success status or an unusable body.
    #[error("enhancement service error (status {status}): {body}")]
    Remote {
        /// HTTP status code returned by the endpoint.
        status: u16,
        /// Response body, truncated for display.
        body: String,
    },

    /// Any other transport fault.
    #[error("an unexpected error occurred: {0}")]
    Transport(String),
}

impl EnhanceError {
    /// Map a reqwest fault, distinguishing the client-side timeout abort.
    pub(crate) fn from_transport(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_display_includes_status_and_body() {
        let err = EnhanceError::Remote {
            status: 502,
            body: "bad gateway".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("502"));
        assert!(msg.contains("bad gateway"));
    }

    #[test]
    fn test_timeout_display() {
        assert_eq!(EnhanceError::Timeout.to_string(), "request timeout");
    }
}
