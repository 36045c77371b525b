//! Remote enhancement client.
//!
//! Thin HTTP wrapper over the two enhancement endpoints. Both tiers are
//! structurally identical (GET with the prompt URL-encoded as a query
//! parameter, plain-text body returned verbatim); only the parameter name
//! and the empty-body rule differ. Auth and quota gating live in
//! `services::enhancer`, not here.

mod error;

pub use error::EnhanceError;

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::config::EnhanceConfig;

/// Maximum error-body length surfaced to the user.
const MAX_ERROR_BODY: usize = 200;

/// Client for the remote enhancement endpoints.
///
/// Cheaply cloneable; the underlying connection pool is shared.
#[derive(Clone)]
pub struct EnhanceClient {
    inner: Arc<EnhanceClientInner>,
}

struct EnhanceClientInner {
    client: reqwest::Client,
    free_base: String,
    pro_base: String,
}

impl EnhanceClient {
    /// Create a new enhancement client.
    ///
    /// The configured timeout applies to every request and aborts the
    /// in-flight call when exceeded.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the underlying client cannot be built.
    pub fn new(config: &EnhanceConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            inner: Arc::new(EnhanceClientInner {
                client,
                free_base: config.free_base.trim_end_matches('/').to_owned(),
                pro_base: config.pro_base.trim_end_matches('/').to_owned(),
            }),
        })
    }

    /// Enhance a prompt with the free-tier endpoint.
    ///
    /// `GET {free_base}/enhance?prompt=<url-encoded>` with the configured
    /// bound. The response body is returned verbatim; an empty 2xx body is
    /// treated as a server fault.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the prompt trims to empty (no request is made)
    /// - `Timeout` if the bound elapses
    /// - `Remote` on a non-success status or an empty body
    /// - `Transport` for any other fault
    #[instrument(skip(self, prompt))]
    pub async fn enhance_free(&self, prompt: &str) -> Result<String, EnhanceError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(EnhanceError::InvalidInput);
        }

        let url = format!("{}/enhance", self.inner.free_base);
        let response = self
            .inner
            .client
            .get(&url)
            .query(&[("prompt", prompt)])
            .header(reqwest::header::ACCEPT, "text/plain")
            .send()
            .await
            .map_err(|e| EnhanceError::from_transport(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EnhanceError::from_transport(&e))?;

        if !status.is_success() {
            return Err(EnhanceError::Remote {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        if body.is_empty() {
            return Err(EnhanceError::Remote {
                status: status.as_u16(),
                body: "empty response from server".to_owned(),
            });
        }

        debug!(bytes = body.len(), "free enhancement succeeded");
        Ok(body)
    }

    /// Enhance a prompt with the pro-tier endpoint.
    ///
    /// `GET {pro_base}/?message=<url-encoded>`. Same bound as the free path;
    /// the body is returned verbatim (an empty pro body is passed through
    /// unchanged, unlike the free path).
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if the prompt trims to empty (no request is made)
    /// - `Timeout` if the bound elapses
    /// - `Remote` on a non-success status
    /// - `Transport` for any other fault
    #[instrument(skip(self, prompt))]
    pub async fn enhance_pro(&self, prompt: &str) -> Result<String, EnhanceError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(EnhanceError::InvalidInput);
        }

        let url = format!("{}/", self.inner.pro_base);
        let response = self
            .inner
            .client
            .get(&url)
            .query(&[("message", prompt)])
            .send()
            .await
            .map_err(|e| EnhanceError::from_transport(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| EnhanceError::from_transport(&e))?;

        if !status.is_success() {
            return Err(EnhanceError::Remote {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        debug!(bytes = body.len(), "pro enhancement succeeded");
        Ok(body)
    }
}

/// Truncate an error body for display.
fn truncate_body(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::time::Duration;

    fn client(timeout: Duration) -> EnhanceClient {
        EnhanceClient::new(&EnhanceConfig {
            free_base: "http://127.0.0.1:9".to_owned(),
            pro_base: "http://127.0.0.1:9".to_owned(),
            timeout,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected_without_network() {
        // Port 9 (discard) is never contacted: InvalidInput short-circuits.
        let client = client(Duration::from_secs(1));

        assert!(matches!(
            client.enhance_free("").await,
            Err(EnhanceError::InvalidInput)
        ));
        assert!(matches!(
            client.enhance_free("   \n\t").await,
            Err(EnhanceError::InvalidInput)
        ));
        assert!(matches!(
            client.enhance_pro("").await,
            Err(EnhanceError::InvalidInput)
        ));
        assert!(matches!(
            client.enhance_pro(" \t ").await,
            Err(EnhanceError::InvalidInput)
        ));
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(500);
        assert_eq!(truncate_body(&long).len(), MAX_ERROR_BODY);
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn test_base_urls_normalized() {
        let client = EnhanceClient::new(&EnhanceConfig {
            free_base: "https://enhance.test/".to_owned(),
            pro_base: "https://pro.test///".to_owned(),
            timeout: Duration::from_secs(10),
        })
        .unwrap();

        assert_eq!(client.inner.free_base, "https://enhance.test");
        assert_eq!(client.inner.pro_base, "https://pro.test");
    }
}
