//! WHOIS-over-HTTP gateway lookups.
//!
//! Some registries only publish availability through a web form. The
//! registry stores such endpoints as URL prefixes; the domain is appended and
//! the page body is classified like a WHOIS response.

use crate::error::WhoisError;
use crate::types::DEFAULT_HTTP_TIMEOUT;
use std::time::Duration;
use tracing::debug;

/// HTTP client for gateway lookups.
///
/// Redirects are not followed and TLS certificates are not verified: gateway
/// endpoints are trusted by configuration, not by certificate.
#[derive(Clone)]
pub struct HttpWhoisClient {
    /// HTTP client for making gateway requests
    http_client: reqwest::Client,
    /// Total timeout for one request, body included
    timeout: Duration,
}

impl HttpWhoisClient {
    /// Create a new client with the default 60s timeout.
    pub fn new() -> Result<Self, WhoisError> {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a new client with a custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, WhoisError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(|e| {
                WhoisError::internal(format!("Failed to create HTTP WHOIS client: {}", e))
            })?;

        Ok(Self {
            http_client,
            timeout,
        })
    }

    /// Timeout applied to each request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch `url_prefix + domain` and return the body.
    ///
    /// The status code is not interpreted: a 404 page or a redirect body is
    /// returned like any other response.
    ///
    /// # Errors
    ///
    /// Returns `WhoisError::NetworkError` on transport failures, including
    /// timeouts and body read errors.
    pub async fn query(&self, url_prefix: &str, domain: &str) -> Result<String, WhoisError> {
        let url = format!("{}{}", url_prefix, domain);
        debug!("Requesting WHOIS gateway {}", url);

        let response = self.http_client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            debug!("Gateway {} answered with HTTP {}", url, status);
        }

        let body = response.text().await?;
        debug!("Received {} bytes from {}", body.len(), url);

        Ok(body)
    }
}
