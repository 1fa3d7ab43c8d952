//! Protocol dispatch: one network round-trip per lookup, chosen by endpoint.

use crate::error::WhoisError;
use crate::protocols::http::HttpWhoisClient;
use crate::protocols::registry::Endpoint;
use crate::protocols::whois::SocketWhoisClient;
use crate::types::CheckConfig;

/// Sends a query to a TLD's endpoint over the protocol it names.
#[derive(Clone)]
pub struct WhoisClient {
    socket: SocketWhoisClient,
    http: HttpWhoisClient,
}

impl WhoisClient {
    /// Create a client with default timeouts (10s connect, 10s read, 60s HTTP).
    pub fn new() -> Result<Self, WhoisError> {
        Self::with_config(&CheckConfig::default())
    }

    /// Create a client with the timeouts from `config`.
    pub fn with_config(config: &CheckConfig) -> Result<Self, WhoisError> {
        Ok(Self {
            socket: SocketWhoisClient::with_timeouts(config.connect_timeout, config.read_timeout),
            http: HttpWhoisClient::with_timeout(config.http_timeout)?,
        })
    }

    /// Query `endpoint` for `domain` and return the raw response text.
    ///
    /// `domain` must already be in wire form (ASCII, punycode-encoded).
    pub async fn query(&self, endpoint: &Endpoint, domain: &str) -> Result<String, WhoisError> {
        match endpoint {
            Endpoint::Socket { host, port } => self.socket.query(host, *port, domain).await,
            Endpoint::Http { url } => self.http.query(url, domain).await,
        }
    }
}
