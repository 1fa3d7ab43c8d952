//! Core data types for WHOIS lookups.
//!
//! This module defines the per-lookup values (parsed domain, outcome, result
//! record) and the configuration used to build a checker.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default connect timeout for socket WHOIS.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default idle read timeout for socket WHOIS.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Default total timeout for HTTP gateway lookups.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// A domain split into its second-level label and TLD.
///
/// The split happens on the first dot only, so "example.co.uk" yields
/// `sld = "example"` and `tld = ".co.uk"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDomain {
    /// Second-level label, e.g. "example"
    pub sld: String,
    /// TLD including the leading dot, e.g. ".com"
    pub tld: String,
}

impl ParsedDomain {
    /// The domain as written, `sld + tld`.
    pub fn full(&self) -> String {
        format!("{}{}", self.sld, self.tld)
    }
}

/// Outcome of a single resolution attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum LookupOutcome {
    /// The available-match string was found in the response
    Available,

    /// The premium-match string was found in the response
    Premium,

    /// Neither string matched; carries the sanitized response text
    Unavailable { raw_text: String },

    /// The network round-trip failed
    Error { detail: String },
}

impl LookupOutcome {
    /// Short status for this outcome.
    pub fn status(&self) -> LookupStatus {
        match self {
            Self::Available => LookupStatus::Available,
            Self::Premium => LookupStatus::Premium,
            Self::Unavailable { .. } => LookupStatus::Unavailable,
            Self::Error { .. } => LookupStatus::Error,
        }
    }
}

/// Status recorded in a [`DomainResult`].
///
/// Extends the lookup outcomes with the two ways a lookup can fail to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupStatus {
    Available,
    Premium,
    Unavailable,
    /// Network failure while querying a known TLD
    Error,
    /// TLD not present in the registry
    Unsupported,
    /// TLD known, but its definition or the input could not be resolved
    Unresolved,
}

impl std::fmt::Display for LookupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LookupStatus::Available => write!(f, "AVAILABLE"),
            LookupStatus::Premium => write!(f, "PREMIUM"),
            LookupStatus::Unavailable => write!(f, "TAKEN"),
            LookupStatus::Error => write!(f, "ERROR"),
            LookupStatus::Unsupported => write!(f, "UNSUPPORTED"),
            LookupStatus::Unresolved => write!(f, "UNRESOLVED"),
        }
    }
}

/// Wire protocol used for a lookup.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CheckMethod {
    /// Raw TCP WHOIS
    #[serde(rename = "socket")]
    Socket,

    /// WHOIS-over-HTTP gateway
    #[serde(rename = "http")]
    Http,

    /// No network call was made
    #[serde(rename = "unknown")]
    Unknown,
}

impl std::fmt::Display for CheckMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckMethod::Socket => write!(f, "WHOIS"),
            CheckMethod::Http => write!(f, "HTTP"),
            CheckMethod::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Result of checking one domain, suitable for display or JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainResult {
    /// The domain name that was checked (e.g., "example.com")
    pub domain: String,

    /// Final status of the check
    pub status: LookupStatus,

    /// Whether the domain's TLD is present in the registry
    pub tld_known: bool,

    /// Sanitized WHOIS text, only set for taken domains
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois: Option<String>,

    /// Error detail for failed or unresolved checks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// How long the check took to complete
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_duration: Option<Duration>,

    /// Which protocol was used to check the domain
    pub method_used: CheckMethod,
}

impl DomainResult {
    /// `Some(true)` when available, `Some(false)` when taken or premium,
    /// `None` when the status could not be determined.
    pub fn available(&self) -> Option<bool> {
        match self.status {
            LookupStatus::Available => Some(true),
            LookupStatus::Premium | LookupStatus::Unavailable => Some(false),
            _ => None,
        }
    }
}

/// Configuration options for WHOIS lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Maximum number of concurrent domain checks
    /// Default: 10, Range: 1-100
    pub concurrency: usize,

    /// Connect timeout for socket WHOIS
    #[serde(skip)]
    pub connect_timeout: Duration,

    /// Idle read timeout for socket WHOIS
    #[serde(skip)]
    pub read_timeout: Duration,

    /// Total timeout for HTTP gateway lookups
    #[serde(skip)]
    pub http_timeout: Duration,

    /// Base TLD catalog; the bundled catalog is used when unset
    pub registry_path: Option<PathBuf>,

    /// Override TLD catalog, applied on top of the base
    pub override_path: Option<PathBuf>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            concurrency: 10,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
            registry_path: None,
            override_path: None,
        }
    }
}

impl CheckConfig {
    /// Set custom concurrency, capped to 1-100.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, 100);
        self
    }

    /// Set the socket connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the socket idle read timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Set the HTTP gateway timeout.
    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Use a base TLD catalog from disk instead of the bundled one.
    pub fn with_registry_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.registry_path = Some(path.into());
        self
    }

    /// Apply an override TLD catalog.
    pub fn with_override_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.override_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let config = CheckConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.read_timeout, Duration::from_secs(10));
        assert_eq!(config.http_timeout, Duration::from_secs(60));
        assert!(config.registry_path.is_none());
    }

    #[test]
    fn test_concurrency_is_clamped() {
        assert_eq!(CheckConfig::default().with_concurrency(0).concurrency, 1);
        assert_eq!(CheckConfig::default().with_concurrency(500).concurrency, 100);
    }

    #[test]
    fn test_outcome_serializes_with_result_tag() {
        let json = serde_json::to_value(LookupOutcome::Unavailable {
            raw_text: "taken".to_string(),
        })
        .unwrap();
        assert_eq!(json["result"], "unavailable");
        assert_eq!(json["raw_text"], "taken");
    }
}
