//! Human-readable rendering of a check result.

use crate::types::{DomainResult, LookupStatus};
use crate::utils::split_domain;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One domain's result as a message for end users.
///
/// `valid` is false only when the domain's TLD is not supported; every
/// other outcome, including network failures, is a valid lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhoisReport {
    /// The domain as given
    pub domain: String,
    /// Second-level label, when the domain could be split
    pub sld: Option<String>,
    /// TLD including the leading dot, when the domain could be split
    pub tld: Option<String>,
    /// Whether the domain can be registered
    pub available: bool,
    /// Whether the TLD is supported
    pub valid: bool,
    /// Message to show the user
    pub message: String,
}

impl WhoisReport {
    /// Build a report from a finished check.
    pub fn from_result(result: &DomainResult) -> Self {
        let domain = result.domain.clone();
        let (sld, tld) = match split_domain(&domain) {
            Ok(parsed) => (Some(parsed.sld), Some(parsed.tld)),
            Err(_) => (None, None),
        };

        let unable = || format!("Unable to lookup whois information for {}", domain);

        let message = match result.status {
            LookupStatus::Available => format!("{} is available for registration.", domain),
            LookupStatus::Premium => format!("{} is a premium domain.", domain),
            LookupStatus::Unavailable => result.whois.clone().unwrap_or_default(),
            LookupStatus::Error => format!(
                "Error looking up {}: {}",
                domain,
                result.error_message.as_deref().unwrap_or("unknown error")
            ),
            LookupStatus::Unsupported | LookupStatus::Unresolved => unable(),
        };

        Self {
            available: result.status == LookupStatus::Available,
            valid: result.tld_known,
            domain,
            sld,
            tld,
            message,
        }
    }
}

impl fmt::Display for WhoisReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
