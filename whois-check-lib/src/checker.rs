//! Main WHOIS checker implementation.
//!
//! This module provides the `WhoisChecker` struct that orchestrates a lookup:
//! normalize the domain, find its TLD in the registry, query the TLD's
//! endpoint, and classify the response.

use crate::classify::classify;
use crate::error::WhoisError;
use crate::protocols::{Registry, WhoisClient};
use crate::report::WhoisReport;
use crate::types::{CheckConfig, CheckMethod, DomainResult, LookupOutcome, LookupStatus};
use crate::utils::{split_domain, wire_domain};
use futures::stream::{self, Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Resolves domain availability against per-TLD WHOIS services.
///
/// The checker owns a read-only [`Registry`] behind an `Arc`, so clones are
/// cheap and can run lookups concurrently.
///
/// # Example
///
/// ```rust,no_run
/// use whois_check_lib::{LookupOutcome, Registry, WhoisChecker};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let checker = WhoisChecker::new(Registry::builtin(None)?)?;
///     match checker.lookup("example.com").await? {
///         LookupOutcome::Available => println!("available"),
///         other => println!("{:?}", other),
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct WhoisChecker {
    /// Configuration settings for this checker instance
    config: CheckConfig,
    /// TLD definitions, shared between clones
    registry: Arc<Registry>,
    /// Socket and HTTP clients
    client: WhoisClient,
}

impl WhoisChecker {
    /// Create a checker over `registry` with default timeouts.
    pub fn new(registry: Registry) -> Result<Self, WhoisError> {
        Self::with_config(registry, CheckConfig::default())
    }

    /// Create a checker over `registry` with custom configuration.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use whois_check_lib::{CheckConfig, Registry, WhoisChecker};
    /// use std::time::Duration;
    ///
    /// let config = CheckConfig::default()
    ///     .with_concurrency(20)
    ///     .with_read_timeout(Duration::from_secs(5));
    ///
    /// let registry = Registry::builtin(None).unwrap();
    /// let checker = WhoisChecker::with_config(registry, config).unwrap();
    /// ```
    pub fn with_config(
        registry: impl Into<Arc<Registry>>,
        config: CheckConfig,
    ) -> Result<Self, WhoisError> {
        let client = WhoisClient::with_config(&config)?;
        Ok(Self {
            config,
            registry: registry.into(),
            client,
        })
    }

    /// Load the registry named by `config` and build a checker over it.
    ///
    /// # Errors
    ///
    /// Returns `WhoisError::ConfigError` if the base catalog is missing or
    /// cannot be parsed.
    pub fn from_config(config: CheckConfig) -> Result<Self, WhoisError> {
        let registry = Registry::from_config(&config)?;
        Self::with_config(registry, config)
    }

    /// Get the current configuration for this checker.
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Get the registry this checker resolves TLDs against.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Whether the TLD of `domain` is in the registry.
    pub fn can_lookup(&self, domain: &str) -> bool {
        split_domain(domain)
            .map(|parsed| self.registry.can_lookup(&parsed.tld))
            .unwrap_or(false)
    }

    /// Look up a single domain.
    ///
    /// Network failures are part of the outcome (`LookupOutcome::Error`);
    /// only failures that prevent a lookup from starting are returned as
    /// errors.
    ///
    /// # Errors
    ///
    /// - `WhoisError::InvalidDomain` if the domain cannot be split or encoded
    /// - `WhoisError::UnknownTld` if the TLD is not in the registry; no
    ///   network call is made
    /// - `WhoisError::RegistryError` if the TLD's definition is unusable
    pub async fn lookup(&self, domain: &str) -> Result<LookupOutcome, WhoisError> {
        self.lookup_with_method(domain)
            .await
            .map(|(outcome, _)| outcome)
    }

    async fn lookup_with_method(
        &self,
        domain: &str,
    ) -> Result<(LookupOutcome, CheckMethod), WhoisError> {
        let parsed = split_domain(domain)?;

        if !self.registry.can_lookup(&parsed.tld) {
            return Err(WhoisError::unknown_tld(&parsed.tld));
        }

        let resolved = self.registry.resolve(&parsed.tld)?;
        let wire = wire_domain(&parsed)?;
        let method = resolved.endpoint.method();

        debug!(
            "Looking up {} ({}) via {}",
            wire, resolved.key, resolved.endpoint
        );

        let outcome = match self.client.query(resolved.endpoint, &wire).await {
            Ok(text) => classify(&text, resolved.available, resolved.premium, method),
            Err(e) => {
                debug!("Lookup of {} failed: {}", wire, e);
                LookupOutcome::Error {
                    detail: e.to_string(),
                }
            }
        };

        Ok((outcome, method))
    }

    /// Check a single domain and record the result.
    ///
    /// Never fails: lookups that cannot start are recorded as
    /// `LookupStatus::Unsupported` (unknown TLD) or `LookupStatus::Unresolved`.
    pub async fn check_domain(&self, domain: &str) -> DomainResult {
        let start_time = Instant::now();
        let tld_known = self.can_lookup(domain);

        let mut result = DomainResult {
            domain: domain.trim().to_string(),
            status: LookupStatus::Unresolved,
            tld_known,
            whois: None,
            error_message: None,
            check_duration: None,
            method_used: CheckMethod::Unknown,
        };

        match self.lookup_with_method(domain).await {
            Ok((outcome, method)) => {
                result.status = outcome.status();
                result.method_used = method;
                match outcome {
                    LookupOutcome::Unavailable { raw_text } => result.whois = Some(raw_text),
                    LookupOutcome::Error { detail } => result.error_message = Some(detail),
                    LookupOutcome::Available | LookupOutcome::Premium => {}
                }
            }
            Err(e) => {
                if matches!(e, WhoisError::UnknownTld { .. }) {
                    result.status = LookupStatus::Unsupported;
                }
                result.error_message = Some(e.to_string());
            }
        }

        result.check_duration = Some(start_time.elapsed());
        result
    }

    /// Check several domains concurrently.
    ///
    /// At most `config.concurrency` lookups run at once. Results come back
    /// in the same order as `domains`.
    pub async fn check_domains(&self, domains: &[String]) -> Vec<DomainResult> {
        stream::iter(domains)
            .map(|domain| self.check_domain(domain))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await
    }

    /// Check domains and yield each result as soon as it completes.
    pub fn check_domains_stream(
        &self,
        domains: &[String],
    ) -> Pin<Box<dyn Stream<Item = DomainResult> + Send + '_>> {
        let domains = domains.to_vec();
        let stream = stream::iter(domains)
            .map(move |domain| async move { self.check_domain(&domain).await })
            .buffer_unordered(self.config.concurrency.max(1));

        Box::pin(stream)
    }

    /// Check a domain and render the result as a human-readable report.
    pub async fn report(&self, domain: &str) -> WhoisReport {
        WhoisReport::from_result(&self.check_domain(domain).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const CATALOG: &str = r#"[
        {"extensions": ".test", "uri": "socket://127.0.0.1:9", "available": "No match"},
        {"extensions": ".broken", "uri": "", "available": "No match"}
    ]"#;

    fn checker() -> WhoisChecker {
        WhoisChecker::new(Registry::from_sources(CATALOG, None).unwrap()).unwrap()
    }

    #[test]
    fn test_can_lookup_by_domain() {
        let checker = checker();
        assert!(checker.can_lookup("example.test"));
        assert!(!checker.can_lookup("example.doesnotexist"));
        assert!(!checker.can_lookup("nodot"));
    }

    #[tokio::test]
    async fn test_unknown_tld_is_not_a_network_error() {
        let err = checker().lookup("example.doesnotexist").await.unwrap_err();
        assert_eq!(err, WhoisError::unknown_tld(".doesnotexist"));
    }

    #[tokio::test]
    async fn test_missing_uri_is_registry_error() {
        let err = checker().lookup("example.broken").await.unwrap_err();
        assert!(matches!(err, WhoisError::RegistryError { .. }));
    }

    #[tokio::test]
    async fn test_invalid_domain_is_rejected() {
        let err = checker().lookup("nodot").await.unwrap_err();
        assert!(matches!(err, WhoisError::InvalidDomain { .. }));
    }

    #[tokio::test]
    async fn test_check_domain_statuses_without_network() {
        let checker = checker();

        let unknown = checker.check_domain("example.doesnotexist").await;
        assert_eq!(unknown.status, LookupStatus::Unsupported);
        assert!(!unknown.tld_known);
        assert_eq!(unknown.method_used, CheckMethod::Unknown);
        assert_eq!(unknown.available(), None);

        let broken = checker.check_domain("example.broken").await;
        assert_eq!(broken.status, LookupStatus::Unresolved);
        assert!(broken.tld_known);
        assert!(broken.error_message.is_some());
    }
    #[tokio::test]
    async fn test_zero_concurrency_still_checks_everything() {
        let mut config = CheckConfig::default();
        config.concurrency = 0;
        let checker =
            WhoisChecker::with_config(Registry::from_sources(CATALOG, None).unwrap(), config)
                .unwrap();
        let domains = vec!["a.doesnotexist".to_string(), "b.broken".to_string()];

        let batch = tokio::time::timeout(Duration::from_secs(5), checker.check_domains(&domains))
            .await
            .unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].status, LookupStatus::Unsupported);
        assert_eq!(batch[1].status, LookupStatus::Unresolved);

        let streamed: Vec<DomainResult> = tokio::time::timeout(
            Duration::from_secs(5),
            checker.check_domains_stream(&domains).collect(),
        )
        .await
        .unwrap();
        assert_eq!(streamed.len(), 2);
    }
}
