//! # WHOIS Check Library
//!
//! Resolves whether a domain name is available for registration by querying
//! the authoritative WHOIS service for its top-level domain.
//!
//! Every supported TLD has a definition in a [`Registry`]: where to send the
//! query (a raw TCP WHOIS server or an HTTP gateway) and which substrings in
//! the response mean "available" or "premium". A lookup normalizes the
//! domain, encodes internationalized names to punycode, performs a single
//! network round-trip, and classifies the answer.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use whois_check_lib::{Registry, WhoisChecker};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let checker = WhoisChecker::new(Registry::builtin(None)?)?;
//!     let result = checker.check_domain("example.com").await;
//!
//!     println!("{}: {}", result.domain, result.status);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Per-TLD catalog**: bundled JSON catalog, replaceable and overridable
//! - **Two transports**: `socket://host[:port]` WHOIS and HTTP gateways
//! - **IDN support**: Unicode TLDs and labels are punycode-encoded
//! - **Concurrent Processing**: bounded parallel checks, ordered or streaming
//! - **Configurable**: TOML files and `WC_*` environment variables

// Re-export main public API types and functions
// This makes them available as whois_check_lib::TypeName
pub use checker::WhoisChecker;
pub use classify::{classify, escape_html, nl2br, sanitize, strip_tags};
pub use config::{
    load_env_config, parse_timeout, parse_timeout_string, ConfigManager, DefaultsConfig,
    EnvConfig, FileConfig, RegistryConfig,
};
pub use error::WhoisError;
pub use protocols::{
    Endpoint, HttpWhoisClient, Registry, ResolvedTld, SocketWhoisClient, TldDefinition, TldField,
    WhoisClient,
};
pub use report::WhoisReport;
pub use types::{
    CheckConfig, CheckMethod, DomainResult, LookupOutcome, LookupStatus, ParsedDomain,
    DEFAULT_CONNECT_TIMEOUT, DEFAULT_HTTP_TIMEOUT, DEFAULT_READ_TIMEOUT,
};
pub use utils::{convert_tld, expand_domain_inputs, needs_idn_encoding, split_domain, wire_domain};

// Internal modules - these are not part of the public API
mod checker;
mod classify;
mod config;
mod error;
mod protocols;
mod report;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, WhoisError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
