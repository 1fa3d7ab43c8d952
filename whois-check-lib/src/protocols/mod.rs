//! Protocol implementations for WHOIS lookups.
//!
//! This module contains the TLD registry and the two wire protocols used to
//! reach a TLD's WHOIS service: raw TCP and HTTP gateways.

/// Dispatch between socket and HTTP lookups
pub mod client;

/// WHOIS-over-HTTP gateway implementation
pub mod http;

/// TLD registry: endpoints and match strings
pub mod registry;

/// Raw TCP WHOIS implementation
pub mod whois;

// Re-export commonly used functions and types
pub use client::WhoisClient;
pub use http::HttpWhoisClient;
pub use registry::{Endpoint, Registry, ResolvedTld, TldDefinition, TldField};
pub use whois::SocketWhoisClient;
