//! Error handling for WHOIS lookups.
//!
//! This module defines the error type shared by the registry, the protocol
//! clients and the lookup facade. Registry-resolution failures and network
//! failures are kept as separate variants so callers can tell "this TLD cannot
//! be looked up" apart from "the server could not be reached".

use std::fmt;

/// Main error type for WHOIS lookup operations.
#[derive(Debug, Clone, PartialEq)]
pub enum WhoisError {
    /// Invalid domain name format
    InvalidDomain { domain: String, reason: String },

    /// The TLD is not present in the merged registry
    UnknownTld { tld: String },

    /// The TLD is known but its definition cannot be used for a lookup
    /// (missing or malformed endpoint URI)
    RegistryError { tld: String, message: String },

    /// Connect, read or HTTP transport failure.
    ///
    /// `code` carries the OS error number when the failure came from a socket.
    NetworkError { code: Option<i32>, message: String },

    /// Configuration errors (unparsable registry or config file, bad values)
    ConfigError { message: String },

    /// File I/O errors when reading registry or config files
    FileError { path: String, message: String },

    /// Generic internal errors that don't fit other categories
    Internal { message: String },
}

impl WhoisError {
    /// Create a new invalid domain error.
    pub fn invalid_domain<D: Into<String>, R: Into<String>>(domain: D, reason: R) -> Self {
        Self::InvalidDomain {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    /// Create a new unknown TLD error.
    pub fn unknown_tld<T: Into<String>>(tld: T) -> Self {
        Self::UnknownTld { tld: tld.into() }
    }

    /// Create a new registry resolution error.
    pub fn registry<T: Into<String>, M: Into<String>>(tld: T, message: M) -> Self {
        Self::RegistryError {
            tld: tld.into(),
            message: message.into(),
        }
    }

    /// Create a new network error without an error code.
    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::NetworkError {
            code: None,
            message: message.into(),
        }
    }

    /// Create a new network error from an I/O error, keeping its OS error code.
    pub fn network_io<C: fmt::Display>(context: C, err: &std::io::Error) -> Self {
        Self::NetworkError {
            code: err.raw_os_error(),
            message: format!("{}: {}", context, err),
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error came from the network round-trip.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::NetworkError { .. })
    }

    /// Whether the lookup could not even start because of the TLD's registry
    /// entry (unknown TLD or unusable definition).
    pub fn is_registry(&self) -> bool {
        matches!(self, Self::UnknownTld { .. } | Self::RegistryError { .. })
    }
}

impl fmt::Display for WhoisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDomain { domain, reason } => {
                write!(f, "Invalid domain '{}': {}", domain, reason)
            }
            Self::UnknownTld { tld } => {
                write!(f, "Whois server not known for {}", tld)
            }
            Self::RegistryError { tld, message } => {
                write!(f, "Registry error for '{}': {}", tld, message)
            }
            Self::NetworkError { code, message } => match code {
                Some(code) => write!(f, "Error: {} - {}", code, message),
                None => write!(f, "Error: {}", message),
            },
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for WhoisError {}

impl From<reqwest::Error> for WhoisError {
    fn from(err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            "HTTP request timed out"
        } else if err.is_connect() {
            "Connection failed"
        } else if err.is_body() || err.is_decode() {
            "Failed to read response body"
        } else {
            "HTTP request failed"
        };
        Self::NetworkError {
            code: transport_code(&err),
            message: format!("{}: {}", kind, err),
        }
    }
}

/// HTTP status, or the OS error code of the underlying I/O failure.
fn transport_code(err: &reqwest::Error) -> Option<i32> {
    if let Some(status) = err.status() {
        return Some(i32::from(status.as_u16()));
    }
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            return io.raw_os_error();
        }
        source = cause.source();
    }
    None
}

impl From<serde_json::Error> for WhoisError {
    fn from(err: serde_json::Error) -> Self {
        Self::ConfigError {
            message: format!("JSON parsing failed: {}", err),
        }
    }
}

impl From<std::io::Error> for WhoisError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}
