//! TLD registry: which server answers for a TLD and how to read its reply.
//!
//! The registry is built once from a base catalog and an optional override
//! catalog, both JSON arrays of definition records:
//!
//! ```json
//! [{ "extensions": ".com,.net", "uri": "socket://whois.verisign-grs.com",
//!    "available": "No match for", "premium": "" }]
//! ```
//!
//! Each record is expanded into one entry per extension. Override entries
//! replace base entries with the same key. After construction the registry is
//! read-only and can be shared between concurrent lookups.

use crate::error::WhoisError;
use crate::types::{CheckConfig, CheckMethod};
use crate::utils::convert_tld;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Scheme prefix marking a raw TCP WHOIS endpoint.
pub const SOCKET_PREFIX: &str = "socket://";

/// Port used when a socket endpoint does not name one.
pub const DEFAULT_WHOIS_PORT: u16 = 43;

/// File name of the override catalog looked up next to a base catalog.
pub const OVERRIDE_FILE_NAME: &str = "whois.json";

/// Catalog bundled with the library, used when no base file is configured.
const BUILTIN_DEFINITIONS: &str = include_str!("../../data/dist.whois.json");

/// Where a TLD's WHOIS data is served from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Raw TCP WHOIS, `socket://host[:port]`
    Socket { host: String, port: u16 },
    /// HTTP gateway; the domain is appended to `url`
    Http { url: String },
}

impl Endpoint {
    /// Parse a registry URI into an endpoint.
    ///
    /// `socket://host` and `socket://host:port` become [`Endpoint::Socket`]
    /// (port 43 by default). Any other non-empty URI is an HTTP gateway
    /// prefix and is kept verbatim.
    pub fn parse(uri: &str) -> Result<Self, WhoisError> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(WhoisError::config("Uri not defined for whois service"));
        }

        let Some(address) = uri.strip_prefix(SOCKET_PREFIX) else {
            return Ok(Self::Http {
                url: uri.to_string(),
            });
        };

        let address = address.trim_end_matches('/');
        let (host, port) = match address.split_once(':') {
            Some((host, port)) => {
                let port = port.parse::<u16>().map_err(|_| {
                    WhoisError::config(format!("Invalid port '{}' in '{}'", port, uri))
                })?;
                (host, port)
            }
            None => (address, DEFAULT_WHOIS_PORT),
        };

        if host.is_empty() {
            return Err(WhoisError::config(format!("Missing host in '{}'", uri)));
        }

        Ok(Self::Socket {
            host: host.to_string(),
            port,
        })
    }

    /// Whether this endpoint uses raw TCP WHOIS.
    pub fn is_socket(&self) -> bool {
        matches!(self, Self::Socket { .. })
    }

    /// Protocol used for this endpoint.
    pub fn method(&self) -> CheckMethod {
        match self {
            Self::Socket { .. } => CheckMethod::Socket,
            Self::Http { .. } => CheckMethod::Http,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Socket { host, port } => write!(f, "{}{}:{}", SOCKET_PREFIX, host, port),
            Self::Http { url } => write!(f, "{}", url),
        }
    }
}

/// One TLD's entry in the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TldDefinition {
    /// Endpoint URI as written in the catalog
    pub uri: String,
    /// Parsed endpoint, `None` when the URI is missing or malformed
    pub endpoint: Option<Endpoint>,
    /// Substring whose presence means the domain is available
    pub available: String,
    /// Substring whose presence means the domain is premium
    pub premium: Option<String>,
}

/// Fields that can be read from a definition with [`Registry::get`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TldField {
    Uri,
    Available,
    Premium,
}

/// Everything a lookup needs from the registry for one TLD.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedTld<'a> {
    /// Registry key that matched (may be the IDN-converted form)
    pub key: &'a str,
    pub endpoint: &'a Endpoint,
    pub available: &'a str,
    pub premium: Option<&'a str>,
}

/// Catalog record as it appears on disk.
#[derive(Debug, Deserialize)]
struct RawDefinition {
    extensions: String,
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    available: Option<String>,
    #[serde(default)]
    premium: Option<String>,
}

/// Parse one catalog source into registry entries.
fn parse_definitions(source: &str) -> Result<HashMap<String, TldDefinition>, serde_json::Error> {
    let records: Vec<RawDefinition> = serde_json::from_str(source)?;
    let mut definitions = HashMap::new();

    for record in records {
        let uri = record.uri.unwrap_or_default();
        let endpoint = match Endpoint::parse(&uri) {
            Ok(endpoint) => Some(endpoint),
            Err(e) => {
                warn!("Unusable endpoint for {}: {}", record.extensions, e);
                None
            }
        };
        let definition = TldDefinition {
            uri,
            endpoint,
            available: record.available.unwrap_or_default(),
            premium: record.premium.filter(|p| !p.is_empty()),
        };

        for extension in record.extensions.split(',') {
            let extension = extension.trim();
            if !extension.is_empty() {
                definitions.insert(extension.to_lowercase(), definition.clone());
            }
        }
    }

    Ok(definitions)
}

/// Immutable mapping from TLD (".com") to its definition.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    definitions: HashMap<String, TldDefinition>,
}

impl Registry {
    /// Build a registry from catalog text.
    ///
    /// # Arguments
    ///
    /// * `base` - Base catalog JSON; must parse
    /// * `override_source` - Optional override catalog JSON; ignored if it
    ///   does not parse
    ///
    /// # Errors
    ///
    /// Returns `WhoisError::ConfigError` if the base catalog is not a valid
    /// array of definition records.
    pub fn from_sources(base: &str, override_source: Option<&str>) -> Result<Self, WhoisError> {
        let mut definitions = parse_definitions(base).map_err(|e| {
            WhoisError::config(format!("Failed to parse base TLD catalog: {}", e))
        })?;

        if let Some(source) = override_source {
            match parse_definitions(source) {
                Ok(overrides) => {
                    debug!("Applying {} override TLD definitions", overrides.len());
                    definitions.extend(overrides);
                }
                Err(e) => warn!("Ignoring unparsable override TLD catalog: {}", e),
            }
        }

        Ok(Self { definitions })
    }

    /// Load the registry from a base file and an optional override file.
    ///
    /// The base file is mandatory; a missing or unreadable override file
    /// contributes nothing.
    pub fn load(base_path: &Path, override_path: Option<&Path>) -> Result<Self, WhoisError> {
        if !base_path.exists() {
            return Err(WhoisError::config(format!(
                "TLD catalog not found: {}",
                base_path.display()
            )));
        }

        let base = fs::read_to_string(base_path).map_err(|e| {
            WhoisError::file_error(
                base_path.to_string_lossy(),
                format!("Failed to read TLD catalog: {}", e),
            )
        })?;

        let override_source = override_path.and_then(read_override);
        Self::from_sources(&base, override_source.as_deref())
    }

    /// Load the bundled catalog, optionally with an override file.
    pub fn builtin(override_path: Option<&Path>) -> Result<Self, WhoisError> {
        let override_source = override_path.and_then(read_override);
        Self::from_sources(BUILTIN_DEFINITIONS, override_source.as_deref())
    }

    /// Load the registry described by a [`CheckConfig`].
    ///
    /// Without an explicit override path, a `whois.json` next to an explicit
    /// base file is used as the override.
    pub fn from_config(config: &CheckConfig) -> Result<Self, WhoisError> {
        match &config.registry_path {
            Some(base_path) => {
                let override_path = config
                    .override_path
                    .clone()
                    .or_else(|| sibling_override(base_path));
                Self::load(base_path, override_path.as_deref())
            }
            None => Self::builtin(config.override_path.as_deref()),
        }
    }

    /// Number of TLDs in the registry.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the registry has no entries.
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// All known TLDs, sorted.
    pub fn tlds(&self) -> Vec<String> {
        let mut tlds: Vec<String> = self.definitions.keys().cloned().collect();
        tlds.sort();
        tlds
    }

    /// Find the entry for a TLD, falling back to its IDN-converted form.
    ///
    /// Keys are stored lowercase, so the query is lowercased first.
    fn entry(&self, tld: &str) -> Option<(&String, &TldDefinition)> {
        let tld = tld.trim().to_lowercase();
        self.definitions
            .get_key_value(tld.as_str())
            .or_else(|| self.definitions.get_key_value(convert_tld(&tld).as_str()))
    }

    /// Definition for a TLD, if known.
    pub fn definition(&self, tld: &str) -> Option<&TldDefinition> {
        self.entry(tld).map(|(_, definition)| definition)
    }

    /// Whether the TLD (or its IDN-converted form) is in the registry.
    pub fn can_lookup(&self, tld: &str) -> bool {
        self.entry(tld).is_some()
    }

    /// Read one field of a TLD's definition.
    ///
    /// Returns `None` when the TLD is unknown or the field is unset or empty.
    pub fn get(&self, tld: &str, field: TldField) -> Option<&str> {
        let definition = self.definition(tld)?;
        let value = match field {
            TldField::Uri => definition.uri.as_str(),
            TldField::Available => definition.available.as_str(),
            TldField::Premium => definition.premium.as_deref()?,
        };
        (!value.is_empty()).then_some(value)
    }

    /// Whether the TLD is served over raw TCP WHOIS.
    pub fn is_socket_lookup(&self, tld: &str) -> Result<bool, WhoisError> {
        self.resolve(tld).map(|resolved| resolved.endpoint.is_socket())
    }

    /// Resolve everything a lookup needs for a TLD.
    ///
    /// # Errors
    ///
    /// - `WhoisError::UnknownTld` if the TLD is not in the registry
    /// - `WhoisError::RegistryError` if its endpoint URI is missing or malformed
    pub fn resolve(&self, tld: &str) -> Result<ResolvedTld<'_>, WhoisError> {
        let (key, definition) = self
            .entry(tld)
            .ok_or_else(|| WhoisError::unknown_tld(tld))?;

        let endpoint = definition.endpoint.as_ref().ok_or_else(|| {
            let message = if definition.uri.trim().is_empty() {
                "Uri not defined for whois service".to_string()
            } else {
                format!("Invalid whois endpoint '{}'", definition.uri)
            };
            WhoisError::registry(tld, message)
        })?;

        Ok(ResolvedTld {
            key,
            endpoint,
            available: &definition.available,
            premium: definition.premium.as_deref(),
        })
    }
}

/// Read an override catalog, treating any failure as "no overrides".
fn read_override(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            debug!("No override TLD catalog at {}: {}", path.display(), e);
            None
        }
    }
}

/// `whois.json` in the base catalog's directory, unless that is the base itself.
fn sibling_override(base_path: &Path) -> Option<PathBuf> {
    let candidate = base_path.with_file_name(OVERRIDE_FILE_NAME);
    (candidate != base_path).then_some(candidate)
}
