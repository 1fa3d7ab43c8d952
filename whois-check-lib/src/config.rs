//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and `WC_*`
//! environment variables, and merging them onto a [`CheckConfig`] with
//! proper precedence rules.

use crate::error::WhoisError;
use crate::types::CheckConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration loaded from TOML files.
///
/// ```toml
/// [defaults]
/// concurrency = 20
/// connect_timeout = "5s"
/// read_timeout = "10s"
/// http_timeout = "1m"
///
/// [registry]
/// base = "/etc/whois-check/whois.json"
/// override = "/etc/whois-check/local.json"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Default values for lookup options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// TLD catalog locations
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistryConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct DefaultsConfig {
    /// Default concurrency level
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// Socket connect timeout (as string, e.g., "5s", "1m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<String>,

    /// Socket idle read timeout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_timeout: Option<String>,

    /// HTTP gateway timeout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_timeout: Option<String>,
}

/// Where to find the TLD catalogs.
///
/// Relative paths are resolved against the directory of the configuration
/// file they appear in.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RegistryConfig {
    /// Base catalog; the bundled catalog is used when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<PathBuf>,

    /// Override catalog
    #[serde(rename = "override", skip_serializing_if = "Option::is_none")]
    pub override_path: Option<PathBuf>,
}

impl RegistryConfig {
    fn rebase(&mut self, dir: &Path) {
        for path in [&mut self.base, &mut self.override_path].into_iter().flatten() {
            if path.is_relative() {
                *path = dir.join(&*path);
            }
        }
    }
}

impl FileConfig {
    /// Apply these settings on top of `config`.
    ///
    /// Timeout strings are validated when the file is loaded; an invalid one
    /// here (e.g. from a hand-built value) is an error.
    pub fn apply_to(&self, mut config: CheckConfig) -> Result<CheckConfig, WhoisError> {
        if let Some(defaults) = &self.defaults {
            if let Some(concurrency) = defaults.concurrency {
                config = config.with_concurrency(concurrency);
            }
            if let Some(timeout) = &defaults.connect_timeout {
                config = config.with_connect_timeout(require_timeout("connect_timeout", timeout)?);
            }
            if let Some(timeout) = &defaults.read_timeout {
                config = config.with_read_timeout(require_timeout("read_timeout", timeout)?);
            }
            if let Some(timeout) = &defaults.http_timeout {
                config = config.with_http_timeout(require_timeout("http_timeout", timeout)?);
            }
        }

        if let Some(registry) = &self.registry {
            if let Some(base) = &registry.base {
                config = config.with_registry_path(base);
            }
            if let Some(override_path) = &registry.override_path {
                config = config.with_override_path(override_path);
            }
        }

        Ok(config)
    }
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to log which config files were picked up
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    ///
    /// The parsed configuration or an error if parsing fails.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, WhoisError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(WhoisError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            WhoisError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let mut config: FileConfig = toml::from_str(&content)
            .map_err(|e| WhoisError::config(format!("Failed to parse TOML configuration: {}", e)))?;

        self.validate_config(&config)?;

        if let (Some(registry), Some(dir)) = (config.registry.as_mut(), path.parent()) {
            registry.rebase(dir);
        }

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// Looks in the XDG config directory, then the home directory, then the
    /// current directory; later files override earlier ones field by field.
    /// Files that fail to load are skipped with a warning.
    pub fn discover_and_load(&self) -> Result<FileConfig, WhoisError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    merged_config = self.merge_configs(merged_config, config);
                    loaded_files.push(path);
                }
                Err(e) => warn!("Skipping config file {}: {}", path.display(), e),
            }
        }

        if self.verbose {
            for path in &loaded_files {
                debug!("Loaded config file {}", path.display());
            }
        }

        Ok(merged_config)
    }

    /// Get the local configuration file path.
    ///
    /// Looks for configuration files in the current directory.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./whois-check.toml", "./.whois-check.toml"]
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Get the global configuration file path.
    ///
    /// Looks for configuration files in the user's home directory.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        [".whois-check.toml", "whois-check.toml"]
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// Get the XDG configuration file path.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("whois-check").join("config.toml");
        path.exists().then_some(path)
    }

    /// Merge two configurations with proper precedence.
    ///
    /// Values from `higher` take precedence over values from `lower`.
    pub fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(lower_defaults), Some(higher_defaults)) => Some(DefaultsConfig {
                    concurrency: higher_defaults.concurrency.or(lower_defaults.concurrency),
                    connect_timeout: higher_defaults
                        .connect_timeout
                        .or(lower_defaults.connect_timeout),
                    read_timeout: higher_defaults.read_timeout.or(lower_defaults.read_timeout),
                    http_timeout: higher_defaults.http_timeout.or(lower_defaults.http_timeout),
                }),
                (lower_defaults, higher_defaults) => higher_defaults.or(lower_defaults),
            },
            registry: match (lower.registry, higher.registry) {
                (Some(lower_registry), Some(higher_registry)) => Some(RegistryConfig {
                    base: higher_registry.base.or(lower_registry.base),
                    override_path: higher_registry
                        .override_path
                        .or(lower_registry.override_path),
                }),
                (lower_registry, higher_registry) => higher_registry.or(lower_registry),
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), WhoisError> {
        if let Some(defaults) = &config.defaults {
            if let Some(concurrency) = defaults.concurrency {
                if concurrency == 0 || concurrency > 100 {
                    return Err(WhoisError::config("Concurrency must be between 1 and 100"));
                }
            }

            let timeouts = [
                ("connect_timeout", &defaults.connect_timeout),
                ("read_timeout", &defaults.read_timeout),
                ("http_timeout", &defaults.http_timeout),
            ];
            for (name, value) in timeouts {
                if let Some(value) = value {
                    require_timeout(name, value)?;
                }
            }
        }

        Ok(())
    }
}

/// Environment variable configuration that mirrors CLI options.
///
/// This represents configuration values that can be set via `WC_*`
/// environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub concurrency: Option<usize>,
    pub connect_timeout: Option<Duration>,
    pub read_timeout: Option<Duration>,
    pub http_timeout: Option<Duration>,
    pub registry: Option<PathBuf>,
    pub registry_override: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

impl EnvConfig {
    /// Parse `WC_*` variables through `lookup`.
    ///
    /// Invalid values are logged as warnings and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut env_config = EnvConfig::default();

        if let Some(val) = lookup("WC_CONCURRENCY") {
            match val.trim().parse::<usize>() {
                Ok(concurrency) if (1..=100).contains(&concurrency) => {
                    debug!("Using WC_CONCURRENCY={}", concurrency);
                    env_config.concurrency = Some(concurrency);
                }
                _ => warn!("Invalid WC_CONCURRENCY='{}', must be 1-100", val),
            }
        }

        let timeouts = [
            ("WC_CONNECT_TIMEOUT", &mut env_config.connect_timeout),
            ("WC_READ_TIMEOUT", &mut env_config.read_timeout),
            ("WC_HTTP_TIMEOUT", &mut env_config.http_timeout),
        ];
        for (name, slot) in timeouts {
            if let Some(val) = lookup(name) {
                match parse_timeout(&val) {
                    Some(timeout) => {
                        debug!("Using {}={}", name, val);
                        *slot = Some(timeout);
                    }
                    None => warn!(
                        "Invalid {}='{}', use format like '5s', '30s', '2m'",
                        name, val
                    ),
                }
            }
        }

        let paths = [
            ("WC_REGISTRY", &mut env_config.registry),
            ("WC_REGISTRY_OVERRIDE", &mut env_config.registry_override),
            ("WC_CONFIG", &mut env_config.config),
        ];
        for (name, slot) in paths {
            if let Some(val) = lookup(name) {
                if !val.trim().is_empty() {
                    debug!("Using {}={}", name, val);
                    *slot = Some(PathBuf::from(val.trim()));
                }
            }
        }

        env_config
    }

    /// Apply these settings on top of `config`.
    pub fn apply_to(&self, mut config: CheckConfig) -> CheckConfig {
        if let Some(concurrency) = self.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(timeout) = self.connect_timeout {
            config = config.with_connect_timeout(timeout);
        }
        if let Some(timeout) = self.read_timeout {
            config = config.with_read_timeout(timeout);
        }
        if let Some(timeout) = self.http_timeout {
            config = config.with_http_timeout(timeout);
        }
        if let Some(path) = &self.registry {
            config = config.with_registry_path(path);
        }
        if let Some(path) = &self.registry_override {
            config = config.with_override_path(path);
        }
        config
    }
}

/// Load configuration from the process environment.
pub fn load_env_config() -> EnvConfig {
    EnvConfig::from_lookup(|key| env::var(key).ok())
}

/// Parse a timeout string like "5s", "2m", or "30" (seconds) into seconds.
///
/// Returns `None` for malformed values and for zero.
pub fn parse_timeout_string(timeout_str: &str) -> Option<u64> {
    let timeout_str = timeout_str.trim().to_lowercase();

    let seconds = if let Some(secs) = timeout_str.strip_suffix('s') {
        secs.parse::<u64>().ok()
    } else if let Some(mins) = timeout_str.strip_suffix('m') {
        mins.parse::<u64>().ok().and_then(|m| m.checked_mul(60))
    } else {
        timeout_str.parse::<u64>().ok()
    }?;

    (seconds > 0).then_some(seconds)
}

/// [`parse_timeout_string`] as a `Duration`.
pub fn parse_timeout(timeout_str: &str) -> Option<Duration> {
    parse_timeout_string(timeout_str).map(Duration::from_secs)
}

fn require_timeout(name: &str, value: &str) -> Result<Duration, WhoisError> {
    parse_timeout(value).ok_or_else(|| {
        WhoisError::config(format!(
            "Invalid {} '{}'. Use format like '5s', '30s', '2m'",
            name, value
        ))
    })
}
