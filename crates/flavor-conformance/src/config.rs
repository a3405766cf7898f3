// crates/flavor-conformance/src/config.rs
// ============================================================================
// Module: Suite Configuration
// Description: Configuration loading and validation for the conformance suite.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: serde, thiserror, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size limits and
//! validated before use. The management base address is resolved here once and
//! handed explicitly to the link deriver and the transport.
//! Security posture: config inputs are untrusted; auth tokens are redacted from
//! debug output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::links::LinkDeriver;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "flavor-conformance.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "FLAVOR_CONFORMANCE_CONFIG";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of an auth token.
const MAX_AUTH_TOKEN_LENGTH: usize = 4096;
/// Minimum request timeout in milliseconds.
const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum request timeout in milliseconds.
const MAX_TIMEOUT_MS: u64 = 120_000;
/// Default request timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Default maximum response size in bytes.
const DEFAULT_MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;
/// Default user agent for outbound requests.
const DEFAULT_USER_AGENT: &str = "flavor-conformance/0.1";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Conformance suite configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuiteConfig {
    /// Target service settings.
    pub service: ServiceConfig,
    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,
    /// Audit log routing.
    #[serde(default)]
    pub audit: AuditSinkConfig,
}

/// Target service settings.
#[derive(Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Version-qualified management base address, e.g. `https://host/v1.1/`.
    pub management_url: String,
    /// Optional token sent as `X-Auth-Token`.
    #[serde(default)]
    pub auth_token: Option<String>,
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("management_url", &self.management_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// User agent string for outbound requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Maximum response size allowed, in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

/// Audit log routing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(tag = "sink", rename_all = "snake_case")]
pub enum AuditSinkConfig {
    /// JSON lines on stderr.
    Stderr,
    /// JSON lines appended to a file.
    File {
        /// Audit log path.
        path: PathBuf,
    },
    /// Events are discarded.
    #[default]
    #[serde(rename = "none")]
    Disabled,
}

impl SuiteConfig {
    /// Builds a default configuration around a management base address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the address is invalid.
    pub fn for_management_url(management_url: &str) -> Result<Self, ConfigError> {
        let config = Self {
            service: ServiceConfig {
                management_url: management_url.to_string(),
                auth_token: None,
            },
            http: HttpConfig::default(),
            audit: AuditSinkConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.service.validate()?;
        self.http.validate()?;
        if let AuditSinkConfig::File {
            path,
        } = &self.audit
            && path.as_os_str().is_empty()
        {
            return Err(ConfigError::Invalid("audit file sink requires a path".to_string()));
        }
        Ok(())
    }

    /// Returns a link deriver bound to the configured management address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the address is invalid.
    pub fn link_deriver(&self) -> Result<LinkDeriver, ConfigError> {
        LinkDeriver::new(&self.service.management_url)
            .map_err(|err| ConfigError::Invalid(err.to_string()))
    }
}

impl ServiceConfig {
    /// Validates the management address and token.
    fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(self.management_url.trim())
            .map_err(|err| ConfigError::Invalid(format!("service.management_url: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(
                "service.management_url must use http or https".to_string(),
            ));
        }
        LinkDeriver::new(&self.management_url)
            .map_err(|err| ConfigError::Invalid(format!("service.management_url: {err}")))?;
        if let Some(token) = &self.auth_token {
            if token.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "service.auth_token must not be empty".to_string(),
                ));
            }
            if token.len() > MAX_AUTH_TOKEN_LENGTH {
                return Err(ConfigError::Invalid(
                    "service.auth_token exceeds max length".to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl HttpConfig {
    /// Validates timeout, user agent, and size limits.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "http.timeout_ms must be between {MIN_TIMEOUT_MS} and {MAX_TIMEOUT_MS}"
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid("http.user_agent must not be empty".to_string()));
        }
        if self.max_response_bytes == 0 {
            return Err(ConfigError::Invalid(
                "http.max_response_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the caller or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Serde default for [`HttpConfig::timeout_ms`].
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Serde default for [`HttpConfig::user_agent`].
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Serde default for [`HttpConfig::max_response_bytes`].
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}
