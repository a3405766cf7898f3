// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for flavor system tests.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: flavor-conformance
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 or empty values fail closed. When a suite
//! TOML file is named, environment overrides are applied on top of it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use flavor_conformance::SuiteConfig;

use crate::selection::TagSelection;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Optional suite TOML path.
    ConfigPath,
    /// Optional version-qualified management address of the service under test.
    ManagementUrl,
    /// Optional auth token sent as `X-Auth-Token`.
    AuthToken,
    /// Optional request timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Optional run root override.
    RunRoot,
    /// Optional comma-separated backend labels to run.
    Tags,
}

impl SystemTestEnv {
    /// Every key, in documentation order.
    pub const ALL: [Self; 6] = [
        Self::ConfigPath,
        Self::ManagementUrl,
        Self::AuthToken,
        Self::TimeoutSeconds,
        Self::RunRoot,
        Self::Tags,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigPath => "FLAVOR_SYSTEM_TEST_CONFIG",
            Self::ManagementUrl => "FLAVOR_SYSTEM_TEST_MANAGEMENT_URL",
            Self::AuthToken => "FLAVOR_SYSTEM_TEST_AUTH_TOKEN",
            Self::TimeoutSeconds => "FLAVOR_SYSTEM_TEST_TIMEOUT_SEC",
            Self::RunRoot => "FLAVOR_SYSTEM_TEST_RUN_ROOT",
            Self::Tags => "FLAVOR_SYSTEM_TEST_TAGS",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Optional suite TOML path.
    pub config_path: Option<PathBuf>,
    /// Optional management address override.
    pub management_url: Option<String>,
    /// Optional auth token override.
    pub auth_token: Option<String>,
    /// Optional request timeout override.
    pub timeout: Option<Duration>,
    /// Optional run root override.
    pub run_root: Option<PathBuf>,
    /// Optional backend label selection.
    pub tags: Option<TagSelection>,
}

impl std::fmt::Debug for SystemTestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemTestConfig")
            .field("config_path", &self.config_path)
            .field("management_url", &self.management_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("run_root", &self.run_root)
            .field("tags", &self.tags)
            .finish()
    }
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or fails validation (for example, an invalid timeout or tag list).
    pub fn load() -> Result<Self, String> {
        let config_path =
            read_env_nonempty(SystemTestEnv::ConfigPath.as_str())?.map(PathBuf::from);
        let management_url = read_env_nonempty(SystemTestEnv::ManagementUrl.as_str())?;
        let auth_token = read_env_nonempty(SystemTestEnv::AuthToken.as_str())?;
        let timeout = read_env_nonempty(SystemTestEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(SystemTestEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        let run_root = read_env_nonempty(SystemTestEnv::RunRoot.as_str())?.map(PathBuf::from);
        let tags = read_env_nonempty(SystemTestEnv::Tags.as_str())?
            .map(|value| {
                TagSelection::parse(&value)
                    .map_err(|err| format!("{}: {err}", SystemTestEnv::Tags.as_str()))
            })
            .transpose()?;
        Ok(Self {
            config_path,
            management_url,
            auth_token,
            timeout,
            run_root,
            tags,
        })
    }

    /// Returns true when a live service is named by file or address.
    #[must_use]
    pub const fn targets_live_service(&self) -> bool {
        self.config_path.is_some() || self.management_url.is_some()
    }

    /// Builds the suite configuration for a live service.
    ///
    /// The TOML file is loaded first when named; otherwise defaults are built
    /// around the management address. Environment overrides are then applied
    /// and the result is validated. Returns `Ok(None)` when no live service is
    /// configured.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be loaded or validation fails.
    pub fn suite_config(&self) -> Result<Option<SuiteConfig>, String> {
        let base = match (&self.config_path, &self.management_url) {
            (Some(path), _) => {
                SuiteConfig::load(Some(path.as_path())).map_err(|err| err.to_string())?
            }
            (None, Some(url)) => {
                SuiteConfig::for_management_url(url).map_err(|err| err.to_string())?
            }
            (None, None) => return Ok(None),
        };
        self.apply_overrides(base).map(Some)
    }

    /// Applies environment overrides to `config` and revalidates it.
    ///
    /// # Errors
    ///
    /// Returns an error when the overridden configuration is invalid.
    pub fn apply_overrides(&self, mut config: SuiteConfig) -> Result<SuiteConfig, String> {
        if let Some(url) = &self.management_url {
            config.service.management_url.clone_from(url);
        }
        if let Some(token) = &self.auth_token {
            config.service.auth_token = Some(token.clone());
        }
        if let Some(timeout) = self.timeout {
            config.http.timeout_ms = u64::try_from(timeout.as_millis()).map_err(|_| {
                format!("{} is out of range", SystemTestEnv::TimeoutSeconds.as_str())
            })?;
        }
        config.validate().map_err(|err| err.to_string())?;
        Ok(config)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value.trim().to_string())),
        None => Ok(None),
    }
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is non-numeric or zero.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}
