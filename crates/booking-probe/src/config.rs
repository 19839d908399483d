// crates/booking-probe/src/config.rs
// ============================================================================
// Module: Probe Configuration
// Description: Target and policy configuration for a probe run.
// Purpose: Resolve defaults, TOML files, environment, and CLI overrides.
// Dependencies: serde, thiserror, toml, url
// ============================================================================

//! ## Overview
//! A [`ProbeConfig`] is built once per run and handed to the verifier. Values
//! are layered: built-in defaults, an optional TOML file, `BOOKING_PROBE_*`
//! environment variables, then explicit overrides. Every layer is validated
//! and invalid input fails closed before any request is sent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::fixtures::DEFAULT_TENANT_SLUG;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default API base URL of a locally running booking service.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";
/// Environment variable used to locate a config file.
pub const CONFIG_ENV_VAR: &str = "BOOKING_PROBE_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum tenant slug length.
pub const MAX_TENANT_SLUG_LENGTH: usize = 128;

// ============================================================================
// SECTION: Environment Keys
// ============================================================================

/// Environment keys read during config resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeEnv {
    /// Target API base URL.
    BaseUrl,
    /// Tenant slug to probe.
    Tenant,
    /// Request timeout in seconds (positive integer).
    TimeoutSeconds,
    /// Strict degradation mode (`true`/`false` or `1`/`0`).
    Strict,
}

impl ProbeEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BaseUrl => "BOOKING_PROBE_BASE_URL",
            Self::Tenant => "BOOKING_PROBE_TENANT",
            Self::TimeoutSeconds => "BOOKING_PROBE_TIMEOUT_SEC",
            Self::Strict => "BOOKING_PROBE_STRICT",
        }
    }
}

// ============================================================================
// SECTION: Degradation Mode
// ============================================================================

/// How server errors with an uninitialized-database signature are judged.
///
/// # Invariants
/// - Only the services, staff, availability, and appointment cases consult
///   the mode; the other cases judge 500 responses on their own terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationMode {
    /// Accept a 500 whose error names a missing relation or table.
    #[default]
    TolerateUninitializedDatabase,
    /// Treat every 500 as a contract violation.
    Strict,
}

impl DegradationMode {
    /// Returns a stable label for the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TolerateUninitializedDatabase => "tolerate_uninitialized_database",
            Self::Strict => "strict",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Resolved configuration for a single probe run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// API base URL; case paths are appended to it.
    pub base_url: Url,
    /// Tenant slug substituted into tenant-scoped paths.
    pub tenant_slug: String,
    /// Optional per-request timeout. `None` keeps the client default.
    pub timeout: Option<Duration>,
    /// Degradation policy for server errors.
    pub degradation: DegradationMode,
}

/// On-disk TOML configuration. All fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeConfigFile {
    /// Target API base URL.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Tenant slug.
    #[serde(default)]
    pub tenant: Option<String>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Degradation policy.
    #[serde(default)]
    pub degradation: Option<DegradationMode>,
}

/// Highest-precedence overrides, typically from CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Target API base URL.
    pub base_url: Option<String>,
    /// Tenant slug.
    pub tenant: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// Force strict degradation mode.
    pub strict: bool,
}

impl ProbeConfig {
    /// Builds a config for `base_url` with default tenant and policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the base URL is rejected.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: validate_base_url(base_url)?,
            tenant_slug: DEFAULT_TENANT_SLUG.to_string(),
            timeout: None,
            degradation: DegradationMode::default(),
        })
    }

    /// Replaces the tenant slug.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the slug is rejected.
    pub fn with_tenant(mut self, slug: &str) -> Result<Self, ConfigError> {
        self.tenant_slug = validate_tenant_slug(slug)?;
        Ok(self)
    }

    /// Sets a per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the degradation policy.
    #[must_use]
    pub const fn with_degradation(mut self, degradation: DegradationMode) -> Self {
        self.degradation = degradation;
        self
    }

    /// Resolves configuration from defaults, file, environment, and overrides.
    ///
    /// The file is read from `path` when given, otherwise from the path in
    /// `BOOKING_PROBE_CONFIG` when set. Without either, no file is read.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when any layer fails to load or validate.
    pub fn resolve(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let mut config = Self::new(DEFAULT_BASE_URL)?;
        if let Some(path) = resolve_path(path)? {
            config.apply_file(&ProbeConfigFile::load(&path)?)?;
        }
        config.apply_env()?;
        config.apply_overrides(overrides)?;
        Ok(config)
    }

    /// Applies values from a parsed config file.
    fn apply_file(&mut self, file: &ProbeConfigFile) -> Result<(), ConfigError> {
        if let Some(base_url) = &file.base_url {
            self.base_url = validate_base_url(base_url)?;
        }
        if let Some(tenant) = &file.tenant {
            self.tenant_slug = validate_tenant_slug(tenant)?;
        }
        if let Some(secs) = file.timeout_secs {
            self.timeout = Some(timeout_from_secs("timeout_secs", secs)?);
        }
        if let Some(mode) = file.degradation {
            self.degradation = mode;
        }
        Ok(())
    }

    /// Applies `BOOKING_PROBE_*` environment values.
    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(base_url) = read_env_nonempty(ProbeEnv::BaseUrl.as_str())? {
            self.base_url = validate_base_url(&base_url)?;
        }
        if let Some(tenant) = read_env_nonempty(ProbeEnv::Tenant.as_str())? {
            self.tenant_slug = validate_tenant_slug(&tenant)?;
        }
        if let Some(raw) = read_env_nonempty(ProbeEnv::TimeoutSeconds.as_str())? {
            self.timeout = Some(parse_timeout_seconds(ProbeEnv::TimeoutSeconds.as_str(), &raw)?);
        }
        if let Some(raw) = read_env_nonempty(ProbeEnv::Strict.as_str())? {
            self.degradation = if parse_bool(ProbeEnv::Strict.as_str(), &raw)? {
                DegradationMode::Strict
            } else {
                DegradationMode::TolerateUninitializedDatabase
            };
        }
        Ok(())
    }

    /// Applies explicit overrides.
    fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> Result<(), ConfigError> {
        if let Some(base_url) = &overrides.base_url {
            self.base_url = validate_base_url(base_url)?;
        }
        if let Some(tenant) = &overrides.tenant {
            self.tenant_slug = validate_tenant_slug(tenant)?;
        }
        if let Some(secs) = overrides.timeout_secs {
            self.timeout = Some(timeout_from_secs("timeout", secs)?);
        }
        if overrides.strict {
            self.degradation = DegradationMode::Strict;
        }
        Ok(())
    }
}

impl ProbeConfigFile {
    /// Loads and parses a TOML config file with size and encoding limits.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        validate_path(path)?;
        let bytes = fs::read(path).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration loading or validation errors.
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
// SECTION: Validation
// ============================================================================

/// Parses and checks a base URL.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] for unparseable URLs, non-HTTP schemes,
/// missing hosts, or URLs carrying a query or fragment.
pub fn validate_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed)
        .map_err(|err| ConfigError::Invalid(format!("base_url is not a valid url: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid("base_url must use http or https".to_string()));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::Invalid("base_url must include a host".to_string()));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ConfigError::Invalid(
            "base_url must not include a query or fragment".to_string(),
        ));
    }
    Ok(url)
}

/// Checks a tenant slug: lowercase ASCII letters, digits, and hyphens.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the slug is empty, too long, or
/// contains other characters.
pub fn validate_tenant_slug(raw: &str) -> Result<String, ConfigError> {
    let slug = raw.trim();
    if slug.is_empty() {
        return Err(ConfigError::Invalid("tenant must be non-empty".to_string()));
    }
    if slug.len() > MAX_TENANT_SLUG_LENGTH {
        return Err(ConfigError::Invalid("tenant exceeds max length".to_string()));
    }
    if !slug.bytes().all(|byte| byte.is_ascii_lowercase() || byte.is_ascii_digit() || byte == b'-')
    {
        return Err(ConfigError::Invalid(
            "tenant must contain only lowercase letters, digits, and hyphens".to_string(),
        ));
    }
    Ok(slug.to_string())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the argument or environment.
fn resolve_path(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = path {
        return Ok(Some(path.to_path_buf()));
    }
    match read_env_nonempty(CONFIG_ENV_VAR)? {
        Some(env_path) if env_path.len() > MAX_TOTAL_PATH_LENGTH => {
            Err(ConfigError::Invalid("config path exceeds max length".to_string()))
        }
        Some(env_path) => Ok(Some(PathBuf::from(env_path))),
        None => Ok(None),
    }
}

/// Validates a config path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the value is not valid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, ConfigError> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("{name} must be valid UTF-8")))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the value is blank or not UTF-8.
pub fn read_env_nonempty(name: &str) -> Result<Option<String>, ConfigError> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => {
            Err(ConfigError::Invalid(format!("{name} must not be empty")))
        }
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive timeout in seconds.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when `raw` is not a positive integer.
pub fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = raw.trim().parse().map_err(|_| {
        ConfigError::Invalid(format!("{name} must be a positive integer number of seconds"))
    })?;
    timeout_from_secs(name, secs)
}

/// Converts a seconds count into a non-zero timeout.
fn timeout_from_secs(name: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Invalid(format!("{name} must be greater than zero")));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a boolean literal.
fn parse_bool(name: &str, raw: &str) -> Result<bool, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(ConfigError::Invalid(format!("{name} must be 1, 0, true, or false")))
}
