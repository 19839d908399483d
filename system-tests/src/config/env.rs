// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for system tests.
// Purpose: Map system-test env variables through the probe's strict readers.
// Dependencies: booking-probe
// ============================================================================

//! ## Overview
//! Environment values go through the same strict readers the probe uses for
//! its own `BOOKING_PROBE_*` variables: invalid UTF-8, blank values, and
//! non-positive timeouts fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use booking_probe::config;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Optional run root override for artifacts.
    RunRoot,
    /// Optional live booking API base URL; live suites skip when unset.
    TargetUrl,
    /// Optional tenant slug for the live target.
    TargetTenant,
    /// Optional timeout override in seconds (positive integer).
    TimeoutSeconds,
}

impl SystemTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "BOOKING_PROBE_SYSTEM_TEST_RUN_ROOT",
            Self::TargetUrl => "BOOKING_PROBE_SYSTEM_TEST_TARGET_URL",
            Self::TargetTenant => "BOOKING_PROBE_SYSTEM_TEST_TARGET_TENANT",
            Self::TimeoutSeconds => "BOOKING_PROBE_SYSTEM_TEST_TIMEOUT_SEC",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Optional run root override.
    pub run_root: Option<PathBuf>,
    /// Optional live target base URL.
    pub target_url: Option<String>,
    /// Optional live target tenant slug.
    pub target_tenant: Option<String>,
    /// Optional timeout override in seconds (positive integer).
    pub timeout: Option<Duration>,
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or fails validation (for example, an invalid timeout value).
    pub fn load() -> Result<Self, String> {
        let run_root = read_env_nonempty(SystemTestEnv::RunRoot.as_str())?.map(PathBuf::from);
        let target_url = read_env_nonempty(SystemTestEnv::TargetUrl.as_str())?;
        let target_tenant = read_env_nonempty(SystemTestEnv::TargetTenant.as_str())?;
        let timeout = read_env_nonempty(SystemTestEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(SystemTestEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        Ok(Self {
            run_root,
            target_url,
            target_tenant,
            timeout,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a non-empty environment variable with surrounding whitespace removed.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    config::read_env_nonempty(name)
        .map(|value| value.map(|value| value.trim().to_string()))
        .map_err(|err| err.to_string())
}

/// Parses a positive timeout in seconds.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    config::parse_timeout_seconds(name, raw).map_err(|err| err.to_string())
}
