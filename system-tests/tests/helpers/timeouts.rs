// system-tests/tests/helpers/timeouts.rs
// ============================================================================
// Module: System Test Timeouts
// Description: Centralized timeout configuration with env overrides.
// Purpose: Keep probe request timeouts consistent and configurable across suites.
// ============================================================================

use std::time::Duration;

use system_tests::config::SystemTestConfig;

/// Default per-request timeout for probes against the stub.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Returns the effective timeout, honoring `BOOKING_PROBE_SYSTEM_TEST_TIMEOUT_SEC` when set.
/// The override acts as a minimum to avoid shortening explicitly longer test timeouts.
#[must_use]
pub fn resolve_timeout(requested: Duration) -> Duration {
    match SystemTestConfig::load() {
        Ok(config) => config.timeout.map_or(requested, |value| requested.max(value)),
        Err(err) => panic!("{err}"),
    }
}
