// system-tests/tests/helpers/harness.rs
// ============================================================================
// Module: Probe Harness
// Description: Builds verifiers pointed at stub or live targets.
// Purpose: Keep probe configuration identical across suites.
// Dependencies: booking-probe
// ============================================================================

use booking_probe::ContractVerifier;
use booking_probe::DegradationMode;
use booking_probe::HttpTransport;
use booking_probe::ProbeConfig;
use booking_probe::RunReport;

use crate::helpers::timeouts::PROBE_TIMEOUT;
use crate::helpers::timeouts::resolve_timeout;

/// Builds a probe configuration for `base_url` with the suite timeout.
pub fn probe_config(base_url: &str, mode: DegradationMode) -> Result<ProbeConfig, String> {
    let config = ProbeConfig::new(base_url).map_err(|err| err.to_string())?;
    Ok(config.with_timeout(resolve_timeout(PROBE_TIMEOUT)).with_degradation(mode))
}

/// Builds an HTTP verifier for `base_url`.
pub fn http_verifier(
    base_url: &str,
    mode: DegradationMode,
) -> Result<ContractVerifier<HttpTransport>, String> {
    ContractVerifier::http(probe_config(base_url, mode)?).map_err(|err| err.to_string())
}

/// Runs the full battery against `base_url` in tolerant mode.
pub async fn run_battery(base_url: &str) -> Result<RunReport, String> {
    run_battery_with(base_url, DegradationMode::TolerateUninitializedDatabase).await
}

/// Runs the full battery against `base_url` in `mode`.
pub async fn run_battery_with(base_url: &str, mode: DegradationMode) -> Result<RunReport, String> {
    Ok(http_verifier(base_url, mode)?.run().await)
}
