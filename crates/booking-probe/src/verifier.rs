// crates/booking-probe/src/verifier.rs
// ============================================================================
// Module: Contract Verifier
// Description: Sequential runner for the probe case battery.
// Purpose: Send each case's request, classify the reply, and record results.
// Dependencies: booking-probe cases, transport, events
// ============================================================================

//! ## Overview
//! [`ContractVerifier`] runs [`CASE_ORDER`] strictly in sequence, awaiting
//! each round trip before the next case starts. A transport failure becomes
//! a failed result for that case only; the run always completes and returns
//! every result in order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Instant;

use crate::cases::CASE_ORDER;
use crate::cases::CaseContext;
use crate::cases::CaseId;
use crate::config::DegradationMode;
use crate::config::ProbeConfig;
use crate::events::NoopEventSink;
use crate::events::ProbeEvent;
use crate::events::ProbeEventSink;
use crate::events::now_millis;
use crate::fixtures::ProbeFixtures;
use crate::outcome::CaseOutcome;
use crate::outcome::CaseResult;
use crate::report::RunReport;
use crate::transport::HttpTransport;
use crate::transport::ProbeRequest;
use crate::transport::ProbeTransport;
use crate::transport::TransportError;

// ============================================================================
// SECTION: Verifier
// ============================================================================

/// Runs the case battery against one target.
pub struct ContractVerifier<T> {
    /// Run configuration.
    config: ProbeConfig,
    /// Request transport.
    transport: T,
    /// Event destination.
    sink: Arc<dyn ProbeEventSink>,
    /// Date-relative inputs.
    fixtures: ProbeFixtures,
}

impl ContractVerifier<HttpTransport> {
    /// Builds a verifier that talks HTTP to `config.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Build`] when the HTTP client cannot be built.
    pub fn http(config: ProbeConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(config, transport))
    }
}

impl<T: ProbeTransport> ContractVerifier<T> {
    /// Builds a verifier over an arbitrary transport, targeting tomorrow.
    pub fn new(config: ProbeConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            sink: Arc::new(NoopEventSink),
            fixtures: ProbeFixtures::tomorrow(),
        }
    }

    /// Routes run events to `sink`.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn ProbeEventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Pins the date-relative inputs.
    #[must_use]
    pub const fn with_fixtures(mut self, fixtures: ProbeFixtures) -> Self {
        self.fixtures = fixtures;
        self
    }

    /// Returns the run configuration.
    #[must_use]
    pub const fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Returns the shared case inputs.
    #[must_use]
    pub fn context(&self) -> CaseContext {
        CaseContext {
            tenant_slug: self.config.tenant_slug.clone(),
            fixtures: self.fixtures,
            degradation: self.config.degradation,
        }
    }

    /// Runs every case and returns the ordered results.
    pub async fn run(&self) -> RunReport {
        self.run_with(|_| {}).await
    }

    /// Runs every case, calling `on_result` as each result is recorded.
    pub async fn run_with<F>(&self, mut on_result: F) -> RunReport
    where
        F: FnMut(&CaseResult),
    {
        let started = Instant::now();
        let mut report = RunReport::new(
            self.config.base_url.to_string(),
            self.config.tenant_slug.clone(),
            self.config.degradation,
        );
        self.sink.record(&ProbeEvent::RunStarted {
            timestamp_ms: now_millis(),
            target: report.target.clone(),
            tenant: report.tenant.clone(),
            degradation: report.degradation,
            cases: CASE_ORDER.len(),
        });
        let ctx = self.context();
        for (sequence, case) in CASE_ORDER.into_iter().enumerate() {
            let case_started = Instant::now();
            let request = case.request(&ctx);
            let result = self.execute(case, &request, ctx.degradation).await;
            self.sink.record(&ProbeEvent::CaseFinished {
                timestamp_ms: now_millis(),
                sequence,
                case,
                request: request.label(),
                outcome: result.kind,
                success: result.success,
                status: result.status,
                duration_ms: case_started.elapsed().as_millis(),
            });
            on_result(&result);
            report.push(result);
        }
        let summary = report.summary();
        self.sink.record(&ProbeEvent::RunFinished {
            timestamp_ms: now_millis(),
            passed: summary.passed,
            failed: summary.failed,
            total: summary.total,
            duration_ms: started.elapsed().as_millis(),
        });
        report
    }

    /// Runs a single case.
    pub async fn run_case(&self, case: CaseId) -> CaseResult {
        let ctx = self.context();
        self.execute(case, &case.request(&ctx), ctx.degradation).await
    }

    /// Sends the case request and classifies the outcome.
    async fn execute(
        &self,
        case: CaseId,
        request: &ProbeRequest,
        mode: DegradationMode,
    ) -> CaseResult {
        match self.transport.send(request).await {
            Ok(response) => {
                let outcome = case.classify(&response, mode);
                CaseResult::new(case, Some(response.status), outcome)
            }
            Err(err) => CaseResult::new(
                case,
                None,
                CaseOutcome::transport_failed(format!("Request failed: {err}")),
            ),
        }
    }
}
