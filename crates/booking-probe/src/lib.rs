// crates/booking-probe/src/lib.rs
// ============================================================================
// Module: Booking Probe
// Description: Black-box HTTP contract verifier for the booking service API.
// Purpose: Probe tenant, catalog, availability, and appointment endpoints.
// Dependencies: reqwest, serde, serde_json, thiserror, time, toml, url
// ============================================================================

//! ## Overview
//! This crate sends a fixed battery of HTTP probes to a running multi-tenant
//! booking service and classifies every response. The service itself is an
//! opaque collaborator: the probe only checks that errors come back as JSON
//! objects with an `error` field instead of unhandled crashes.
//! Invariants:
//! - Every case in [`CASE_ORDER`] yields exactly one [`CaseResult`].
//! - Results are appended in run order and never mutated.
//! - Transport failures are recorded per case and never abort a run.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cases;
pub mod config;
pub mod events;
pub mod fixtures;
pub mod outcome;
pub mod report;
pub mod transport;
pub mod verifier;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cases::CASE_ORDER;
pub use cases::CaseContext;
pub use cases::CaseId;
pub use config::ConfigError;
pub use config::ConfigOverrides;
pub use config::DegradationMode;
pub use config::ProbeConfig;
pub use events::FileEventSink;
pub use events::NoopEventSink;
pub use events::ProbeEvent;
pub use events::ProbeEventSink;
pub use events::StderrEventSink;
pub use fixtures::ProbeFixtures;
pub use outcome::CaseOutcome;
pub use outcome::CaseResult;
pub use outcome::OutcomeKind;
pub use outcome::RunSummary;
pub use report::ReportError;
pub use report::RunReport;
pub use transport::HttpTransport;
pub use transport::ProbeBody;
pub use transport::ProbeMethod;
pub use transport::ProbeRequest;
pub use transport::ProbeResponse;
pub use transport::ProbeTransport;
pub use transport::TransportError;
pub use verifier::ContractVerifier;
