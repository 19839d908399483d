// crates/booking-probe/src/outcome.rs
// ============================================================================
// Module: Case Outcomes
// Description: Verdict types produced by probe cases.
// Purpose: Distinguish passes, tolerated deviations, and failure causes.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A probe case ends in exactly one [`CaseOutcome`]. The outcome kind keeps
//! transport failures, contract violations, and unparseable bodies apart so
//! the run report can say why a case failed, not only that it did.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::cases::CaseId;

// ============================================================================
// SECTION: Outcome Kinds
// ============================================================================

/// Classification of a single case verdict.
///
/// # Invariants
/// - Variants are stable for report and event labeling.
/// - [`OutcomeKind::is_success`] is true exactly for `Passed`, `Degraded`, and `Tolerated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Response matched the contract.
    Passed,
    /// Server error carrying an uninitialized-database signature.
    Degraded,
    /// Unexpected status the case accepts as non-fatal.
    Tolerated,
    /// Status or body violated the contract.
    AssertionFailed,
    /// Response body was missing or not a JSON object.
    MalformedBody,
    /// Request never produced an HTTP response.
    TransportFailed,
}

impl OutcomeKind {
    /// Returns true when the outcome counts as a pass.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Passed | Self::Degraded | Self::Tolerated)
    }

    /// Returns a stable label for the outcome kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Degraded => "degraded",
            Self::Tolerated => "tolerated",
            Self::AssertionFailed => "assertion_failed",
            Self::MalformedBody => "malformed_body",
            Self::TransportFailed => "transport_failed",
        }
    }
}

// ============================================================================
// SECTION: Case Outcome
// ============================================================================

/// Verdict for one case before it is bound to a case identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseOutcome {
    /// Outcome classification.
    pub kind: OutcomeKind,
    /// Human-readable verdict message.
    pub message: String,
    /// Raw response payload retained for diagnostics.
    pub payload: Option<String>,
}

impl CaseOutcome {
    /// Builds an outcome of the given kind.
    pub fn new(kind: OutcomeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            payload: None,
        }
    }

    /// Contract satisfied.
    pub fn passed(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Passed, message)
    }

    /// Recognized uninitialized-database error.
    pub fn degraded(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Degraded, message)
    }

    /// Unexpected but non-fatal response.
    pub fn tolerated(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Tolerated, message)
    }

    /// Contract violated.
    pub fn assertion_failed(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::AssertionFailed, message)
    }

    /// Body could not be interpreted.
    pub fn malformed_body(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::MalformedBody, message)
    }

    /// Request failed before a response arrived.
    pub fn transport_failed(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::TransportFailed, message)
    }

    /// Attaches the raw response payload.
    #[must_use]
    pub fn with_payload(mut self, payload: impl Into<String>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Returns true when the outcome counts as a pass.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.kind.is_success()
    }
}

// ============================================================================
// SECTION: Case Result
// ============================================================================

/// Recorded result of one case in a run.
///
/// # Invariants
/// - `success == kind.is_success()`.
/// - Created once per case and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseResult {
    /// Case identifier.
    pub case: CaseId,
    /// Display name of the case.
    pub name: &'static str,
    /// Whether the case passed.
    pub success: bool,
    /// Outcome classification.
    pub kind: OutcomeKind,
    /// Human-readable verdict message.
    pub message: String,
    /// HTTP status when a response was received.
    pub status: Option<u16>,
    /// Raw response payload retained for diagnostics.
    pub response: Option<String>,
}

impl CaseResult {
    /// Binds an outcome to the case that produced it.
    #[must_use]
    pub fn new(case: CaseId, status: Option<u16>, outcome: CaseOutcome) -> Self {
        Self {
            case,
            name: case.name(),
            success: outcome.is_success(),
            kind: outcome.kind,
            message: outcome.message,
            status,
            response: outcome.payload,
        }
    }
}

// ============================================================================
// SECTION: Run Summary
// ============================================================================

/// Aggregate pass/fail counts for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RunSummary {
    /// Number of passing cases.
    pub passed: usize,
    /// Number of failing cases.
    pub failed: usize,
    /// Total number of cases.
    pub total: usize,
}

impl RunSummary {
    /// Counts passes and failures in a result list.
    #[must_use]
    pub fn from_results(results: &[CaseResult]) -> Self {
        let passed = results.iter().filter(|result| result.success).count();
        Self {
            passed,
            failed: results.len().saturating_sub(passed),
            total: results.len(),
        }
    }

    /// Returns true when every case passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}
