// crates/booking-probe/src/report.rs
// ============================================================================
// Module: Run Report
// Description: Ordered run results, console rendering, and JSON export.
// Purpose: Present verdicts to humans and persist them for tooling.
// Dependencies: serde, serde_jcs, thiserror
// ============================================================================

//! ## Overview
//! A [`RunReport`] owns the ordered result list of one run. Console lines are
//! rendered one at a time so the CLI can stream progress; the JSON export
//! uses canonical JCS serialization so identical runs produce identical bytes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::config::DegradationMode;
use crate::outcome::CaseResult;
use crate::outcome::OutcomeKind;
use crate::outcome::RunSummary;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Width of the console separator line.
pub const SEPARATOR_WIDTH: usize = 80;

// ============================================================================
// SECTION: Report
// ============================================================================

/// Results of one run in invocation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Target base URL.
    pub target: String,
    /// Tenant slug.
    pub tenant: String,
    /// Degradation policy in effect.
    pub degradation: DegradationMode,
    /// Case results in run order.
    pub results: Vec<CaseResult>,
}

/// Serialized report document.
#[derive(Serialize)]
struct ReportDocument<'a> {
    /// Target base URL.
    target: &'a str,
    /// Tenant slug.
    tenant: &'a str,
    /// Degradation policy in effect.
    degradation: DegradationMode,
    /// Aggregate counts.
    summary: RunSummary,
    /// Case results in run order.
    results: &'a [CaseResult],
}

impl RunReport {
    /// Creates an empty report for a target.
    #[must_use]
    pub const fn new(target: String, tenant: String, degradation: DegradationMode) -> Self {
        Self {
            target,
            tenant,
            degradation,
            results: Vec::new(),
        }
    }

    /// Appends a result.
    pub fn push(&mut self, result: CaseResult) {
        self.results.push(result);
    }

    /// Computes the pass/fail summary.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_results(&self.results)
    }

    /// Serializes the report as canonical JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Serialize`] when serialization fails.
    pub fn to_canonical_json(&self) -> Result<Vec<u8>, ReportError> {
        let document = ReportDocument {
            target: &self.target,
            tenant: &self.tenant,
            degradation: self.degradation,
            summary: self.summary(),
            results: &self.results,
        };
        serde_jcs::to_vec(&document).map_err(|err| ReportError::Serialize(err.to_string()))
    }

    /// Writes the canonical JSON report to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when serialization or the write fails.
    pub fn write_json(&self, path: &Path) -> Result<(), ReportError> {
        let mut bytes = self.to_canonical_json()?;
        bytes.push(b'\n');
        fs::write(path, bytes).map_err(|err| ReportError::Io(err.to_string()))
    }
}

/// Report export failures.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization failed.
    #[error("report serialization failed: {0}")]
    Serialize(String),
    /// Writing the report failed.
    #[error("report io error: {0}")]
    Io(String),
}

// ============================================================================
// SECTION: Console Rendering
// ============================================================================

/// Separator line printed around the case list.
#[must_use]
pub fn separator() -> String {
    "=".repeat(SEPARATOR_WIDTH)
}

/// Banner lines printed before the first case.
#[must_use]
pub fn render_banner(target: &str, tenant: &str, degradation: DegradationMode) -> Vec<String> {
    vec![
        "🧪 Starting Backend API Tests for Barbershop Booking System".to_string(),
        format!("📍 Base URL: {target}"),
        format!("🏪 Tenant: {tenant}"),
        format!("🛡️  Mode: {}", degradation.as_str()),
        separator(),
    ]
}

/// Progress line for one result.
///
/// Results other than a clean pass carry their outcome kind as a suffix.
#[must_use]
pub fn render_result_line(result: &CaseResult) -> String {
    let status = if result.success { "✅ PASS" } else { "❌ FAIL" };
    match result.kind {
        OutcomeKind::Passed => format!("{status}: {} - {}", result.name, result.message),
        kind => format!("{status}: {} - {} [{}]", result.name, result.message, kind.as_str()),
    }
}

/// Summary lines printed after the last case.
#[must_use]
pub fn render_summary(summary: &RunSummary) -> Vec<String> {
    let verdict = if summary.all_passed() {
        "🎉 All tests passed! API error handling is working correctly."
    } else {
        "⚠️  Some tests failed. Check the details above."
    };
    vec![
        separator(),
        format!("📊 Test Summary: {}/{} tests passed", summary.passed, summary.total),
        verdict.to_string(),
    ]
}
