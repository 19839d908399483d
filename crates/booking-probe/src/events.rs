// crates/booking-probe/src/events.rs
// ============================================================================
// Module: Probe Event Logging
// Description: Structured run events and sinks.
// Purpose: Emit machine-readable JSON-line logs without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The verifier reports progress as [`ProbeEvent`] values through a
//! [`ProbeEventSink`]. Sinks serialize events as JSON lines so runs can be
//! collected by whatever log pipeline wraps the probe. Response bodies are
//! never logged; they stay in the run report.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::cases::CaseId;
use crate::config::DegradationMode;
use crate::outcome::OutcomeKind;

// ============================================================================
// SECTION: Events
// ============================================================================

/// Structured event emitted during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProbeEvent {
    /// Run is about to send its first request.
    RunStarted {
        /// Event timestamp (milliseconds since epoch).
        timestamp_ms: u128,
        /// Target base URL.
        target: String,
        /// Tenant slug.
        tenant: String,
        /// Degradation policy.
        degradation: DegradationMode,
        /// Number of cases scheduled.
        cases: usize,
    },
    /// One case produced its result.
    CaseFinished {
        /// Event timestamp (milliseconds since epoch).
        timestamp_ms: u128,
        /// Zero-based position in the run.
        sequence: usize,
        /// Case identifier.
        case: CaseId,
        /// `METHOD /path` the case sent.
        request: String,
        /// Outcome classification.
        outcome: OutcomeKind,
        /// Whether the case passed.
        success: bool,
        /// HTTP status when a response was received.
        status: Option<u16>,
        /// Round-trip duration in milliseconds.
        duration_ms: u128,
    },
    /// Run completed every case.
    RunFinished {
        /// Event timestamp (milliseconds since epoch).
        timestamp_ms: u128,
        /// Passing cases.
        passed: usize,
        /// Failing cases.
        failed: usize,
        /// Total cases.
        total: usize,
        /// Run duration in milliseconds.
        duration_ms: u128,
    },
}

/// Current time in milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Destination for run events.
pub trait ProbeEventSink: Send + Sync {
    /// Records an event. Sinks must not fail the run.
    fn record(&self, event: &ProbeEvent);
}

/// Sink that writes JSON lines to stderr.
pub struct StderrEventSink;

impl ProbeEventSink for StderrEventSink {
    fn record(&self, event: &ProbeEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that appends JSON lines to a file.
pub struct FileEventSink {
    /// Open log file.
    file: Mutex<File>,
}

impl FileEventSink {
    /// Opens `path` for appending, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl ProbeEventSink for FileEventSink {
    fn record(&self, event: &ProbeEvent) {
        let Ok(payload) = serde_json::to_string(event) else {
            return;
        };
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{payload}");
        }
    }
}

/// Sink that discards events.
pub struct NoopEventSink;

impl ProbeEventSink for NoopEventSink {
    fn record(&self, _event: &ProbeEvent) {}
}
