// crates/booking-probe-cli/src/main.rs
// ============================================================================
// Module: Booking Probe CLI Entry Point
// Description: Runs the booking API contract battery from the command line.
// Purpose: Resolve configuration, stream results, and export run reports.
// Dependencies: booking-probe, clap, thiserror, tokio.
// ============================================================================

//! ## Overview
//! `booking-probe` resolves configuration from defaults, an optional TOML
//! file, `BOOKING_PROBE_*` environment variables, and flags, then runs every
//! contract case against the target and prints one line per case followed by
//! a summary. Configuration errors abort before any request is sent.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use booking_probe::ConfigOverrides;
use booking_probe::ContractVerifier;
use booking_probe::FileEventSink;
use booking_probe::NoopEventSink;
use booking_probe::ProbeConfig;
use booking_probe::ProbeEventSink;
use booking_probe::RunSummary;
use booking_probe::StderrEventSink;
use booking_probe::report::render_banner;
use booking_probe::report::render_result_line;
use booking_probe::report::render_summary;
use clap::ArgAction;
use clap::Parser;
use clap::ValueEnum;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "booking-probe", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue)]
    show_version: bool,
    /// TOML config file (overrides `BOOKING_PROBE_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Base URL of the booking API, e.g. `http://localhost:3000/api`.
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
    /// Tenant slug to probe.
    #[arg(long, value_name = "SLUG")]
    tenant: Option<String>,
    /// Per-request timeout in seconds.
    #[arg(long, value_name = "SECONDS")]
    timeout_secs: Option<u64>,
    /// Fail cases that only pass because the database is not provisioned.
    #[arg(long, action = ArgAction::SetTrue)]
    strict: bool,
    /// Write a canonical JSON report to this path.
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
    /// Emit JSON-line run events to a stream.
    #[arg(long, value_enum, value_name = "SINK", conflicts_with = "events_file")]
    events: Option<EventsArg>,
    /// Append JSON-line run events to a file.
    #[arg(long, value_name = "PATH")]
    events_file: Option<PathBuf>,
    /// Exit non-zero when any case fails.
    #[arg(long, action = ArgAction::SetTrue)]
    fail_on_error: bool,
}

impl Cli {
    /// Flag values that override file and environment configuration.
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.base_url.clone(),
            tenant: self.tenant.clone(),
            timeout_secs: self.timeout_secs,
            strict: self.strict,
        }
    }
}

/// Event stream targets.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum EventsArg {
    /// JSON lines on stderr.
    Stderr,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Resolves configuration and runs the battery.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("booking-probe {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = ProbeConfig::resolve(cli.config.as_deref(), &cli.overrides())
        .map_err(|err| CliError::new(format!("configuration error: {err}")))?;
    let sink = event_sink(cli.events, cli.events_file.as_deref())?;
    let verifier = ContractVerifier::http(config)
        .map_err(|err| CliError::new(format!("transport setup failed: {err}")))?
        .with_event_sink(sink);

    let config = verifier.config();
    for line in render_banner(config.base_url.as_str(), &config.tenant_slug, config.degradation) {
        write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }

    let mut write_failure = None;
    let report = verifier
        .run_with(|result| {
            if write_failure.is_none()
                && let Err(err) = write_stdout_line(&render_result_line(result))
            {
                write_failure = Some(err);
            }
        })
        .await;
    if let Some(err) = write_failure {
        return Err(CliError::new(output_error("stdout", &err)));
    }

    let summary = report.summary();
    for line in render_summary(&summary) {
        write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }

    if let Some(path) = &cli.report {
        report.write_json(path).map_err(|err| CliError::new(err.to_string()))?;
    }

    if should_fail(&summary, cli.fail_on_error) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the event sink selected by flags.
fn event_sink(
    events: Option<EventsArg>,
    events_file: Option<&Path>,
) -> CliResult<Arc<dyn ProbeEventSink>> {
    if let Some(path) = events_file {
        let sink = FileEventSink::new(path).map_err(|err| {
            CliError::new(format!("failed to open event log {}: {err}", path.display()))
        })?;
        return Ok(Arc::new(sink));
    }
    match events {
        Some(EventsArg::Stderr) => Ok(Arc::new(StderrEventSink)),
        None => Ok(Arc::new(NoopEventSink)),
    }
}

/// Returns true when the run should exit non-zero.
const fn should_fail(summary: &RunSummary, fail_on_error: bool) -> bool {
    fail_on_error && !summary.all_passed()
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream failure.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Reports an error and returns the failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
