// system-tests/tests/suites/cli.rs
// ============================================================================
// Module: CLI Tests
// Description: Runs the booking-probe binary against the HTTP stub.
// Purpose: Ensure console output, report export, and exit codes end to end.
// Dependencies: system-tests helpers, booking-probe, serde_json
// ============================================================================

use std::path::PathBuf;

use helpers::artifacts::TestReporter;
use helpers::booking_stub::spawn_booking_stub;
use helpers::cli::cli_binary;
use helpers::cli::run_cli;
use serde_json::Value;

use crate::helpers;

fn binary() -> Result<PathBuf, String> {
    cli_binary().ok_or_else(|| "booking-probe binary unavailable".to_string())
}

#[tokio::test(flavor = "multi_thread")]
async fn cli_prints_results_and_writes_report() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("cli_prints_results_and_writes_report")?;
    let stub = spawn_booking_stub().await?;
    let report_path = reporter.artifacts().root().join("cli-report.json");
    let report_arg = report_path.to_string_lossy().into_owned();

    let output = run_cli(
        &binary()?,
        &["--base-url", stub.base_url(), "--report", &report_arg, "--fail-on-error"],
    )?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() {
        return Err(format!(
            "cli exited with {:?}: {stdout}\n{}",
            output.status,
            String::from_utf8_lossy(&output.stderr)
        )
        .into());
    }

    let lines: Vec<&str> = stdout.lines().collect();
    let expected_banner = format!("📍 Base URL: {}", stub.base_url());
    if !lines.contains(&expected_banner.as_str()) {
        return Err(format!("banner missing base URL: {stdout}").into());
    }
    let passes = lines.iter().filter(|line| line.starts_with("✅ PASS: ")).count();
    if passes != 12 {
        return Err(format!("expected 12 PASS lines, got {passes}: {stdout}").into());
    }
    if !lines.contains(&"📊 Test Summary: 12/12 tests passed") {
        return Err(format!("summary line missing: {stdout}").into());
    }

    let report: Value = serde_json::from_slice(&std::fs::read(&report_path)?)?;
    if report["summary"]["passed"] != 12 || report["tenant"] != "demo-barbershop" {
        return Err(format!("unexpected report: {report}").into());
    }

    reporter.finish(
        "pass",
        vec!["cli streamed 12 PASS lines and wrote the report".to_string()],
        vec!["cli-report.json".to_string()],
    )?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn failures_exit_zero_unless_requested() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("failures_exit_zero_unless_requested")?;
    let stub = spawn_booking_stub().await?;
    let binary = binary()?;

    let lenient = run_cli(&binary, &["--base-url", stub.base_url(), "--strict"])?;
    if !lenient.status.success() {
        return Err(format!("strict run without --fail-on-error exited {:?}", lenient.status).into());
    }
    let stdout = String::from_utf8_lossy(&lenient.stdout);
    if !stdout.contains("📊 Test Summary: 10/12 tests passed") {
        return Err(format!("unexpected strict summary: {stdout}").into());
    }

    let gated = run_cli(&binary, &["--base-url", stub.base_url(), "--strict", "--fail-on-error"])?;
    if gated.status.success() {
        return Err("strict run with --fail-on-error exited successfully".into());
    }

    reporter.finish("pass", vec!["exit code gated by --fail-on-error".to_string()], Vec::new())?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_config_exits_before_probing() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("invalid_config_exits_before_probing")?;
    let stub = spawn_booking_stub().await?;

    let output =
        run_cli(&binary()?, &["--base-url", stub.base_url(), "--tenant", "Not A Slug"])?;
    if output.status.success() {
        return Err("invalid tenant slug accepted".into());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.contains("configuration error") {
        return Err(format!("unexpected stderr: {stderr}").into());
    }
    if !stub.requests().is_empty() {
        return Err(format!("requests sent despite bad config: {:?}", stub.requests()).into());
    }

    reporter.finish("pass", vec!["bad config fails closed".to_string()], Vec::new())?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn events_file_records_run_lifecycle() -> Result<(), Box<dyn std::error::Error>> {
    let mut reporter = TestReporter::new("events_file_records_run_lifecycle")?;
    let stub = spawn_booking_stub().await?;
    let events_path = reporter.artifacts().root().join("events.jsonl");
    let events_arg = events_path.to_string_lossy().into_owned();
    let _ = std::fs::remove_file(&events_path);

    let output =
        run_cli(&binary()?, &["--base-url", stub.base_url(), "--events-file", &events_arg])?;
    if !output.status.success() {
        return Err(format!("cli exited with {:?}", output.status).into());
    }

    let contents = std::fs::read_to_string(&events_path)?;
    let events = contents
        .lines()
        .map(serde_json::from_str::<Value>)
        .collect::<Result<Vec<Value>, _>>()?;
    let kinds: Vec<&str> = events.iter().filter_map(|event| event["event"].as_str()).collect();
    if kinds.len() != 14
        || kinds.first() != Some(&"run_started")
        || kinds.last() != Some(&"run_finished")
    {
        return Err(format!("unexpected event stream: {kinds:?}").into());
    }

    reporter.finish(
        "pass",
        vec!["event log brackets 12 case events".to_string()],
        vec!["events.jsonl".to_string()],
    )?;
    Ok(())
}

#[test]
fn version_flag_prints_package_version() -> Result<(), Box<dyn std::error::Error>> {
    let output = run_cli(&binary()?, &["--version"])?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() || !stdout.starts_with("booking-probe ") {
        return Err(format!("unexpected version output: {stdout}").into());
    }
    Ok(())
}
