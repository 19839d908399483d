// crates/booking-probe/src/cases.rs
// ============================================================================
// Module: Probe Cases
// Description: The fixed case battery: requests and verdict rules.
// Purpose: Describe each probe as a request plus a pure classification.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Each [`CaseId`] knows the request it sends and how to judge the response.
//! Both halves are pure: the verifier owns I/O, so every verdict rule can be
//! exercised with canned responses.
//! Invariants:
//! - [`CASE_ORDER`] lists every case exactly once, in run order.
//! - Error-text checks for validation messages are case-sensitive; database
//!   signatures are matched case-insensitively.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::config::DegradationMode;
use crate::fixtures::INVALID_ENDPOINT_PATH;
use crate::fixtures::MALFORMED_JSON_BODY;
use crate::fixtures::ProbeFixtures;
use crate::outcome::CaseOutcome;
use crate::transport::JSON_CONTENT_TYPE;
use crate::transport::ProbeBody;
use crate::transport::ProbeMethod;
use crate::transport::ProbeRequest;
use crate::transport::ProbeResponse;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Headers a CORS preflight response must carry.
pub const REQUIRED_CORS_HEADERS: [&str; 3] = [
    "Access-Control-Allow-Origin",
    "Access-Control-Allow-Methods",
    "Access-Control-Allow-Headers",
];

/// Signature of a missing table in catalog lookups.
const CATALOG_SIGNATURES: &[&str] = &["relation"];
/// Signatures of a missing table in availability and booking calls.
const BOOKING_SIGNATURES: &[&str] = &["relation", "table"];

/// Validation message expected for bare availability queries.
const MISSING_PARAMETERS: &str = "Missing required parameters";
/// Validation message expected for empty appointment bodies.
const MISSING_FIELDS: &str = "Missing required fields";
/// Error expected when the tenant does not exist.
const TENANT_NOT_FOUND: &str = "Tenant not found";

/// Every case in run order.
pub const CASE_ORDER: [CaseId; 12] = [
    CaseId::CorsPreflight,
    CaseId::ClientConfig,
    CaseId::GetTenant,
    CaseId::GetServices,
    CaseId::GetStaff,
    CaseId::AvailabilityMissingParams,
    CaseId::AvailabilityWithParams,
    CaseId::AvailabilityAlgorithmStructure,
    CaseId::AppointmentMissingFields,
    CaseId::AppointmentWithData,
    CaseId::RequestValidation,
    CaseId::InvalidEndpoint,
];

// ============================================================================
// SECTION: Case Identity
// ============================================================================

/// Identifier of a probe case.
///
/// # Invariants
/// - Variants and their labels are stable for reports and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseId {
    /// OPTIONS preflight on the tenant lookup.
    CorsPreflight,
    /// Tenant lookup returns structured errors from the data layer.
    ClientConfig,
    /// Tenant lookup.
    GetTenant,
    /// Service catalog listing.
    GetServices,
    /// Staff listing.
    GetStaff,
    /// Availability without query parameters.
    AvailabilityMissingParams,
    /// Availability with fabricated parameters.
    AvailabilityWithParams,
    /// Availability for a tenant that should not exist.
    AvailabilityAlgorithmStructure,
    /// Appointment creation with an empty body.
    AppointmentMissingFields,
    /// Appointment creation with a full payload.
    AppointmentWithData,
    /// Appointment creation with an unparseable body.
    RequestValidation,
    /// Route outside the API surface.
    InvalidEndpoint,
}

/// Inputs shared by every case in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseContext {
    /// Tenant slug substituted into paths.
    pub tenant_slug: String,
    /// Date-relative inputs.
    pub fixtures: ProbeFixtures,
    /// Degradation policy.
    pub degradation: DegradationMode,
}

impl CaseId {
    /// Display name used in reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CorsPreflight => "CORS Preflight",
            Self::ClientConfig => "Database Client Config",
            Self::GetTenant => "Get Tenant",
            Self::GetServices => "Get Services",
            Self::GetStaff => "Get Staff",
            Self::AvailabilityMissingParams => "Availability Missing Params",
            Self::AvailabilityWithParams => "Availability With Params",
            Self::AvailabilityAlgorithmStructure => "Availability Algorithm Structure",
            Self::AppointmentMissingFields => "Create Appointment Missing Fields",
            Self::AppointmentWithData => "Create Appointment With Data",
            Self::RequestValidation => "Request Validation",
            Self::InvalidEndpoint => "Invalid Endpoint",
        }
    }

    /// Stable snake-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CorsPreflight => "cors_preflight",
            Self::ClientConfig => "client_config",
            Self::GetTenant => "get_tenant",
            Self::GetServices => "get_services",
            Self::GetStaff => "get_staff",
            Self::AvailabilityMissingParams => "availability_missing_params",
            Self::AvailabilityWithParams => "availability_with_params",
            Self::AvailabilityAlgorithmStructure => "availability_algorithm_structure",
            Self::AppointmentMissingFields => "appointment_missing_fields",
            Self::AppointmentWithData => "appointment_with_data",
            Self::RequestValidation => "request_validation",
            Self::InvalidEndpoint => "invalid_endpoint",
        }
    }

    /// Builds the request this case sends.
    #[must_use]
    pub fn request(self, ctx: &CaseContext) -> ProbeRequest {
        let tenant = format!("/tenants/{}", ctx.tenant_slug);
        match self {
            Self::CorsPreflight => ProbeRequest::new(ProbeMethod::Options, tenant),
            Self::ClientConfig | Self::GetTenant => ProbeRequest::new(ProbeMethod::Get, tenant),
            Self::GetServices => ProbeRequest::new(ProbeMethod::Get, format!("{tenant}/services")),
            Self::GetStaff => ProbeRequest::new(ProbeMethod::Get, format!("{tenant}/staff")),
            Self::AvailabilityMissingParams => {
                ProbeRequest::new(ProbeMethod::Get, format!("{tenant}/availability"))
            }
            Self::AvailabilityWithParams => {
                ProbeRequest::new(ProbeMethod::Get, format!("{tenant}/availability"))
                    .with_query(ctx.fixtures.availability_query())
            }
            Self::AvailabilityAlgorithmStructure => {
                ProbeRequest::new(ProbeMethod::Get, format!("{tenant}/availability"))
                    .with_query(ctx.fixtures.booking_availability_query())
            }
            Self::AppointmentMissingFields => {
                ProbeRequest::new(ProbeMethod::Post, format!("{tenant}/appointments"))
                    .with_body(ProbeBody::Json(json!({})))
            }
            Self::AppointmentWithData => {
                ProbeRequest::new(ProbeMethod::Post, format!("{tenant}/appointments"))
                    .with_body(ProbeBody::Json(ctx.fixtures.appointment_payload()))
            }
            Self::RequestValidation => {
                ProbeRequest::new(ProbeMethod::Post, format!("{tenant}/appointments")).with_body(
                    ProbeBody::Raw {
                        content_type: JSON_CONTENT_TYPE,
                        text: MALFORMED_JSON_BODY.to_string(),
                    },
                )
            }
            Self::InvalidEndpoint => ProbeRequest::new(ProbeMethod::Get, INVALID_ENDPOINT_PATH),
        }
    }

    /// Judges a response received for this case.
    #[must_use]
    pub fn classify(self, response: &ProbeResponse, mode: DegradationMode) -> CaseOutcome {
        match self {
            Self::CorsPreflight => classify_cors(response),
            Self::ClientConfig => classify_client_config(response),
            Self::GetTenant => classify_lookup(response, None, mode),
            Self::GetServices | Self::GetStaff => {
                classify_lookup(response, Some(CATALOG_SIGNATURES), mode)
            }
            Self::AvailabilityWithParams | Self::AppointmentWithData => {
                classify_lookup(response, Some(BOOKING_SIGNATURES), mode)
            }
            Self::AvailabilityMissingParams => {
                classify_validation(response, 400, MISSING_PARAMETERS, "missing parameters")
            }
            Self::AppointmentMissingFields => {
                classify_validation(response, 400, MISSING_FIELDS, "missing fields")
            }
            Self::AvailabilityAlgorithmStructure => classify_unknown_tenant(response),
            Self::RequestValidation => classify_malformed_request(response),
            Self::InvalidEndpoint => classify_invalid_endpoint(response),
        }
    }
}

// ============================================================================
// SECTION: Error Body Parsing
// ============================================================================

/// The `error` field of a response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorField {
    /// Body is not a JSON object.
    Invalid,
    /// Body is a JSON object without an `error` key.
    Missing,
    /// Body carries an `error` value.
    Present(Value),
}

impl ErrorField {
    /// Parses the `error` field out of a response body.
    #[must_use]
    pub fn parse(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(Value::Object(mut map)) => map.remove("error").map_or(Self::Missing, Self::Present),
            _ => Self::Invalid,
        }
    }

    /// Error value as text, when it is a JSON string.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Present(Value::String(text)) => Some(text),
            _ => None,
        }
    }

    /// Renders the error value for messages, or `fallback` when absent.
    #[must_use]
    pub fn display_or(&self, fallback: &str) -> String {
        match self {
            Self::Present(Value::String(text)) => text.clone(),
            Self::Present(other) => other.to_string(),
            Self::Missing | Self::Invalid => fallback.to_string(),
        }
    }
}

/// Returns true when the error text matches any signature, ignoring case.
fn matches_signature(text: &str, signatures: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    signatures.iter().any(|signature| lowered.contains(signature))
}

// ============================================================================
// SECTION: Classification Rules
// ============================================================================

/// 200 plus all three CORS headers.
fn classify_cors(response: &ProbeResponse) -> CaseOutcome {
    if response.status != 200 {
        return CaseOutcome::assertion_failed(format!("Expected 200, got {}", response.status));
    }
    let missing: Vec<&str> = REQUIRED_CORS_HEADERS
        .iter()
        .copied()
        .filter(|name| response.header(name).is_none())
        .collect();
    if missing.is_empty() {
        CaseOutcome::passed("All CORS headers present")
    } else {
        CaseOutcome::assertion_failed(format!("Missing CORS headers: {}", missing.join(", ")))
    }
}

/// 404 or 500 with an `error` field means the data layer answers.
fn classify_client_config(response: &ProbeResponse) -> CaseOutcome {
    if !matches!(response.status, 404 | 500) {
        return CaseOutcome::assertion_failed(format!(
            "Unexpected status code: {}",
            response.status
        ));
    }
    match ErrorField::parse(&response.body) {
        ErrorField::Present(_) => {
            CaseOutcome::passed("Database client configured - returns structured errors")
        }
        ErrorField::Missing => CaseOutcome::assertion_failed("Response missing error structure"),
        ErrorField::Invalid => {
            CaseOutcome::malformed_body("Invalid JSON response from database calls")
        }
    }
}

/// Lookup-shaped endpoints: structured 4xx passes, 500 is judged by
/// `signatures`, anything else is tolerated.
///
/// With `signatures == None` every 500 is a crash.
fn classify_lookup(
    response: &ProbeResponse,
    signatures: Option<&[&str]>,
    mode: DegradationMode,
) -> CaseOutcome {
    match response.status {
        500 => classify_server_error(response, signatures, mode),
        400 | 404 => match ErrorField::parse(&response.body) {
            error @ ErrorField::Present(_) => {
                CaseOutcome::passed(format!("Proper error handling: {}", error.display_or("")))
            }
            ErrorField::Missing => {
                CaseOutcome::assertion_failed("Error response missing 'error' field")
            }
            ErrorField::Invalid => CaseOutcome::malformed_body("Invalid JSON in error response"),
        },
        status => CaseOutcome::tolerated(format!("Unexpected response: {status}")),
    }
}

/// Judges a 500 on a lookup-shaped endpoint.
fn classify_server_error(
    response: &ProbeResponse,
    signatures: Option<&[&str]>,
    mode: DegradationMode,
) -> CaseOutcome {
    let Some(signatures) = signatures else {
        return CaseOutcome::assertion_failed("API crashed with 500 error")
            .with_payload(response.body.clone());
    };
    let error = ErrorField::parse(&response.body);
    if error == ErrorField::Invalid {
        return CaseOutcome::malformed_body("500 error with invalid JSON response")
            .with_payload(response.body.clone());
    }
    let text = error.display_or("Unknown");
    let recognized = error.text().is_some_and(|text| matches_signature(text, signatures));
    match (recognized, mode) {
        (true, DegradationMode::TolerateUninitializedDatabase) => {
            CaseOutcome::degraded(format!("Expected database error: {text}"))
        }
        (true, DegradationMode::Strict) => {
            CaseOutcome::assertion_failed(format!("Database error rejected in strict mode: {text}"))
                .with_payload(response.body.clone())
        }
        (false, _) => CaseOutcome::assertion_failed(format!("Unexpected 500 error: {text}"))
            .with_payload(response.body.clone()),
    }
}

/// Exact status plus an error containing `needle`.
fn classify_validation(
    response: &ProbeResponse,
    expected_status: u16,
    needle: &str,
    what: &str,
) -> CaseOutcome {
    if response.status != expected_status {
        return CaseOutcome::assertion_failed(format!(
            "Expected {expected_status}, got {}",
            response.status
        ));
    }
    let error = ErrorField::parse(&response.body);
    if error == ErrorField::Invalid {
        return CaseOutcome::malformed_body("Invalid JSON in error response");
    }
    if error.text().is_some_and(|text| text.contains(needle)) {
        CaseOutcome::passed(format!("Proper validation for {what}"))
    } else {
        CaseOutcome::assertion_failed(format!(
            "Unexpected error message: {}",
            error.display_or("None")
        ))
    }
}

/// Availability for an unknown tenant must be a 404 naming the tenant.
fn classify_unknown_tenant(response: &ProbeResponse) -> CaseOutcome {
    if response.status != 404 {
        return CaseOutcome::assertion_failed(format!(
            "Unexpected status code: {}",
            response.status
        ));
    }
    let error = ErrorField::parse(&response.body);
    if error == ErrorField::Invalid {
        return CaseOutcome::malformed_body("Invalid JSON response");
    }
    if error.text().is_some_and(|text| text.contains(TENANT_NOT_FOUND)) {
        CaseOutcome::passed("Algorithm handles missing tenant gracefully")
    } else {
        CaseOutcome::assertion_failed(format!("Unexpected error: {}", error.display_or("None")))
    }
}

/// Unparseable bodies must be rejected, not crash the handler.
fn classify_malformed_request(response: &ProbeResponse) -> CaseOutcome {
    if matches!(response.status, 400 | 404) {
        CaseOutcome::passed(format!("Handles malformed JSON properly: {}", response.status))
    } else {
        CaseOutcome::assertion_failed(format!(
            "Unexpected response to malformed JSON: {}",
            response.status
        ))
        .with_payload(response.body.clone())
    }
}

/// Unknown routes must 404 with an `error` field.
fn classify_invalid_endpoint(response: &ProbeResponse) -> CaseOutcome {
    if response.status != 404 {
        return CaseOutcome::assertion_failed(format!("Expected 404, got {}", response.status));
    }
    match ErrorField::parse(&response.body) {
        error @ ErrorField::Present(_) => {
            CaseOutcome::passed(format!("Proper 404 handling: {}", error.display_or("")))
        }
        ErrorField::Missing => CaseOutcome::assertion_failed("404 response missing 'error' field"),
        ErrorField::Invalid => CaseOutcome::malformed_body("Invalid JSON in 404 response"),
    }
}
