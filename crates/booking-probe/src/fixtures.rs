// crates/booking-probe/src/fixtures.rs
// ============================================================================
// Module: Probe Fixtures
// Description: Hard-coded probe inputs and date-relative values.
// Purpose: Keep fabricated identifiers and appointment windows in one place.
// Dependencies: serde_json, time
// ============================================================================

//! ## Overview
//! Probe inputs are fabricated: none of these identifiers are expected to
//! exist on the target. Dates are relative to the day after the run's
//! reference date so the service sees a future booking window.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Value;
use serde_json::json;
use time::Date;
use time::Duration;
use time::OffsetDateTime;
use time::PrimitiveDateTime;
use time::Time;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::macros::time;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Tenant slug probed when none is configured.
pub const DEFAULT_TENANT_SLUG: &str = "demo-barbershop";
/// Staff identifier used by the plain availability probe.
pub const PROBE_STAFF_ID: &str = "test-staff-123";
/// Service identifier used by the plain availability probe.
pub const PROBE_SERVICE_ID: &str = "test-service-456";
/// Staff identifier used by booking-shaped probes.
pub const BOOKING_STAFF_ID: &str = "staff-joao-silva";
/// Service identifier used by booking-shaped probes.
pub const BOOKING_SERVICE_ID: &str = "service-corte-classico";
/// Route that no booking API serves.
pub const INVALID_ENDPOINT_PATH: &str = "/invalid/endpoint";
/// Body sent by the malformed-JSON probe.
pub const MALFORMED_JSON_BODY: &str = "invalid json";

/// Start of the fabricated appointment.
const APPOINTMENT_START: Time = time!(10:00);
/// Length of the fabricated appointment in minutes.
const APPOINTMENT_MINUTES: i64 = 30;
/// `YYYY-MM-DD`.
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
/// `YYYY-MM-DDTHH:MM:SS`, no offset.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Date-relative inputs for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeFixtures {
    /// Day the availability and appointment probes target.
    pub booking_date: Date,
}

impl ProbeFixtures {
    /// Targets the given day directly.
    #[must_use]
    pub const fn for_date(booking_date: Date) -> Self {
        Self {
            booking_date,
        }
    }

    /// Targets the day after `today`.
    #[must_use]
    pub fn day_after(today: Date) -> Self {
        Self::for_date(today.next_day().unwrap_or(today))
    }

    /// Targets tomorrow in the local time zone, falling back to UTC when the
    /// local offset cannot be determined.
    #[must_use]
    pub fn tomorrow() -> Self {
        let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
        Self::day_after(now.date())
    }

    /// Booking date as `YYYY-MM-DD`.
    #[must_use]
    pub fn date_param(&self) -> String {
        format_date(self.booking_date)
    }

    /// Appointment start and end as offset-free ISO-8601 timestamps.
    #[must_use]
    pub fn appointment_window(&self) -> (String, String) {
        let start = PrimitiveDateTime::new(self.booking_date, APPOINTMENT_START);
        let end = start.saturating_add(Duration::minutes(APPOINTMENT_MINUTES));
        (format_timestamp(start), format_timestamp(end))
    }

    /// Query parameters for the plain availability probe.
    #[must_use]
    pub fn availability_query(&self) -> Vec<(String, String)> {
        availability_query(PROBE_STAFF_ID, PROBE_SERVICE_ID, self.date_param())
    }

    /// Query parameters for the booking-shaped availability probe.
    #[must_use]
    pub fn booking_availability_query(&self) -> Vec<(String, String)> {
        availability_query(BOOKING_STAFF_ID, BOOKING_SERVICE_ID, self.date_param())
    }

    /// Fully populated appointment payload.
    #[must_use]
    pub fn appointment_payload(&self) -> Value {
        let (start_time, end_time) = self.appointment_window();
        json!({
            "staffId": BOOKING_STAFF_ID,
            "serviceId": BOOKING_SERVICE_ID,
            "startTime": start_time,
            "endTime": end_time,
            "customerData": {
                "name": "Carlos Silva",
                "email": "carlos.silva@email.com",
                "phone": "+5511987654321",
                "notes": "Primeira vez no salão"
            }
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds availability query pairs in the order the service documents them.
fn availability_query(staff_id: &str, service_id: &str, date: String) -> Vec<(String, String)> {
    vec![
        ("staff_id".to_string(), staff_id.to_string()),
        ("service_id".to_string(), service_id.to_string()),
        ("date".to_string(), date),
    ]
}

/// Formats a date as `YYYY-MM-DD`. Falls back to `Display`, which shares the layout.
fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT).unwrap_or_else(|_| date.to_string())
}

/// Formats a timestamp as `YYYY-MM-DDTHH:MM:SS`.
fn format_timestamp(value: PrimitiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).unwrap_or_else(|_| {
        format!("{}T{:02}:{:02}:{:02}", value.date(), value.hour(), value.minute(), value.second())
    })
}
