// system-tests/tests/helpers/booking_stub.rs
// ============================================================================
// Module: Booking API Stub
// Description: Minimal multi-tenant booking API for system-tests.
// Purpose: Give the contract battery a real HTTP target with tunable replies.
// Dependencies: axum, serde_json, tokio
// ============================================================================

//! ## Overview
//! Serves the tenant-scoped booking routes over loopback. The default behavior
//! models a deployment whose database schema has not been provisioned: tenant
//! lookups 404, catalog reads fail with missing-relation errors, and
//! validation still runs before any data access.

use std::collections::HashMap;
use std::net::TcpListener as StdTcpListener;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use axum::Router;
use axum::body::Bytes;
use axum::extract::Query;
use axum::extract::State;
use axum::http::HeaderName;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::http::Uri;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use serde_json::Value;
use serde_json::json;
use tokio::runtime::Builder;
use tokio::sync::oneshot;

/// CORS headers the stub sends on preflight by default.
pub const CORS_HEADERS: [&str; 3] =
    ["access-control-allow-origin", "access-control-allow-methods", "access-control-allow-headers"];

/// Fields an appointment body must carry.
const APPOINTMENT_FIELDS: [&str; 5] =
    ["staffId", "serviceId", "startTime", "endTime", "customerData"];
/// Query parameters availability requires.
const AVAILABILITY_PARAMS: [&str; 3] = ["staff_id", "service_id", "date"];

// ============================================================================
// SECTION: Behavior
// ============================================================================

/// A canned status and raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubReply {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

impl StubReply {
    /// Reply with `{"error": message}`.
    pub fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            body: json!({ "error": message }).to_string(),
        }
    }

    /// Reply with an arbitrary JSON document.
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    /// Reply with a raw, possibly non-JSON body.
    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

/// Tunable stub behavior.
#[derive(Debug, Clone)]
pub struct StubBehavior {
    /// Headers included on preflight responses.
    pub cors_headers: Vec<&'static str>,
    /// Reply for tenant lookups.
    pub tenant: StubReply,
    /// Reply for service listings.
    pub services: StubReply,
    /// Reply for staff listings.
    pub staff: StubReply,
    /// Reply for availability with every parameter present.
    pub availability: StubReply,
    /// Reply for complete appointment bodies.
    pub appointment: StubReply,
    /// Reply for unparseable appointment bodies.
    pub malformed_appointment: StubReply,
    /// Reply for unknown routes.
    pub not_found: StubReply,
}

impl Default for StubBehavior {
    fn default() -> Self {
        Self {
            cors_headers: CORS_HEADERS.to_vec(),
            tenant: StubReply::error(404, "Tenant not found"),
            services: StubReply::error(500, "relation \"services\" does not exist"),
            staff: StubReply::error(500, "relation \"staff\" does not exist"),
            availability: StubReply::error(404, "Tenant not found"),
            appointment: StubReply::error(404, "Tenant not found"),
            malformed_appointment: StubReply::error(400, "Invalid JSON body"),
            not_found: StubReply::error(404, "Not found"),
        }
    }
}

impl StubBehavior {
    /// Drops one header from preflight responses.
    pub fn without_cors_header(mut self, name: &str) -> Self {
        self.cors_headers.retain(|header| !header.eq_ignore_ascii_case(name));
        self
    }

    /// Overrides the services reply.
    pub fn with_services(mut self, reply: StubReply) -> Self {
        self.services = reply;
        self
    }

    /// Overrides the tenant lookup reply.
    pub fn with_tenant(mut self, reply: StubReply) -> Self {
        self.tenant = reply;
        self
    }

    /// Overrides the reply for complete appointment bodies.
    pub fn with_appointment(mut self, reply: StubReply) -> Self {
        self.appointment = reply;
        self
    }

    /// Overrides the unknown-route reply.
    pub fn with_not_found(mut self, reply: StubReply) -> Self {
        self.not_found = reply;
        self
    }

    /// Overrides the malformed appointment reply.
    pub fn with_malformed_appointment(mut self, reply: StubReply) -> Self {
        self.malformed_appointment = reply;
        self
    }
}

// ============================================================================
// SECTION: Server Handle
// ============================================================================

struct StubState {
    behavior: StubBehavior,
    requests: Mutex<Vec<String>>,
}

/// Handle for the booking stub server; shuts it down on drop.
pub struct BookingStubHandle {
    base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
    join: Option<thread::JoinHandle<()>>,
    state: Arc<StubState>,
}

impl BookingStubHandle {
    /// Returns the API base URL, including the `/api` prefix.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns `METHOD path` for every request served, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }
}

impl Drop for BookingStubHandle {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

/// Spawns a booking stub with the default unprovisioned-database behavior.
pub async fn spawn_booking_stub() -> Result<BookingStubHandle, String> {
    spawn_booking_stub_with(StubBehavior::default()).await
}

/// Spawns a booking stub with custom behavior.
#[allow(clippy::unused_async, reason = "Async signature keeps helper API consistent in tests.")]
pub async fn spawn_booking_stub_with(
    behavior: StubBehavior,
) -> Result<BookingStubHandle, String> {
    let listener = StdTcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("booking stub bind failed: {err}"))?;
    listener
        .set_nonblocking(true)
        .map_err(|err| format!("booking stub listener nonblocking failed: {err}"))?;
    let addr =
        listener.local_addr().map_err(|err| format!("booking stub local addr failed: {err}"))?;
    let base_url = format!("http://{addr}/api");

    let state = Arc::new(StubState {
        behavior,
        requests: Mutex::new(Vec::new()),
    });
    let app = Router::new()
        .route("/api/tenants/{slug}", get(get_tenant).options(preflight))
        .route("/api/tenants/{slug}/services", get(get_services))
        .route("/api/tenants/{slug}/staff", get(get_staff))
        .route("/api/tenants/{slug}/availability", get(get_availability))
        .route("/api/tenants/{slug}/appointments", post(create_appointment))
        .fallback(not_found)
        .with_state(Arc::clone(&state));
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let join = thread::spawn(move || {
        let Ok(runtime) = Builder::new_current_thread().enable_all().build() else {
            return;
        };
        runtime.block_on(async move {
            let Ok(listener) = tokio::net::TcpListener::from_std(listener) else {
                return;
            };
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            let _ = server.await;
        });
    });
    Ok(BookingStubHandle {
        base_url,
        shutdown: Some(shutdown_tx),
        join: Some(join),
        state,
    })
}

/// Returns a loopback base URL with nothing listening behind it.
pub fn unreachable_base_url() -> Result<String, String> {
    let listener = StdTcpListener::bind("127.0.0.1:0")
        .map_err(|err| format!("probe port bind failed: {err}"))?;
    let addr = listener.local_addr().map_err(|err| format!("probe port addr failed: {err}"))?;
    drop(listener);
    Ok(format!("http://{addr}/api"))
}

// ============================================================================
// SECTION: Handlers
// ============================================================================

type SharedState = State<Arc<StubState>>;

async fn preflight(State(state): SharedState, uri: Uri) -> Response {
    record(&state, "OPTIONS", &uri);
    let mut response = StatusCode::OK.into_response();
    for name in state.behavior.cors_headers.iter().copied() {
        let value = match name {
            "access-control-allow-methods" => "GET, POST, OPTIONS",
            "access-control-allow-headers" => "Content-Type",
            _ => "*",
        };
        response
            .headers_mut()
            .insert(HeaderName::from_static(name), HeaderValue::from_static(value));
    }
    response
}

async fn get_tenant(State(state): SharedState, uri: Uri) -> Response {
    record(&state, "GET", &uri);
    reply(&state.behavior.tenant)
}

async fn get_services(State(state): SharedState, uri: Uri) -> Response {
    record(&state, "GET", &uri);
    reply(&state.behavior.services)
}

async fn get_staff(State(state): SharedState, uri: Uri) -> Response {
    record(&state, "GET", &uri);
    reply(&state.behavior.staff)
}

async fn get_availability(
    State(state): SharedState,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    record(&state, "GET", &uri);
    if AVAILABILITY_PARAMS.iter().any(|name| params.get(*name).is_none_or(String::is_empty)) {
        return reply(&StubReply::error(
            400,
            "Missing required parameters: staff_id, service_id, date",
        ));
    }
    reply(&state.behavior.availability)
}

async fn create_appointment(State(state): SharedState, uri: Uri, body: Bytes) -> Response {
    record(&state, "POST", &uri);
    let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(&body) else {
        return reply(&state.behavior.malformed_appointment);
    };
    if APPOINTMENT_FIELDS.iter().any(|name| !fields.contains_key(*name)) {
        return reply(&StubReply::error(400, "Missing required fields"));
    }
    reply(&state.behavior.appointment)
}

async fn not_found(State(state): SharedState, uri: Uri) -> Response {
    record(&state, "ANY", &uri);
    reply(&state.behavior.not_found)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn reply(canned: &StubReply) -> Response {
    let status = StatusCode::from_u16(canned.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(CONTENT_TYPE, "application/json")], canned.body.clone()).into_response()
}

fn record(state: &StubState, method: &str, uri: &Uri) {
    let Ok(mut guard) = state.requests.lock() else {
        return;
    };
    guard.push(format!("{method} {}", uri.path()));
}
