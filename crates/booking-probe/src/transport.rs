// crates/booking-probe/src/transport.rs
// ============================================================================
// Module: Probe Transport
// Description: Request/response model and the HTTP transport for probes.
// Purpose: Isolate network I/O behind a trait so verdict logic stays pure.
// Dependencies: async-trait, reqwest, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! Cases describe requests as [`ProbeRequest`] values and judge plain
//! [`ProbeResponse`] values. [`HttpTransport`] turns the former into real
//! HTTP calls against the configured base URL. Redirects are not followed
//! and response bodies are capped at [`MAX_RESPONSE_BYTES`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::ProbeConfig;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum response body size kept by the HTTP transport.
pub const MAX_RESPONSE_BYTES: usize = 1024 * 1024;
/// Content type sent with JSON request bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

// ============================================================================
// SECTION: Request Model
// ============================================================================

/// HTTP methods issued by probe cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMethod {
    /// GET request.
    Get,
    /// POST request.
    Post,
    /// OPTIONS (CORS preflight) request.
    Options,
}

impl ProbeMethod {
    /// Returns the method token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Options => "OPTIONS",
        }
    }

    /// Converts to the reqwest method.
    fn to_reqwest(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Options => Method::OPTIONS,
        }
    }
}

/// Request body variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeBody {
    /// JSON document serialized at send time.
    Json(Value),
    /// Raw text sent verbatim with an explicit content type.
    Raw {
        /// Content type header value.
        content_type: &'static str,
        /// Body text.
        text: String,
    },
}

/// Transport-agnostic request description.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeRequest {
    /// HTTP method.
    pub method: ProbeMethod,
    /// Path appended to the base URL, starting with `/`.
    pub path: String,
    /// Query parameters in send order.
    pub query: Vec<(String, String)>,
    /// Optional body.
    pub body: Option<ProbeBody>,
}

impl ProbeRequest {
    /// `METHOD /path` label for diagnostics.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} {}", self.method.as_str(), self.path)
    }

    /// Builds a body-less request.
    pub fn new(method: ProbeMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Sets the query parameters.
    #[must_use]
    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: ProbeBody) -> Self {
        self.body = Some(body);
        self
    }
}

// ============================================================================
// SECTION: Response Model
// ============================================================================

/// Received HTTP response.
///
/// # Invariants
/// - Header names are stored lowercased; lookups are case-insensitive.
/// - The body is decoded lossily as UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProbeResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers keyed by lowercased name.
    pub headers: BTreeMap<String, String>,
    /// Response body text.
    pub body: String,
}

impl ProbeResponse {
    /// Builds an empty response with the given status.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: String::new(),
        }
    }

    /// Adds a header. Later values for the same name are ignored.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.entry(name.to_ascii_lowercase()).or_insert_with(|| value.into());
        self
    }

    /// Sets the body text.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn with_json(self, body: &Value) -> Self {
        self.with_body(body.to_string())
    }

    /// Looks up a header by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures that prevent a request from producing a response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP client construction failed.
    #[error("http client build failed: {0}")]
    Build(String),
    /// Target URL could not be formed.
    #[error("invalid request url: {0}")]
    Url(String),
    /// Request body could not be encoded.
    #[error("request body encoding failed: {0}")]
    Encode(String),
    /// Connection, DNS, timeout, or protocol failure.
    #[error("{0}")]
    Request(String),
    /// Response body exceeded the size limit.
    #[error("response exceeds size limit ({actual} > {limit})")]
    ResponseTooLarge {
        /// Bytes received before aborting.
        actual: usize,
        /// Maximum size in bytes.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Transport Trait
// ============================================================================

/// Sends probe requests and returns raw responses.
#[async_trait]
pub trait ProbeTransport: Send + Sync {
    /// Sends one request.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no HTTP response was obtained.
    async fn send(&self, request: &ProbeRequest) -> Result<ProbeResponse, TransportError>;
}

// ============================================================================
// SECTION: HTTP Transport
// ============================================================================

/// reqwest-backed transport rooted at a base URL.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// Underlying HTTP client.
    client: Client,
    /// Base URL that case paths are appended to.
    base_url: Url,
}

impl HttpTransport {
    /// Builds a transport from the run configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Build`] when the HTTP client cannot be built.
    pub fn new(config: &ProbeConfig) -> Result<Self, TransportError> {
        let mut builder = Client::builder().redirect(Policy::none());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|err| TransportError::Build(err.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Returns the base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves the full URL for a request.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Url`] when the joined URL does not parse.
    pub fn url_for(&self, request: &ProbeRequest) -> Result<Url, TransportError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let raw = format!("{base}{}", request.path);
        let mut url = Url::parse(&raw).map_err(|err| TransportError::Url(err.to_string()))?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl ProbeTransport for HttpTransport {
    async fn send(&self, request: &ProbeRequest) -> Result<ProbeResponse, TransportError> {
        let url = self.url_for(request)?;
        let mut builder = self.client.request(request.method.to_reqwest(), url);
        match &request.body {
            Some(ProbeBody::Json(value)) => {
                let bytes = serde_json::to_vec(value)
                    .map_err(|err| TransportError::Encode(err.to_string()))?;
                builder = builder.header(CONTENT_TYPE, JSON_CONTENT_TYPE).body(bytes);
            }
            Some(ProbeBody::Raw {
                content_type,
                text,
            }) => {
                builder = builder.header(CONTENT_TYPE, *content_type).body(text.clone());
            }
            None => {}
        }
        let response =
            builder.send().await.map_err(|err| TransportError::Request(err.to_string()))?;
        let status = response.status().as_u16();
        let mut headers = BTreeMap::new();
        for (name, value) in response.headers() {
            headers
                .entry(name.as_str().to_ascii_lowercase())
                .or_insert_with(|| String::from_utf8_lossy(value.as_bytes()).into_owned());
        }
        let body = read_body_with_limit(response, MAX_RESPONSE_BYTES).await?;
        Ok(ProbeResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads a response body while enforcing a hard byte limit.
async fn read_body_with_limit(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, TransportError> {
    let mut body = Vec::new();
    while let Some(chunk) =
        response.chunk().await.map_err(|err| TransportError::Request(err.to_string()))?
    {
        let next_total = body.len().saturating_add(chunk.len());
        if next_total > limit {
            return Err(TransportError::ResponseTooLarge {
                actual: next_total,
                limit,
            });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
