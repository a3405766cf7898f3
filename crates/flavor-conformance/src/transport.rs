// crates/flavor-conformance/src/transport.rs
// ============================================================================
// Module: Reqwest Transport
// Description: Blocking HTTP transport for the flavor endpoints.
// Purpose: Implement the HttpTransport seam with bounded, redirect-free GETs.
// Dependencies: reqwest, url
// ============================================================================

//! ## Overview
//! [`ReqwestTransport`] resolves request paths against the management base
//! address and returns status plus raw body. Timeouts and connection pooling
//! are owned by the reqwest client.
//! Invariants:
//! - Redirects are not followed.
//! - Response bodies are capped at the configured byte limit.
//! - The auth token is sent only as the `X-Auth-Token` header.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use reqwest::Method;
use reqwest::blocking::Client;
use reqwest::blocking::Response;
use reqwest::header::ACCEPT;
use reqwest::redirect::Policy;
use url::Url;

use crate::config::HttpConfig;
use crate::config::ServiceConfig;
use crate::fetcher::HttpTransport;
use crate::fetcher::TransportError;
use crate::fetcher::TransportResponse;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Header carrying the service auth token.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

// ============================================================================
// SECTION: Transport
// ============================================================================

/// Blocking reqwest transport bound to one management address.
pub struct ReqwestTransport {
    /// HTTP client used for outbound requests.
    client: Client,
    /// Version-qualified management base address.
    management_url: String,
    /// Optional auth token.
    auth_token: Option<String>,
    /// Maximum response size allowed, in bytes.
    max_response_bytes: usize,
}

impl ReqwestTransport {
    /// Builds a transport from service and HTTP settings.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the HTTP client cannot be created.
    pub fn new(service: &ServiceConfig, http: &HttpConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(http.timeout_ms))
            .user_agent(http.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| TransportError::Request(format!("http client build failed: {err}")))?;
        Ok(Self {
            client,
            management_url: service.management_url.trim().to_string(),
            auth_token: service.auth_token.clone(),
            max_response_bytes: http.max_response_bytes,
        })
    }
}

impl HttpTransport for ReqwestTransport {
    fn request(&self, method: &Method, path: &str) -> Result<TransportResponse, TransportError> {
        let url = endpoint_url(&self.management_url, path)?;
        let mut request =
            self.client.request(method.clone(), url.as_str()).header(ACCEPT, "application/json");
        if let Some(token) = &self.auth_token {
            request = request.header(AUTH_TOKEN_HEADER, token.as_str());
        }
        let mut response =
            request.send().map_err(|err| TransportError::Request(err.to_string()))?;
        let status = response.status().as_u16();
        let body = read_response_limited(&mut response, self.max_response_bytes)?;
        Ok(TransportResponse {
            status,
            body,
        })
    }

    fn management_url(&self) -> &str {
        &self.management_url
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Appends a request path to the management address.
///
/// # Errors
///
/// Returns [`TransportError::InvalidUrl`] when the result is not a valid URL.
pub fn endpoint_url(management_url: &str, path: &str) -> Result<Url, TransportError> {
    let base = management_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    Url::parse(&format!("{base}/{path}"))
        .map_err(|err| TransportError::InvalidUrl(format!("{base}/{path}: {err}")))
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(
    response: &mut Response,
    max_bytes: usize,
) -> Result<Vec<u8>, TransportError> {
    let expected_len = response.content_length();
    let max_bytes_u64 = u64::try_from(max_bytes)
        .map_err(|_| TransportError::Body("response size limit exceeds u64".to_string()))?;
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(TransportError::Body("http response exceeds size limit".to_string()));
    }
    let mut buf = Vec::new();
    let limit = max_bytes_u64.saturating_add(1);
    let mut handle = response.take(limit);
    handle
        .read_to_end(&mut buf)
        .map_err(|err| TransportError::Body(format!("failed to read response: {err}")))?;
    if buf.len() > max_bytes {
        return Err(TransportError::Body("http response exceeds size limit".to_string()));
    }
    if let Some(expected) = expected_len {
        let expected = usize::try_from(expected)
            .map_err(|_| TransportError::Body("invalid response length".to_string()))?;
        if buf.len() < expected {
            return Err(TransportError::Body("http response truncated".to_string()));
        }
    }
    Ok(buf)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
