// crates/flavor-conformance/src/fetcher.rs
// ============================================================================
// Module: Resource Fetcher
// Description: Read-only access to the flavor collection and item endpoints.
// Purpose: Issue GETs, enforce status and wrapper contracts, unwrap payloads.
// Dependencies: reqwest, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`ResourceFetcher`] issues the three read-only requests of the suite through
//! an [`HttpTransport`] and returns decoded payloads with their top-level
//! wrapper removed.
//! Invariants:
//! - Only status `200` is accepted.
//! - Collection bodies are exactly `{"flavors": [...]}`; item bodies are
//!   exactly `{"flavor": {...}}`.
//! - Failures are fatal to the caller and never retried.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use thiserror::Error;

use crate::audit::NoopAuditSink;
use crate::audit::RequestAuditEvent;
use crate::audit::SuiteAuditSink;
use crate::representation::AssertionFailure;
use crate::representation::FailureKind;
use crate::representation::expect_key_set;
use crate::representation::json_type_name;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Collection endpoint path.
pub const COLLECTION_PATH: &str = "/flavors";
/// Detailed collection endpoint path.
pub const DETAIL_PATH: &str = "/flavors/detail";
/// Wrapper key for collection responses.
pub const COLLECTION_WRAPPER: &str = "flavors";
/// Wrapper key for single-item responses.
pub const ITEM_WRAPPER: &str = "flavor";
/// Only accepted response status.
const EXPECTED_STATUS: u16 = 200;
/// Maximum body characters carried in error context.
const MAX_BODY_EXCERPT: usize = 512;

// ============================================================================
// SECTION: Transport Seam
// ============================================================================

/// Response metadata and raw body returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

/// Transport-level failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Request URL could not be formed from the management address and path.
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
    /// Connection or protocol failure.
    #[error("request failed: {0}")]
    Request(String),
    /// Body could not be read or exceeded limits.
    #[error("response body error: {0}")]
    Body(String),
}

/// HTTP client collaborator carrying the management address.
pub trait HttpTransport {
    /// Issues `method` against `path`, relative to the management address.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response could be obtained.
    fn request(&self, method: &Method, path: &str) -> Result<TransportResponse, TransportError>;

    /// Returns the version-qualified management base address.
    fn management_url(&self) -> &str;
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fetch failures, each fatal to the current scenario.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No response was obtained.
    #[error("{method} {path}: {source}")]
    Transport {
        /// HTTP method.
        method: String,
        /// Request path.
        path: String,
        /// Underlying transport failure.
        source: TransportError,
    },
    /// The service answered with a status other than 200.
    #[error("{method} {path}: expected status 200, got {status}: {body}")]
    Status {
        /// HTTP method.
        method: String,
        /// Request path.
        path: String,
        /// Returned status.
        status: u16,
        /// Body excerpt.
        body: String,
    },
    /// The body was not valid JSON.
    #[error("{method} {path}: malformed json ({message}): {body}")]
    Decode {
        /// HTTP method.
        method: String,
        /// Request path.
        path: String,
        /// Decoder message.
        message: String,
        /// Body excerpt.
        body: String,
    },
    /// The body decoded but broke the wrapper contract.
    #[error("contract violation: {0}")]
    Contract(AssertionFailure),
}

impl FetchError {
    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport {
                ..
            } => "transport",
            Self::Status {
                ..
            } => "status",
            Self::Decode {
                ..
            } => "decode",
            Self::Contract(_) => "contract",
        }
    }
}

// ============================================================================
// SECTION: Fetcher
// ============================================================================

/// Read-only client for the flavor endpoints.
pub struct ResourceFetcher<T> {
    /// Transport used for every request.
    transport: T,
    /// Sink receiving one event per request.
    audit: Arc<dyn SuiteAuditSink>,
}

impl<T: HttpTransport> ResourceFetcher<T> {
    /// Creates a fetcher that discards audit events.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            audit: Arc::new(NoopAuditSink),
        }
    }

    /// Routes request events to `audit`.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn SuiteAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Returns the underlying transport.
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Lists flavors in the basic projection.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport, status, decode, or wrapper failure.
    pub fn list_basic(&self) -> Result<Vec<Value>, FetchError> {
        self.get_collection(COLLECTION_PATH)
    }

    /// Lists flavors in the detailed projection.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport, status, decode, or wrapper failure.
    pub fn list_detailed(&self) -> Result<Vec<Value>, FetchError> {
        self.get_collection(DETAIL_PATH)
    }

    /// Retrieves a single flavor in the detailed projection.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport, status, decode, or wrapper failure.
    pub fn show(&self, id: &str) -> Result<Value, FetchError> {
        self.get_wrapped(&format!("{COLLECTION_PATH}/{id}"), ITEM_WRAPPER)
    }

    /// Fetches a collection endpoint and requires an array payload.
    fn get_collection(&self, path: &str) -> Result<Vec<Value>, FetchError> {
        match self.get_wrapped(path, COLLECTION_WRAPPER)? {
            Value::Array(items) => Ok(items),
            other => Err(FetchError::Contract(AssertionFailure::new(
                format!("response.{COLLECTION_WRAPPER}"),
                FailureKind::TypeMismatch,
                "array",
                json_type_name(&other),
            ))),
        }
    }

    /// Issues a GET, checks status and wrapper, and records an audit event.
    fn get_wrapped(&self, path: &str, wrapper: &str) -> Result<Value, FetchError> {
        let method = Method::GET;
        let response = match self.transport.request(&method, path) {
            Ok(response) => response,
            Err(source) => {
                let error = FetchError::Transport {
                    method: method.to_string(),
                    path: path.to_string(),
                    source,
                };
                self.audit.record_request(&RequestAuditEvent::new(
                    method.as_str(),
                    path,
                    None,
                    Some(error.kind()),
                    0,
                ));
                return Err(error);
            }
        };
        let outcome = unwrap_body(&method, path, &response, wrapper);
        self.audit.record_request(&RequestAuditEvent::new(
            method.as_str(),
            path,
            Some(response.status),
            outcome.as_ref().err().map(FetchError::kind),
            response.body.len(),
        ));
        outcome
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Applies the status, JSON, and wrapper checks to a raw response.
fn unwrap_body(
    method: &Method,
    path: &str,
    response: &TransportResponse,
    wrapper: &str,
) -> Result<Value, FetchError> {
    if response.status != EXPECTED_STATUS {
        return Err(FetchError::Status {
            method: method.to_string(),
            path: path.to_string(),
            status: response.status,
            body: body_excerpt(&response.body),
        });
    }
    let decoded: Value =
        serde_json::from_slice(&response.body).map_err(|err| FetchError::Decode {
            method: method.to_string(),
            path: path.to_string(),
            message: err.to_string(),
            body: body_excerpt(&response.body),
        })?;
    let mut map = match decoded {
        Value::Object(map) => map,
        other => {
            return Err(FetchError::Contract(AssertionFailure::new(
                "response",
                FailureKind::NotAnObject,
                "object",
                json_type_name(&other),
            )));
        }
    };
    let expected: BTreeSet<&str> = BTreeSet::from([wrapper]);
    let wrapper_mismatch = |mut failure: AssertionFailure| {
        failure.kind = FailureKind::WrapperMismatch;
        FetchError::Contract(failure)
    };
    expect_key_set("response", &map, &expected).map_err(wrapper_mismatch)?;
    map.remove(wrapper).ok_or_else(|| {
        wrapper_mismatch(AssertionFailure::new(
            "response",
            FailureKind::WrapperMismatch,
            format!("{{{wrapper}}}"),
            "{}",
        ))
    })
}

/// Returns a bounded, lossy UTF-8 excerpt of a response body.
fn body_excerpt(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(MAX_BODY_EXCERPT) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.into_owned(),
    }
}
