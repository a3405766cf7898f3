// crates/flavor-conformance/src/audit.rs
// ============================================================================
// Module: Suite Audit Logging
// Description: Structured audit events for flavor requests and scenarios.
// Purpose: Emit JSON-line logs without hard dependencies on a logging stack.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every request issued by [`crate::ResourceFetcher`] and every scenario run by
//! [`crate::FlavorSuite`] produces one audit event. Sinks serialize events as
//! JSON lines to stderr or an append-only file, or drop them.
//! Invariants:
//! - Recording never fails the caller; serialization or I/O errors are dropped.
//! - Response bodies are never logged, only their sizes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::config::AuditSinkConfig;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome classification shared by request and scenario events.
///
/// # Invariants
/// - Variants are stable for log labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteOutcome {
    /// The request or scenario conformed.
    Ok,
    /// The request or scenario failed.
    Error,
}

impl SuiteOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

/// Audit event for a single HTTP request.
#[derive(Debug, Clone, Serialize)]
pub struct RequestAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// HTTP method.
    pub method: String,
    /// Request path relative to the management address.
    pub path: String,
    /// HTTP status when a response was received.
    pub status: Option<u16>,
    /// Request outcome.
    pub outcome: SuiteOutcome,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Response body size in bytes.
    pub response_bytes: usize,
}

impl RequestAuditEvent {
    /// Builds a request event stamped with the current time.
    #[must_use]
    pub fn new(
        method: &str,
        path: &str,
        status: Option<u16>,
        error_kind: Option<&'static str>,
        response_bytes: usize,
    ) -> Self {
        Self {
            event: "flavor_request",
            timestamp_ms: now_millis(),
            method: method.to_string(),
            path: path.to_string(),
            status,
            outcome: if error_kind.is_some() { SuiteOutcome::Error } else { SuiteOutcome::Ok },
            error_kind,
            response_bytes,
        }
    }
}

/// Audit event for a completed scenario.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Stable scenario name.
    pub scenario: &'static str,
    /// Scenario outcome.
    pub outcome: SuiteOutcome,
    /// Number of flavors that passed validation.
    pub flavors_checked: usize,
    /// Number of requests issued.
    pub requests: usize,
    /// Failure message when the scenario failed.
    pub failure: Option<String>,
}

impl ScenarioAuditEvent {
    /// Builds a scenario event stamped with the current time.
    #[must_use]
    pub fn new(
        scenario: &'static str,
        flavors_checked: usize,
        requests: usize,
        failure: Option<String>,
    ) -> Self {
        Self {
            event: "flavor_scenario",
            timestamp_ms: now_millis(),
            scenario,
            outcome: if failure.is_some() { SuiteOutcome::Error } else { SuiteOutcome::Ok },
            flavors_checked,
            requests,
            failure,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for suite events.
pub trait SuiteAuditSink: Send + Sync {
    /// Record a request event.
    fn record_request(&self, event: &RequestAuditEvent);

    /// Record a scenario event.
    fn record_scenario(&self, event: &ScenarioAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl SuiteAuditSink for StderrAuditSink {
    fn record_request(&self, event: &RequestAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_scenario(&self, event: &ScenarioAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized event line.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl SuiteAuditSink for FileAuditSink {
    fn record_request(&self, event: &RequestAuditEvent) {
        self.append(event);
    }

    fn record_scenario(&self, event: &ScenarioAuditEvent) {
        self.append(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl SuiteAuditSink for NoopAuditSink {
    fn record_request(&self, _event: &RequestAuditEvent) {}

    fn record_scenario(&self, _event: &ScenarioAuditEvent) {}
}

// ============================================================================
// SECTION: Construction
// ============================================================================

/// Builds the sink selected by configuration.
///
/// # Errors
///
/// Returns an error when a file sink cannot be opened.
pub fn build_audit_sink(config: &AuditSinkConfig) -> io::Result<Arc<dyn SuiteAuditSink>> {
    match config {
        AuditSinkConfig::Stderr => Ok(Arc::new(StderrAuditSink)),
        AuditSinkConfig::File {
            path,
        } => Ok(Arc::new(FileAuditSink::new(path)?)),
        AuditSinkConfig::Disabled => Ok(Arc::new(NoopAuditSink)),
    }
}

/// Returns the current wall-clock time in milliseconds since the epoch.
fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}
