// crates/flavor-conformance/src/scenarios.rs
// ============================================================================
// Module: Flavor Scenarios
// Description: The show, list-basic, and list-detailed conformance scenarios.
// Purpose: Compose fetcher and validator into single-pass scenario runs.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! Each scenario is one linear pass: list, optionally re-fetch each item, and
//! validate every flavor against its projection. The first failure ends the
//! scenario; there is no partial-success reporting and no retry.
//! Invariants:
//! - Requests are issued sequentially.
//! - Scenarios share no mutable state.
//! - Each run emits exactly one scenario audit event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::audit::NoopAuditSink;
use crate::audit::ScenarioAuditEvent;
use crate::audit::SuiteAuditSink;
use crate::audit::build_audit_sink;
use crate::catalog::ScenarioId;
use crate::config::ConfigError;
use crate::config::SuiteConfig;
use crate::fetcher::FetchError;
use crate::fetcher::HttpTransport;
use crate::fetcher::ResourceFetcher;
use crate::links::LinkDeriver;
use crate::links::LinkError;
use crate::links::resource_id_from_value;
use crate::representation::AssertionFailure;
use crate::representation::FailureKind;
use crate::representation::Projection;
use crate::representation::RepresentationValidator;
use crate::representation::json_type_name;
use crate::transport::ReqwestTransport;

// ============================================================================
// SECTION: Results
// ============================================================================

/// Summary of a passing scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioReport {
    /// Scenario that ran.
    pub scenario: ScenarioId,
    /// Number of flavors validated.
    pub flavors_checked: usize,
    /// Number of requests issued.
    pub requests: usize,
}

/// Scenario failures.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    /// A request failed before a payload could be validated.
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    /// A flavor broke the representation contract.
    #[error("flavor #{index} (id {}): {failure}", .flavor_id.as_deref().unwrap_or("unknown"))]
    Contract {
        /// Position of the flavor in the listing.
        index: usize,
        /// Stringified identifier when one could be read.
        flavor_id: Option<String>,
        /// The contract violation.
        failure: AssertionFailure,
    },
}

/// Running counters for a scenario pass.
#[derive(Debug, Default)]
struct Progress {
    /// Flavors validated so far.
    flavors_checked: usize,
    /// Requests issued so far.
    requests: usize,
}

// ============================================================================
// SECTION: Suite
// ============================================================================

/// Runs flavor scenarios against one service.
pub struct FlavorSuite<T> {
    /// Endpoint access.
    fetcher: ResourceFetcher<T>,
    /// Projection and link checks.
    validator: RepresentationValidator,
    /// Sink receiving one event per scenario.
    audit: Arc<dyn SuiteAuditSink>,
}

impl<T: HttpTransport> FlavorSuite<T> {
    /// Creates a suite from its collaborators.
    #[must_use]
    pub fn new(fetcher: ResourceFetcher<T>, validator: RepresentationValidator) -> Self {
        Self {
            fetcher,
            validator,
            audit: Arc::new(NoopAuditSink),
        }
    }

    /// Creates a suite whose links derive from the transport's management URL.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError`] when the transport's management URL is invalid.
    pub fn from_transport(transport: T) -> Result<Self, LinkError> {
        let deriver = LinkDeriver::new(transport.management_url())?;
        Ok(Self::new(ResourceFetcher::new(transport), RepresentationValidator::new(deriver)))
    }

    /// Routes request and scenario events to `audit`.
    #[must_use]
    pub fn with_audit(self, audit: Arc<dyn SuiteAuditSink>) -> Self {
        Self {
            fetcher: self.fetcher.with_audit(Arc::clone(&audit)),
            validator: self.validator,
            audit,
        }
    }

    /// Returns the validator used by the suite.
    pub const fn validator(&self) -> &RepresentationValidator {
        &self.validator
    }

    /// Runs one scenario.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError`] on the first fetch failure or contract violation.
    pub fn run(&self, scenario: ScenarioId) -> Result<ScenarioReport, ScenarioError> {
        let mut progress = Progress::default();
        let outcome = match scenario {
            ScenarioId::ShowFlavor => self.show_flavor(&mut progress),
            ScenarioId::ListFlavorsBasic => self.list_basic(&mut progress),
            ScenarioId::ListFlavorsDetailed => self.list_detailed(&mut progress),
        };
        self.audit.record_scenario(&ScenarioAuditEvent::new(
            scenario.as_str(),
            progress.flavors_checked,
            progress.requests,
            outcome.as_ref().err().map(ToString::to_string),
        ));
        outcome.map(|()| ScenarioReport {
            scenario,
            flavors_checked: progress.flavors_checked,
            requests: progress.requests,
        })
    }

    /// Runs every scenario independently, in catalog order.
    pub fn run_all(&self) -> Vec<(ScenarioId, Result<ScenarioReport, ScenarioError>)> {
        ScenarioId::ALL.into_iter().map(|scenario| (scenario, self.run(scenario))).collect()
    }

    /// Lists flavors, then fetches and validates each one in detail.
    fn show_flavor(&self, progress: &mut Progress) -> Result<(), ScenarioError> {
        progress.requests += 1;
        let flavors = self.fetcher.list_basic()?;
        for (index, flavor) in flavors.iter().enumerate() {
            let flavor_id = listed_id(index, flavor)?;
            progress.requests += 1;
            let detailed = self.fetcher.show(&flavor_id)?;
            self.check(index, &detailed, Projection::Detailed)?;
            progress.flavors_checked += 1;
        }
        Ok(())
    }

    /// Lists flavors and validates the basic projection.
    fn list_basic(&self, progress: &mut Progress) -> Result<(), ScenarioError> {
        progress.requests += 1;
        let flavors = self.fetcher.list_basic()?;
        self.check_all(progress, &flavors, Projection::Basic)
    }

    /// Lists flavors in detail and validates the detailed projection.
    fn list_detailed(&self, progress: &mut Progress) -> Result<(), ScenarioError> {
        progress.requests += 1;
        let flavors = self.fetcher.list_detailed()?;
        self.check_all(progress, &flavors, Projection::Detailed)
    }

    /// Validates every flavor of a listing.
    fn check_all(
        &self,
        progress: &mut Progress,
        flavors: &[Value],
        projection: Projection,
    ) -> Result<(), ScenarioError> {
        for (index, flavor) in flavors.iter().enumerate() {
            self.check(index, flavor, projection)?;
            progress.flavors_checked += 1;
        }
        Ok(())
    }

    /// Validates one flavor and attaches listing context to failures.
    fn check(
        &self,
        index: usize,
        flavor: &Value,
        projection: Projection,
    ) -> Result<(), ScenarioError> {
        self.validator.validate(flavor, projection).map_err(|failure| ScenarioError::Contract {
            index,
            flavor_id: flavor.get("id").and_then(resource_id_from_value),
            failure,
        })
    }
}

impl FlavorSuite<ReqwestTransport> {
    /// Builds a suite, transport, and audit sink from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration cannot be realized.
    pub fn from_config(config: &SuiteConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config.service, &config.http)
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        let audit =
            build_audit_sink(&config.audit).map_err(|err| ConfigError::Io(err.to_string()))?;
        let suite =
            Self::from_transport(transport).map_err(|err| ConfigError::Invalid(err.to_string()))?;
        Ok(suite.with_audit(audit))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads the identifier of a listed flavor for the follow-up show request.
fn listed_id(index: usize, flavor: &Value) -> Result<String, ScenarioError> {
    let id_value = flavor.get("id").unwrap_or(&Value::Null);
    resource_id_from_value(id_value).ok_or_else(|| ScenarioError::Contract {
        index,
        flavor_id: None,
        failure: AssertionFailure::new(
            "flavor.id",
            FailureKind::TypeMismatch,
            "string or integer",
            json_type_name(id_value),
        ),
    })
}
