// crates/flavor-conformance/src/lib.rs
// ============================================================================
// Module: Flavor Conformance Library
// Description: Representation and link contract checks for the flavors API.
// Purpose: Verify list/show payloads against the basic and detailed projections.
// Dependencies: reqwest, serde, serde_json, thiserror, toml, url
// ============================================================================

//! ## Overview
//! Flavor Conformance verifies that a compute service's `flavors` endpoints
//! return representations matching a fixed contract. [`LinkDeriver`] computes
//! the expected `self` and `bookmark` links, [`RepresentationValidator`]
//! asserts key sets, field types, and links, and [`ResourceFetcher`] drives the
//! three read-only endpoints through an [`HttpTransport`].
//! Invariants:
//! - The management base address is explicit configuration, never global state.
//! - Contract violations surface as [`AssertionFailure`] with the diverging path.
//! - Nothing in the suite retries; every failure is deterministic.
//!
//! Security posture: service responses are untrusted and size-capped.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod catalog;
pub mod config;
pub mod fetcher;
pub mod links;
pub mod representation;
pub mod scenarios;
pub mod transport;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::RequestAuditEvent;
pub use audit::ScenarioAuditEvent;
pub use audit::StderrAuditSink;
pub use audit::SuiteAuditSink;
pub use audit::SuiteOutcome;
pub use catalog::ScenarioEntry;
pub use catalog::ScenarioId;
pub use catalog::scenario_catalog;
pub use catalog::scenario_entry;
pub use config::AuditSinkConfig;
pub use config::ConfigError;
pub use config::HttpConfig;
pub use config::ServiceConfig;
pub use config::SuiteConfig;
pub use fetcher::FetchError;
pub use fetcher::HttpTransport;
pub use fetcher::ResourceFetcher;
pub use fetcher::TransportError;
pub use fetcher::TransportResponse;
pub use links::ExpectedLinks;
pub use links::Link;
pub use links::LinkDeriver;
pub use links::LinkError;
pub use links::LinkRelation;
pub use links::derive_links;
pub use representation::AssertionFailure;
pub use representation::FailureKind;
pub use representation::Projection;
pub use representation::RepresentationValidator;
pub use scenarios::FlavorSuite;
pub use scenarios::ScenarioError;
pub use scenarios::ScenarioReport;
pub use transport::ReqwestTransport;
