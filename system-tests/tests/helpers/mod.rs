// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for flavor system-tests.
// Purpose: Provide the suite harness, reference service, and artifact utilities.
// Dependencies: system-tests, flavor-conformance, tiny_http
// ============================================================================

//! ## Overview
//! Shared helpers for flavor system-tests.
//! Invariants:
//! - System-test execution is deterministic and fail-closed.
//! - Inputs are treated as untrusted unless explicitly mocked.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
