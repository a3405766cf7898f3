// system-tests/src/lib.rs
// ============================================================================
// Module: Flavor Conformance System Tests Library
// Description: Shared configuration and selection for live flavor scenarios.
// Purpose: Provide common utilities for the flavor system-test binaries.
// Dependencies: flavor-conformance
// ============================================================================

//! ## Overview
//! This crate hosts the environment-driven configuration and tag selection
//! used by the flavor system-tests binaries in `system-tests/tests`.
//! Security posture: system-test inputs are untrusted and parsed strictly.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod selection;
