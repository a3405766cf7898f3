// system-tests/src/config/mod.rs
// ============================================================================
// Module: System Test Configuration
// Description: Centralized configuration for flavor system tests.
// Purpose: Provide typed access to test environment settings and defaults.
// Dependencies: flavor-conformance
// ============================================================================

//! ## Overview
//! System-test configuration is read from environment variables, optionally
//! layered over a suite TOML file, and mapped into a small typed structure for
//! reuse across test helpers.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::SystemTestConfig;
pub use env::SystemTestEnv;
pub use env::read_env_strict;
