// crates/flavor-conformance/src/catalog.rs
// ============================================================================
// Module: Scenario Catalog
// Description: Static metadata table for the flavor scenarios.
// Purpose: Map each scenario to the backend-dependency labels it exercises.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The catalog is a pass-through annotation table consumed by external test
//! selectors. It carries no selection logic of its own.
//! Invariants:
//! - Scenario names are unique and stable.
//! - Every scenario has at least one backend label.

// ============================================================================
// SECTION: Types
// ============================================================================

/// Identifier for a flavor scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScenarioId {
    /// Retrieve every listed flavor individually.
    ShowFlavor,
    /// List flavors in the basic projection.
    ListFlavorsBasic,
    /// List flavors in the detailed projection.
    ListFlavorsDetailed,
}

impl ScenarioId {
    /// All scenarios in catalog order.
    pub const ALL: [Self; 3] =
        [Self::ShowFlavor, Self::ListFlavorsBasic, Self::ListFlavorsDetailed];

    /// Returns the stable scenario name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ShowFlavor => "show_flavor",
            Self::ListFlavorsBasic => "index_flavors_basic",
            Self::ListFlavorsDetailed => "index_flavors_detailed",
        }
    }

    /// Parses a stable scenario name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == name.trim())
    }
}

/// Catalog entry for a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioEntry {
    /// Scenario identifier.
    pub id: ScenarioId,
    /// One-line description.
    pub summary: &'static str,
    /// Backend-dependency labels.
    pub tags: &'static [&'static str],
}

impl ScenarioEntry {
    /// Returns true when the entry carries `tag`.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate.eq_ignore_ascii_case(tag.trim()))
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Backend labels shared by every flavor scenario.
const COMPUTE_AND_IMAGE: &[&str] = &["nova", "glance"];

/// Static scenario table.
const CATALOG: &[ScenarioEntry] = &[
    ScenarioEntry {
        id: ScenarioId::ShowFlavor,
        summary: "Retrieve a single flavor",
        tags: COMPUTE_AND_IMAGE,
    },
    ScenarioEntry {
        id: ScenarioId::ListFlavorsBasic,
        summary: "List all flavors",
        tags: COMPUTE_AND_IMAGE,
    },
    ScenarioEntry {
        id: ScenarioId::ListFlavorsDetailed,
        summary: "List all flavors in detail",
        tags: COMPUTE_AND_IMAGE,
    },
];

/// Returns the scenario metadata table.
#[must_use]
pub const fn scenario_catalog() -> &'static [ScenarioEntry] {
    CATALOG
}

/// Returns the catalog entry for `id`.
#[must_use]
pub fn scenario_entry(id: ScenarioId) -> Option<&'static ScenarioEntry> {
    CATALOG.iter().find(|entry| entry.id == id)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
