// system-tests/src/selection.rs
// ============================================================================
// Module: Tag Selection
// Description: Backend-label filter applied to the scenario catalog.
// Purpose: Skip scenarios whose backend dependencies are not under test.
// Dependencies: flavor-conformance
// ============================================================================

//! ## Overview
//! A selection is a set of lowercase backend labels. A catalog entry is
//! selected when it carries at least one of them. An absent selection runs
//! every scenario.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use flavor_conformance::ScenarioEntry;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Non-empty set of backend labels to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSelection {
    /// Lowercase labels.
    tags: BTreeSet<String>,
}

impl TagSelection {
    /// Parses a comma-separated label list such as `nova,glance`.
    ///
    /// # Errors
    ///
    /// Returns an error when the list or any of its labels is empty.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let mut tags = BTreeSet::new();
        for label in raw.split(',') {
            let label = label.trim();
            if label.is_empty() {
                return Err(format!("tag list `{raw}` contains an empty label"));
            }
            tags.insert(label.to_ascii_lowercase());
        }
        Ok(Self {
            tags,
        })
    }

    /// Returns the selected labels in sorted order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    /// Returns true when `entry` carries any selected label.
    #[must_use]
    pub fn matches(&self, entry: &ScenarioEntry) -> bool {
        self.tags.iter().any(|tag| entry.has_tag(tag))
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
