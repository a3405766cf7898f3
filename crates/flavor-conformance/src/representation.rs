// crates/flavor-conformance/src/representation.rs
// ============================================================================
// Module: Representation Validation
// Description: Basic and detailed projection checks for flavor objects.
// Purpose: Assert key sets, integer sizing fields, and derived links.
// Dependencies: serde_json, thiserror
// ============================================================================

//! ## Overview
//! A flavor object is checked against exactly one projection. Key sets must
//! match with no extras and no omissions, detailed sizing fields must be JSON
//! integers, and the `links` array must equal the pair computed by
//! [`LinkDeriver`] element by element.
//! Invariants:
//! - Checks run in a fixed order and stop at the first divergence.
//! - Every failure names the diverging path plus expected and actual values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::links::Link;
use crate::links::LinkDeriver;
use crate::links::resource_id_from_value;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Root path used in failure messages.
const ROOT_PATH: &str = "flavor";
/// Keys of the basic projection.
const BASIC_KEYS: &[&str] = &["id", "name", "links"];
/// Keys of the detailed projection.
const DETAILED_KEYS: &[&str] = &["id", "name", "ram", "disk", "links"];
/// Integer-typed fields of the detailed projection.
const INTEGER_FIELDS: &[&str] = &["ram", "disk"];
/// Keys of a single link object.
const LINK_KEYS: &[&str] = &["rel", "href"];

// ============================================================================
// SECTION: Failures
// ============================================================================

/// Classification of a contract violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Value was expected to be a JSON object.
    NotAnObject,
    /// Object keys differ from the projection.
    KeySetMismatch,
    /// Field has the wrong JSON type.
    TypeMismatch,
    /// `links` does not hold exactly two entries.
    LinkCountMismatch,
    /// A link relation or target differs from the derived value.
    LinkMismatch,
    /// Response wrapper key differs from the endpoint contract.
    WrapperMismatch,
}

impl FailureKind {
    /// Returns a stable label for the failure kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotAnObject => "not an object",
            Self::KeySetMismatch => "key set mismatch",
            Self::TypeMismatch => "type mismatch",
            Self::LinkCountMismatch => "link count mismatch",
            Self::LinkMismatch => "link mismatch",
            Self::WrapperMismatch => "wrapper mismatch",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A deterministic contract violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {kind} (expected {expected}, actual {actual})")]
pub struct AssertionFailure {
    /// Path of the diverging field, for example `flavor.links[1].href`.
    pub path: String,
    /// Failure classification.
    pub kind: FailureKind,
    /// Rendered expected value.
    pub expected: String,
    /// Rendered actual value.
    pub actual: String,
}

impl AssertionFailure {
    /// Builds a failure from its parts.
    #[must_use]
    pub fn new(
        path: impl Into<String>,
        kind: FailureKind,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            kind,
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

// ============================================================================
// SECTION: Projections
// ============================================================================

/// Allowed flavor projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Identity and navigation fields only.
    Basic,
    /// Identity, navigation, and sizing fields.
    Detailed,
}

impl Projection {
    /// Returns the exact key set for the projection.
    #[must_use]
    pub fn expected_keys(self) -> BTreeSet<&'static str> {
        match self {
            Self::Basic => BASIC_KEYS.iter().copied().collect(),
            Self::Detailed => DETAILED_KEYS.iter().copied().collect(),
        }
    }

    /// Returns a stable label for the projection.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Detailed => "detailed",
        }
    }
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Validates flavor objects against the projection contract.
#[derive(Debug, Clone)]
pub struct RepresentationValidator {
    /// Deriver bound to the service's management base address.
    links: LinkDeriver,
}

impl RepresentationValidator {
    /// Creates a validator that derives links from `links`.
    #[must_use]
    pub const fn new(links: LinkDeriver) -> Self {
        Self {
            links,
        }
    }

    /// Returns the link deriver used by this validator.
    #[must_use]
    pub const fn link_deriver(&self) -> &LinkDeriver {
        &self.links
    }

    /// Asserts `flavor` matches the basic projection.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionFailure`] on the first contract divergence.
    pub fn validate_basic(&self, flavor: &Value) -> Result<(), AssertionFailure> {
        self.validate(flavor, Projection::Basic)
    }

    /// Asserts `flavor` matches the detailed projection.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionFailure`] on the first contract divergence.
    pub fn validate_detailed(&self, flavor: &Value) -> Result<(), AssertionFailure> {
        self.validate(flavor, Projection::Detailed)
    }

    /// Asserts `flavor` matches `projection`.
    ///
    /// # Errors
    ///
    /// Returns [`AssertionFailure`] on the first contract divergence.
    pub fn validate(&self, flavor: &Value, projection: Projection) -> Result<(), AssertionFailure> {
        let object = expect_object(ROOT_PATH, flavor)?;
        expect_key_set(ROOT_PATH, object, &projection.expected_keys())?;
        if projection == Projection::Detailed {
            for field in INTEGER_FIELDS {
                expect_integer(object, field)?;
            }
        }
        self.validate_links(object)
    }

    /// Asserts the `links` array equals the derived `[self, bookmark]` pair.
    fn validate_links(&self, object: &Map<String, Value>) -> Result<(), AssertionFailure> {
        let id_value = object.get("id").unwrap_or(&Value::Null);
        let resource_id = resource_id_from_value(id_value).ok_or_else(|| {
            AssertionFailure::new(
                format!("{ROOT_PATH}.id"),
                FailureKind::TypeMismatch,
                "string or integer",
                json_type_name(id_value),
            )
        })?;
        let expected = self.links.derive(&resource_id);
        let links_path = format!("{ROOT_PATH}.links");
        let actual_value = object.get("links").unwrap_or(&Value::Null);
        let Value::Array(actual) = actual_value else {
            return Err(AssertionFailure::new(
                links_path,
                FailureKind::TypeMismatch,
                "array",
                json_type_name(actual_value),
            ));
        };
        let wanted = expected.as_array();
        if actual.len() != wanted.len() {
            return Err(AssertionFailure::new(
                links_path,
                FailureKind::LinkCountMismatch,
                wanted.len().to_string(),
                actual.len().to_string(),
            ));
        }
        for (index, (link, expected_link)) in actual.iter().zip(wanted).enumerate() {
            expect_link(&format!("{links_path}[{index}]"), link, expected_link)?;
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Requires `value` to be a JSON object.
pub(crate) fn expect_object<'a>(
    path: &str,
    value: &'a Value,
) -> Result<&'a Map<String, Value>, AssertionFailure> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(AssertionFailure::new(
            path,
            FailureKind::NotAnObject,
            "object",
            json_type_name(other),
        )),
    }
}

/// Requires the object's keys to equal `expected` exactly.
pub(crate) fn expect_key_set(
    path: &str,
    object: &Map<String, Value>,
    expected: &BTreeSet<&str>,
) -> Result<(), AssertionFailure> {
    let actual: BTreeSet<&str> = object.keys().map(String::as_str).collect();
    if &actual == expected {
        return Ok(());
    }
    Err(AssertionFailure::new(
        path,
        FailureKind::KeySetMismatch,
        render_key_set(expected),
        render_key_set(&actual),
    ))
}

/// Requires `field` to hold a JSON integer.
fn expect_integer(object: &Map<String, Value>, field: &str) -> Result<(), AssertionFailure> {
    let value = object.get(field).unwrap_or(&Value::Null);
    match value {
        Value::Number(number) if number.is_i64() || number.is_u64() => Ok(()),
        other => Err(AssertionFailure::new(
            format!("{ROOT_PATH}.{field}"),
            FailureKind::TypeMismatch,
            "integer",
            describe_value(other),
        )),
    }
}

/// Compares one actual link object against its expected value.
fn expect_link(path: &str, actual: &Value, expected: &Link) -> Result<(), AssertionFailure> {
    let object = expect_object(path, actual)?;
    expect_key_set(path, object, &LINK_KEYS.iter().copied().collect())?;
    let rel = object.get("rel").unwrap_or(&Value::Null);
    if rel.as_str() != Some(expected.rel.as_str()) {
        return Err(AssertionFailure::new(
            format!("{path}.rel"),
            FailureKind::LinkMismatch,
            expected.rel.as_str(),
            render_link_field(rel),
        ));
    }
    let href = object.get("href").unwrap_or(&Value::Null);
    if href.as_str() != Some(expected.href.as_str()) {
        return Err(AssertionFailure::new(
            format!("{path}.href"),
            FailureKind::LinkMismatch,
            expected.href.as_str(),
            render_link_field(href),
        ));
    }
    Ok(())
}

/// Renders a key set as a sorted, brace-delimited list.
fn render_key_set(keys: &BTreeSet<&str>) -> String {
    format!("{{{}}}", keys.iter().copied().collect::<Vec<_>>().join(", "))
}

/// Renders a value with its JSON type, for example `string "512"`.
fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        other => format!("{} {other}", json_type_name(other)),
    }
}

/// Renders a link field bare when it is a string, typed otherwise.
fn render_link_field(value: &Value) -> String {
    value.as_str().map_or_else(|| describe_value(value), str::to_string)
}

/// Returns the JSON type name of `value`, distinguishing integers from floats.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
