// crates/flavor-conformance/src/links.rs
// ============================================================================
// Module: Link Derivation
// Description: Expected self/bookmark hyperlinks for flavor resources.
// Purpose: Compute canonical and versionless links from the management address.
// Dependencies: serde, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! A flavor advertises two links: a version-qualified `self` link rooted at the
//! management base address, and a versionless `bookmark` link rooted at the
//! same address with its `v<major>.<minor>` path segment removed.
//! Invariants:
//! - Derivation is pure and deterministic for a fixed address and identifier.
//! - Expected links are always ordered `[self, bookmark]`.
//! - Only the first version segment is stripped for bookmarks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Collection path segment for flavor resources.
pub const FLAVORS_COLLECTION: &str = "flavors";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Link derivation errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    /// The management base address is not a well-formed absolute URL.
    #[error("invalid management address `{address}`: {reason}")]
    InvalidAddress {
        /// Address as supplied by the caller.
        address: String,
        /// Why the address was rejected.
        reason: String,
    },
}

/// Relation tag carried by a flavor link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkRelation {
    /// Canonical, version-qualified link.
    #[serde(rename = "self")]
    SelfLink,
    /// Version-independent link.
    #[serde(rename = "bookmark")]
    Bookmark,
}

impl LinkRelation {
    /// Returns the wire label for the relation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SelfLink => "self",
            Self::Bookmark => "bookmark",
        }
    }
}

/// A single `{rel, href}` hyperlink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Link relation.
    pub rel: LinkRelation,
    /// Absolute target URL.
    pub href: String,
}

/// The expected link pair for one resource.
///
/// # Invariants
/// - `self_link.rel` is [`LinkRelation::SelfLink`].
/// - `bookmark.rel` is [`LinkRelation::Bookmark`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpectedLinks {
    /// Canonical link.
    pub self_link: Link,
    /// Versionless link.
    pub bookmark: Link,
}

impl ExpectedLinks {
    /// Returns the links in wire order: `self` first, `bookmark` second.
    #[must_use]
    pub fn as_array(&self) -> [&Link; 2] {
        [&self.self_link, &self.bookmark]
    }

    /// Returns the JSON array a conforming representation carries.
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Array(
            self.as_array()
                .iter()
                .map(|link| {
                    serde_json::json!({
                        "rel": link.rel.as_str(),
                        "href": link.href,
                    })
                })
                .collect(),
        )
    }
}

// ============================================================================
// SECTION: Deriver
// ============================================================================

/// Link deriver bound to a validated management base address.
///
/// # Invariants
/// - `base` is the address as supplied, minus surrounding whitespace, query,
///   and fragment. Host case, ports, and path escaping are left untouched.
/// - `bookmark_base` equals `base` minus its first version segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDeriver {
    /// Version-qualified base address.
    base: String,
    /// Versionless base address.
    bookmark_base: String,
}

impl LinkDeriver {
    /// Validates the management base address once for repeated derivations.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::InvalidAddress`] when the address is not an
    /// absolute URL with a host.
    pub fn new(management_base_address: &str) -> Result<Self, LinkError> {
        let base = parse_base(management_base_address)?;
        let bookmark_base = strip_version_segment(&base);
        Ok(Self {
            base,
            bookmark_base,
        })
    }

    /// Returns the version-qualified management base address.
    #[must_use]
    pub fn management_url(&self) -> &str {
        &self.base
    }

    /// Returns the versionless base address used for bookmarks.
    #[must_use]
    pub fn bookmark_base(&self) -> &str {
        &self.bookmark_base
    }

    /// Derives the expected link pair for a stringified resource identifier.
    #[must_use]
    pub fn derive(&self, resource_id: &str) -> ExpectedLinks {
        ExpectedLinks {
            self_link: Link {
                rel: LinkRelation::SelfLink,
                href: join_resource(&self.base, resource_id),
            },
            bookmark: Link {
                rel: LinkRelation::Bookmark,
                href: join_resource(&self.bookmark_base, resource_id),
            },
        }
    }
}

/// Derives the expected links for a resource in one call.
///
/// # Errors
///
/// Returns [`LinkError::InvalidAddress`] when the management base address is
/// not a well-formed absolute URL.
pub fn derive_links(
    management_base_address: &str,
    resource_id: &str,
) -> Result<ExpectedLinks, LinkError> {
    Ok(LinkDeriver::new(management_base_address)?.derive(resource_id))
}

/// Stringifies a JSON resource identifier for URL construction.
///
/// Strings are used verbatim and integers use their decimal form. Any other
/// JSON type has no URL form and yields `None`.
#[must_use]
pub fn resource_id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) if number.is_i64() || number.is_u64() => Some(number.to_string()),
        _ => None,
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates the management base address and returns it without its query
/// and fragment. The URL parser only gates the address; hrefs are built from
/// the text as supplied.
fn parse_base(address: &str) -> Result<String, LinkError> {
    let invalid = |reason: &str| LinkError::InvalidAddress {
        address: address.to_string(),
        reason: reason.to_string(),
    };
    let trimmed = address.trim();
    let url = Url::parse(trimmed).map_err(|err| invalid(&err.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("address cannot be a base"));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("address has no host"));
    }
    let end = trimmed.find(['?', '#']).unwrap_or(trimmed.len());
    let base = &trimmed[..end];
    let prefix = format!("{}://", url.scheme());
    let spelled_out =
        base.get(..prefix.len()).is_some_and(|head| head.eq_ignore_ascii_case(&prefix));
    if !spelled_out {
        return Err(invalid("address must spell out `scheme://host`"));
    }
    Ok(base.to_string())
}

/// Returns true for path segments shaped like `v<major>.<minor>`.
fn is_version_segment(segment: &str) -> bool {
    let Some(version) = segment.strip_prefix('v') else {
        return false;
    };
    let Some((major, minor)) = version.split_once('.') else {
        return false;
    };
    let numeric = |part: &str| !part.is_empty() && part.bytes().all(|byte| byte.is_ascii_digit());
    numeric(major) && numeric(minor)
}

/// Removes the first version segment from the address path.
fn strip_version_segment(base: &str) -> String {
    let path_start = base.find("://").map_or(0, |scheme_end| {
        let authority = scheme_end + 3;
        base[authority..].find('/').map_or(base.len(), |offset| authority + offset)
    });
    let (origin, path) = base.split_at(path_start);
    let mut segments: Vec<&str> = path.split('/').collect();
    let Some(index) = segments.iter().position(|segment| is_version_segment(segment)) else {
        return base.to_string();
    };
    segments.remove(index);
    format!("{origin}{}", segments.join("/"))
}

/// Joins `base`, the flavors collection, and a resource identifier.
fn join_resource(base: &str, resource_id: &str) -> String {
    let mut href = base.to_string();
    if !href.ends_with('/') {
        href.push('/');
    }
    href.push_str(FLAVORS_COLLECTION);
    href.push('/');
    href.push_str(resource_id);
    href
}

// ============================================================================
// SECTION: Tests
// ============================================================================
