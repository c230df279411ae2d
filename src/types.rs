//! Shared types used across both pipeline stages.
//!
//! These types are serialized to JSON between stages (fetch → generate)
//! and consumed by the listing, breadcrumb, and rendering code alike.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One unit of displayable material: a podcast episode, press article,
/// article, event, or program.
///
/// Every content type is folded into this envelope at the fetch boundary
/// (see [`crate::content`]), so filtering and pagination never need to know
/// which schema an item came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Stable identifier assigned by the content source.
    pub id: String,
    /// Attributes eligible for case-insensitive substring search, in order.
    #[serde(default)]
    pub searchable_fields: Vec<String>,
    /// Filter dimension name → value used for exact-match filtering.
    #[serde(default)]
    pub category_fields: BTreeMap<String, String>,
    /// Display title (not part of filtering unless also listed as searchable).
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Outbound link (registration page, original press article, episode URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl ContentItem {
    /// Value of a filter dimension, if the item carries it.
    pub fn category(&self, dimension: &str) -> Option<&str> {
        self.category_fields.get(dimension).map(String::as_str)
    }
}

/// A static page rendered from a markdown file under `content/pages/`.
///
/// Pages follow the `NNN-name` convention:
/// - Numbered files (`010-about.md`) appear in navigation, sorted by number
/// - Unnumbered files are generated but hidden from navigation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Title from first `# heading` in markdown, or link_title as fallback
    pub title: String,
    /// Display label in nav (file stem with number stripped, dashes → spaces)
    pub link_title: String,
    /// URL path relative to the site root, without leading slash (`programs/gc-exchange`)
    pub path: String,
    /// Raw markdown content
    pub body: String,
    /// Whether this page appears in navigation (has number prefix)
    pub in_nav: bool,
    /// Sort key from number prefix (for ordering)
    pub sort_key: u32,
}

/// Top-level navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub title: String,
    pub path: String,
}
