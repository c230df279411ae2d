//! Shared test utilities for the vanguard-site test suite.
//!
//! Provides item builders, snapshot fixtures, and manifest lookups that work
//! with the fetch-stage data structures (`Manifest`, `Collection`,
//! `ContentItem`).
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_snapshot();
//! let manifest = fetch(&SnapshotSource::new(tmp.path()), &SiteConfig::default()).unwrap();
//!
//! let podcasts = find_collection(&manifest, ContentKind::Podcasts);
//! assert_eq!(item_ids(podcasts), ["p1", "p2", "p3"]);
//! ```

use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::config::SiteConfig;
use crate::content::ContentKind;
use crate::fetch::{Collection, Manifest};
use crate::types::ContentItem;

// =========================================================================
// Item builders
// =========================================================================

/// Build an item from searchable fields and `(dimension, value)` pairs.
///
/// The title is the first searchable field, or the id when there is none.
pub fn item(id: &str, searchable: &[&str], categories: &[(&str, &str)]) -> ContentItem {
    ContentItem {
        id: id.to_string(),
        searchable_fields: searchable.iter().map(|s| s.to_string()).collect(),
        category_fields: categories
            .iter()
            .map(|(d, v)| (d.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
        title: searchable.first().unwrap_or(&id).to_string(),
        summary: None,
        image: None,
        link: None,
        date: None,
    }
}

/// `n` items with ids `"0"..` and searchable text `"Item {i}"`.
pub fn numbered_items(n: usize) -> Vec<ContentItem> {
    (0..n)
        .map(|i| item(&i.to_string(), &[format!("Item {i}").as_str()], &[]))
        .collect()
}

// =========================================================================
// Snapshot fixtures
// =========================================================================

/// Write `value` as the snapshot file for `kind` under `dir`.
pub fn write_snapshot(dir: &Path, kind: ContentKind, value: &Value) {
    let path = dir.join(format!("{}.json", kind.slug()));
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// A temp directory holding a small snapshot for every API-backed kind.
///
/// Articles get 35 entries so the listing spans two pages at the default
/// page size.
pub fn setup_snapshot() -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_snapshot(
        tmp.path(),
        ContentKind::Podcasts,
        &json!([
            {"id": "p1", "title": "Leading Through Change", "featured_speaker": "Dana Reyes", "thumbnail": "/img/p1.jpg"},
            {"id": "p2", "title": "Board Readiness", "featured_speaker": "Sam Okafor"},
            {"id": "p3", "title": "Change Management in Legal", "featured_speaker": "Dana Reyes"}
        ]),
    );
    write_snapshot(
        tmp.path(),
        ContentKind::Videos,
        &json!([
            {"id": 11, "vimeo_name": "Boardroom AI", "featured_speakers": "Ken Banta", "vanguard_vimeo_link": "https://vimeo.com/11"}
        ]),
    );
    write_snapshot(
        tmp.path(),
        ContentKind::Press,
        &json!([
            {"id": "n1", "article_title": "Vanguard in the Journal", "author_names": "Lee Park", "short_description": "Governance trends"}
        ]),
    );
    let articles: Vec<Value> = (1..=35)
        .map(|i| {
            json!({
                "id": i,
                "blog_title": format!("Article {i}"),
                "type_content": if i % 2 == 0 { "Insight" } else { "Interview" },
            })
        })
        .collect();
    write_snapshot(tmp.path(), ContentKind::Articles, &Value::Array(articles));
    write_snapshot(
        tmp.path(),
        ContentKind::Newsroom,
        &json!([
            {"id": 7, "blog_title": "Next Gen GC launches", "type_of_news": "Announcement"}
        ]),
    );
    write_snapshot(
        tmp.path(),
        ContentKind::Events,
        &json!([
            {"id": "e1", "event_title": "Spring Forum", "speaker": "Dana Reyes", "more_details_url": "https://example.com/forum"}
        ]),
    );
    tmp
}

/// Manifest holding the given collections and default config.
pub fn manifest_with(collections: Vec<(ContentKind, Vec<ContentItem>)>) -> Manifest {
    Manifest {
        collections: collections
            .into_iter()
            .map(|(kind, items)| Collection {
                kind,
                origin: format!("test:{}", kind.slug()),
                items,
            })
            .collect(),
        config: SiteConfig::default(),
    }
}

// =========================================================================
// Manifest lookups (panics with a clear message on miss)
// =========================================================================

/// Find a collection by kind. Panics if not found.
pub fn find_collection(manifest: &Manifest, kind: ContentKind) -> &Collection {
    manifest.collection(kind).unwrap_or_else(|| {
        let kinds: Vec<&str> = manifest.collections.iter().map(|c| c.kind.slug()).collect();
        panic!("collection '{}' not found. Available: {kinds:?}", kind.slug())
    })
}

/// All item ids in collection order.
pub fn item_ids(collection: &Collection) -> Vec<&str> {
    collection.items.iter().map(|i| i.id.as_str()).collect()
}
