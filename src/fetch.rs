//! Content fetching and manifest generation.
//!
//! Stage 1 of the build pipeline. Pulls every content kind from a
//! [`ContentSource`], adapts the raw JSON into [`ContentItem`]s, and produces
//! the [`Manifest`] the generate stage consumes.
//!
//! ## Sources
//!
//! - [`ApiSource`]: the live content API (`GET {base_url}/api/podcasts`, ...).
//!   The full array is fetched once per kind; all filtering happens later,
//!   over the fetched list.
//! - [`SnapshotSource`]: a directory of `<slug>.json` files with the same
//!   shape as the API responses. Used for offline builds and tests.
//!
//! Programs never hit a source; they come from the built-in catalogue.

use crate::config::SiteConfig;
use crate::content::{ContentKind, program_catalogue};
use crate::listing::ListingError;
use crate::types::ContentItem;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("Bad content from {source_name}: {error}")]
    Content {
        source_name: String,
        error: ListingError,
    },
}

/// Manifest output from the fetch stage
#[derive(Debug, Serialize, Deserialize)]
pub struct Manifest {
    pub collections: Vec<Collection>,
    pub config: SiteConfig,
}

impl Manifest {
    pub fn collection(&self, kind: ContentKind) -> Option<&Collection> {
        self.collections.iter().find(|c| c.kind == kind)
    }
}

/// All items of one content kind, in source order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub kind: ContentKind,
    /// Where the items came from (URL, snapshot file, or "built-in").
    pub origin: String,
    pub items: Vec<ContentItem>,
}

/// Anything that can hand back the raw JSON for a content kind.
pub trait ContentSource {
    /// Raw response for `kind`, or `None` when the source has nothing for it.
    fn fetch_raw(&self, kind: ContentKind) -> Result<Option<Value>, FetchError>;

    /// Human-readable origin of `kind` for output and error messages.
    fn origin(&self, kind: ContentKind) -> String;
}

/// Live content API.
pub struct ApiSource {
    agent: ureq::Agent,
    base_url: String,
}

impl ApiSource {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            agent,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &SiteConfig) -> Self {
        Self::new(
            &config.api.base_url,
            Duration::from_secs(config.api.timeout_secs),
        )
    }

    fn url_for(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

impl ContentSource for ApiSource {
    fn fetch_raw(&self, kind: ContentKind) -> Result<Option<Value>, FetchError> {
        let Some(endpoint) = kind.endpoint() else {
            return Ok(None);
        };
        let url = self.url_for(endpoint);
        tracing::debug!(%url, "fetching content");

        let mut response = self
            .agent
            .get(&url)
            .header("Accept", "application/json")
            .call()?;
        let status = response.status().as_u16();
        if status != 200 {
            return Err(FetchError::Status { url, status });
        }
        let body = response.body_mut().read_to_string()?;
        Ok(Some(serde_json::from_str(&body)?))
    }

    fn origin(&self, kind: ContentKind) -> String {
        kind.endpoint()
            .map(|e| self.url_for(e))
            .unwrap_or_else(|| "built-in".to_string())
    }
}

/// Directory of `<slug>.json` files mirroring API responses.
pub struct SnapshotSource {
    dir: PathBuf,
}

impl SnapshotSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, kind: ContentKind) -> PathBuf {
        self.dir.join(format!("{}.json", kind.slug()))
    }
}

impl ContentSource for SnapshotSource {
    fn fetch_raw(&self, kind: ContentKind) -> Result<Option<Value>, FetchError> {
        let path = self.path_for(kind);
        if !path.exists() {
            tracing::warn!(path = %path.display(), "no snapshot for {}", kind.slug());
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn origin(&self, kind: ContentKind) -> String {
        self.path_for(kind).display().to_string()
    }
}

/// Fetch every content kind and assemble the manifest.
///
/// A kind the source has nothing for becomes an empty collection; a kind
/// whose response is not a JSON array fails the whole fetch.
pub fn fetch(source: &dyn ContentSource, config: &SiteConfig) -> Result<Manifest, FetchError> {
    let mut collections = Vec::with_capacity(ContentKind::ALL.len());
    for kind in ContentKind::ALL {
        let (raw, origin) = match kind.endpoint() {
            Some(_) => (source.fetch_raw(kind)?, source.origin(kind)),
            None => (Some(program_catalogue()), "built-in".to_string()),
        };
        let items = match raw {
            Some(value) => kind.adapt(&value).map_err(|error| FetchError::Content {
                source_name: origin.clone(),
                error,
            })?,
            None => Vec::new(),
        };
        tracing::info!(kind = kind.slug(), count = items.len(), "collected content");
        collections.push(Collection {
            kind,
            origin,
            items,
        });
    }
    Ok(Manifest {
        collections,
        config: config.clone(),
    })
}

/// Write a manifest as pretty JSON.
pub fn write_manifest(manifest: &Manifest, path: &Path) -> Result<(), FetchError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(manifest)?)?;
    Ok(())
}

/// Read a manifest written by [`write_manifest`].
pub fn read_manifest(path: &Path) -> Result<Manifest, FetchError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{find_collection, item_ids, setup_snapshot, write_snapshot};
    use std::collections::HashMap;
    use tempfile::TempDir;

    /// In-memory source keyed by kind.
    struct MockSource(HashMap<ContentKind, Value>);

    impl ContentSource for MockSource {
        fn fetch_raw(&self, kind: ContentKind) -> Result<Option<Value>, FetchError> {
            Ok(self.0.get(&kind).cloned())
        }

        fn origin(&self, kind: ContentKind) -> String {
            format!("mock:{}", kind.slug())
        }
    }

    #[test]
    fn fetch_collects_every_kind_in_order() {
        let source = MockSource(HashMap::from([(
            ContentKind::Podcasts,
            serde_json::json!([{"id": "p1", "title": "Episode"}]),
        )]));
        let manifest = fetch(&source, &SiteConfig::default()).unwrap();

        let kinds: Vec<_> = manifest.collections.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, ContentKind::ALL);
        assert_eq!(manifest.collection(ContentKind::Podcasts).unwrap().items.len(), 1);
        assert!(manifest.collection(ContentKind::Press).unwrap().items.is_empty());
    }

    #[test]
    fn programs_come_from_catalogue() {
        let source = MockSource(HashMap::new());
        let manifest = fetch(&source, &SiteConfig::default()).unwrap();
        let programs = manifest.collection(ContentKind::Programs).unwrap();
        assert_eq!(programs.origin, "built-in");
        assert_eq!(programs.items.len(), 5);
    }

    #[test]
    fn non_array_response_fails_fetch() {
        let source = MockSource(HashMap::from([(
            ContentKind::Articles,
            serde_json::json!({"detail": "Failed to fetch"}),
        )]));
        let err = fetch(&source, &SiteConfig::default()).unwrap_err();
        assert!(matches!(err, FetchError::Content { .. }));
        assert!(err.to_string().contains("mock:articles"));
    }

    #[test]
    fn snapshot_source_reads_slug_files() {
        let tmp = TempDir::new().unwrap();
        write_snapshot(
            tmp.path(),
            ContentKind::Press,
            &serde_json::json!([{"id": "x", "article_title": "Featured"}]),
        );
        let source = SnapshotSource::new(tmp.path());
        let raw = source.fetch_raw(ContentKind::Press).unwrap().unwrap();
        assert_eq!(raw[0]["id"], "x");
        assert!(source.fetch_raw(ContentKind::Podcasts).unwrap().is_none());
        assert!(source.origin(ContentKind::Press).ends_with("in-the-press.json"));
    }

    #[test]
    fn fetch_from_full_snapshot() {
        let tmp = setup_snapshot();
        let manifest = fetch(&SnapshotSource::new(tmp.path()), &SiteConfig::default()).unwrap();

        let podcasts = find_collection(&manifest, ContentKind::Podcasts);
        assert_eq!(item_ids(podcasts), ["p1", "p2", "p3"]);
        assert!(podcasts.origin.ends_with("podcasts.json"));

        let articles = find_collection(&manifest, ContentKind::Articles);
        assert_eq!(articles.items.len(), 35);
        assert_eq!(articles.items[1].category("type"), Some("Insight"));

        let videos = find_collection(&manifest, ContentKind::Videos);
        assert_eq!(item_ids(videos), ["11"]);
        assert_eq!(videos.items[0].title, "Boardroom AI");

        let newsroom = find_collection(&manifest, ContentKind::Newsroom);
        assert_eq!(newsroom.items[0].category("type"), Some("Announcement"));

        let events = find_collection(&manifest, ContentKind::Events);
        assert_eq!(
            events.items[0].link.as_deref(),
            Some("https://example.com/forum")
        );
    }

    #[test]
    fn snapshot_with_bad_json_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("podcasts.json"), "[{").unwrap();
        let source = SnapshotSource::new(tmp.path());
        assert!(matches!(
            source.fetch_raw(ContentKind::Podcasts),
            Err(FetchError::Json(_))
        ));
    }

    #[test]
    fn manifest_write_then_read() {
        let tmp = TempDir::new().unwrap();
        let source = MockSource(HashMap::new());
        let manifest = fetch(&source, &SiteConfig::default()).unwrap();
        let path = tmp.path().join("nested/manifest.json");
        write_manifest(&manifest, &path).unwrap();
        let back = read_manifest(&path).unwrap();
        assert_eq!(back.collections.len(), manifest.collections.len());
        assert_eq!(back.config.site_name, manifest.config.site_name);
    }

    #[test]
    fn api_source_joins_endpoint_without_double_slash() {
        let source = ApiSource::new("https://api.example.com/", Duration::from_secs(5));
        assert_eq!(
            source.origin(ContentKind::Podcasts),
            "https://api.example.com/api/podcasts"
        );
        assert_eq!(source.origin(ContentKind::Programs), "built-in");
    }
}
