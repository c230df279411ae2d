//! Site configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! serialized to a TOML table, the user's file is merged on top, and the
//! result is deserialized with unknown keys rejected.
//!
//! ## Config File Location
//!
//! ```text
//! content/
//! ├── config.toml              # Site config (optional)
//! └── pages/
//!     └── 010-about.md
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! site_name = "The Vanguard Network"
//!
//! [api]
//! base_url = "http://localhost:8001"  # Content API root
//! timeout_secs = 30
//!
//! [listing]
//! page_size = 30            # Items per page on paginated listings
//!
//! [lazy_images]
//! root_margin_px = 50       # Start loading this far before the viewport
//! priority_count = 3        # Leading images on a listing loaded eagerly
//!
//! [breadcrumbs.labels]      # Extra segment → label entries
//! book = "The Book"
//!
//! [breadcrumbs.detail_parents]
//! story = "/success-stories"
//!
//! [processing]
//! max_processes = 4         # Max parallel render workers (omit for auto)
//! ```
//!
//! ## Environment
//!
//! `VANGUARD_BACKEND_URL` overrides `api.base_url`; see [`apply_env_overrides`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Environment variable overriding `api.base_url`.
pub const BACKEND_URL_ENV: &str = "VANGUARD_BACKEND_URL";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Appended to every page title (`"Podcasts | The Vanguard Network"`).
    pub site_name: String,
    pub api: ApiConfig,
    pub listing: ListingConfig,
    pub lazy_images: LazyImagesConfig,
    pub breadcrumbs: BreadcrumbsConfig,
    pub processing: ProcessingConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: "The Vanguard Network".to_string(),
            api: ApiConfig::default(),
            listing: ListingConfig::default(),
            lazy_images: LazyImagesConfig::default(),
            breadcrumbs: BreadcrumbsConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.listing.page_size == 0 {
            return Err(ConfigError::Validation(
                "listing.page_size must be positive".into(),
            ));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.timeout_secs must be positive".into(),
            ));
        }
        if let Err(e) = url::Url::parse(&self.api.base_url) {
            return Err(ConfigError::Validation(format!(
                "api.base_url is not a valid URL ({}): {e}",
                self.api.base_url
            )));
        }
        Ok(())
    }

    /// Format a page title: `"{title} | {site_name}"`, or just the site name.
    pub fn page_title(&self, title: &str) -> String {
        if title.is_empty() {
            self.site_name.clone()
        } else {
            format!("{} | {}", title, self.site_name)
        }
    }
}

/// Content API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Root URL; endpoint paths like `/api/podcasts` are appended.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Listing pagination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ListingConfig {
    /// Items per page on paginated listings (podcasts, articles).
    pub page_size: usize,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: crate::listing::DEFAULT_PAGE_SIZE,
        }
    }
}

/// Deferred image loading settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LazyImagesConfig {
    /// Proximity margin (px) at which a deferred image starts loading.
    pub root_margin_px: u32,
    /// Number of leading images per listing page treated as above-the-fold.
    pub priority_count: usize,
}

impl Default for LazyImagesConfig {
    fn default() -> Self {
        Self {
            root_margin_px: crate::lazy_image::DEFAULT_ROOT_MARGIN_PX,
            priority_count: 3,
        }
    }
}

/// Extra breadcrumb table entries, layered over the built-in site tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BreadcrumbsConfig {
    pub labels: BTreeMap<String, String>,
    pub detail_parents: BTreeMap<String, String>,
}

/// Parallel rendering settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel render workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(dir)?;
    let config = resolve_config(base, overlay)?;
    tracing::debug!(dir = %dir.display(), "loaded site config");
    Ok(config)
}

/// Apply environment overrides to a loaded config and re-validate.
///
/// `lookup` abstracts `std::env::var` so tests don't touch the process env.
pub fn apply_env_overrides(
    config: &mut SiteConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), ConfigError> {
    if let Some(url) = lookup(BACKEND_URL_ENV).filter(|u| !u.trim().is_empty()) {
        tracing::info!(base_url = %url, "api.base_url overridden by {BACKEND_URL_ENV}");
        config.api.base_url = url;
    }
    config.validate()
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Vanguard Site Configuration
# ===========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Appended to every page title: "Podcasts | The Vanguard Network"
site_name = "The Vanguard Network"

# ---------------------------------------------------------------------------
# Content API
# ---------------------------------------------------------------------------
[api]
# Root URL of the content API. Endpoint paths (/api/podcasts, ...) are
# appended. The VANGUARD_BACKEND_URL environment variable overrides this.
base_url = "http://localhost:8001"

# Per-request timeout in seconds.
timeout_secs = 30

# ---------------------------------------------------------------------------
# Listings
# ---------------------------------------------------------------------------
[listing]
# Items per page on paginated listings (podcasts, articles).
page_size = 30

# ---------------------------------------------------------------------------
# Lazy images
# ---------------------------------------------------------------------------
[lazy_images]
# Start loading a deferred image this many pixels before it enters the viewport.
root_margin_px = 50

# Leading images on each listing page that load eagerly (above the fold).
priority_count = 3

# ---------------------------------------------------------------------------
# Breadcrumbs
# ---------------------------------------------------------------------------
# Extra entries layered over the built-in tables.
[breadcrumbs.labels]
# book = "The Book"

[breadcrumbs.detail_parents]
# story = "/success-stories"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel render workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
