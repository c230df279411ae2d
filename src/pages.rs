//! Static markdown pages.
//!
//! Every `.md` file under `content/pages/` becomes one page. The directory
//! structure is the URL structure, with the `NNN-` ordering prefix stripped
//! from each component:
//!
//! ```text
//! content/pages/
//! ├── 010-about.md                 → /about            (in nav, position 10)
//! ├── 020-advisory.md              → /advisory         (in nav, position 20)
//! ├── privacy.md                   → /privacy          (hidden from nav)
//! └── programs/
//!     ├── gc-exchange.md           → /programs/gc-exchange
//!     └── index.md                 → skipped
//! ```
//!
//! Only top-level numbered files appear in navigation. `index.md` files are
//! skipped: the site index and listing indexes are generated.
//!
//! The first `# heading` in the file is the page title; without one the
//! title falls back to the file name with dashes turned into spaces.

use crate::types::Page;
use std::fs;
use std::path::Path;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum PagesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Split an optional `NNN-` ordering prefix off a file or directory name.
///
/// `"010-about"` → `(Some(10), "about")`; `"privacy"` → `(None, "privacy")`.
pub fn split_order_prefix(name: &str) -> (Option<u32>, &str) {
    if let Some((prefix, rest)) = name.split_once('-')
        && !prefix.is_empty()
        && prefix.chars().all(|c| c.is_ascii_digit())
        && let Ok(number) = prefix.parse::<u32>()
    {
        return (Some(number), rest);
    }
    (None, name)
}

/// Collect all pages under `dir`, sorted nav pages first by number, then by path.
///
/// A missing directory yields no pages.
pub fn scan_pages(dir: &Path) -> Result<Vec<Page>, PagesError> {
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "no pages directory");
        return Ok(Vec::new());
    }

    let mut pages = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().is_none_or(|e| e != "md") {
            continue;
        }
        let Ok(relative) = path.strip_prefix(dir) else {
            continue;
        };
        let depth = relative.components().count();

        let mut segments = Vec::with_capacity(depth);
        let mut sort_key = None;
        for (i, component) in relative.with_extension("").components().enumerate() {
            let name = component.as_os_str().to_string_lossy();
            let (number, slug) = split_order_prefix(&name);
            if i + 1 == depth {
                sort_key = number;
            }
            segments.push(slug.to_string());
        }
        if segments.last().is_some_and(|s| s == "index") {
            tracing::warn!(path = %path.display(), "skipping index page");
            continue;
        }

        let body = fs::read_to_string(path)?;
        let link_title = segments
            .last()
            .map(|s| s.replace('-', " "))
            .unwrap_or_default();
        let title = first_heading(&body).unwrap_or_else(|| link_title.clone());
        pages.push(Page {
            title,
            link_title,
            path: segments.join("/"),
            body,
            in_nav: depth == 1 && sort_key.is_some(),
            sort_key: sort_key.unwrap_or(u32::MAX),
        });
    }

    pages.sort_by(|a, b| {
        b.in_nav
            .cmp(&a.in_nav)
            .then(a.sort_key.cmp(&b.sort_key))
            .then_with(|| a.path.cmp(&b.path))
    });
    Ok(pages)
}

/// Text of the first `# ` heading, if any.
fn first_heading(markdown: &str) -> Option<String> {
    markdown
        .lines()
        .find_map(|line| line.trim().strip_prefix("# "))
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
}
