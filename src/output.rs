//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every entity (collection, item, page) is its semantic identity, a
//! positional index and title, with origins and URLs shown as secondary
//! context on indented lines.
//!
//! # Output Format
//!
//! ## Fetch
//!
//! ```text
//! Collections
//! 001 Podcasts (3 podcasts)
//!     Source: https://api.example.com/api/podcasts
//! 002 In The Press (0 press articles)
//!     Source: snapshot/in-the-press.json
//! ```
//!
//! ## Generate
//!
//! ```text
//! Home → index.html
//! 001 Podcasts → podcasts/ (3 items, 1 page)
//! 002 Articles → articles/ (65 items, 3 pages)
//!
//! Pages
//! 001 about → about/
//!
//! Generated 3 listing pages, 68 detail pages, 1 page (73 files)
//! ```
//!
//! ## List
//!
//! ```text
//! Articles: Showing 65 of 65 articles (page 2 of 3)
//! 031 Item 30
//!     /article/30/
//! ...
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::breadcrumb::Crumb;
use crate::content::ContentKind;
use crate::fetch::Manifest;
use crate::generate::{GenerateReport, detail_url, listing_url};
use crate::listing::ListingView;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(count: usize, singular: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {singular}s")
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

// ============================================================================
// Fetch
// ============================================================================

pub fn format_fetch_output(manifest: &Manifest) -> Vec<String> {
    let mut lines = vec!["Collections".to_string()];
    for (i, collection) in manifest.collections.iter().enumerate() {
        lines.push(format!(
            "{} {} ({} {})",
            format_index(i + 1),
            collection.kind.title(),
            collection.items.len(),
            collection.kind.noun()
        ));
        lines.push(format!("{}Source: {}", indent(1), collection.origin));
    }
    lines
}

pub fn print_fetch_output(manifest: &Manifest) {
    for line in format_fetch_output(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate
// ============================================================================

pub fn format_generate_output(report: &GenerateReport) -> Vec<String> {
    let mut lines = vec!["Home → index.html".to_string()];
    for (i, listing) in report.listings.iter().enumerate() {
        lines.push(format!(
            "{} {} → {} ({}, {})",
            format_index(i + 1),
            listing.kind.title(),
            listing_url(listing.kind, 1).trim_start_matches('/'),
            plural(listing.items, "item"),
            plural(listing.pages, "page")
        ));
    }

    if !report.static_pages.is_empty() {
        lines.push(String::new());
        lines.push("Pages".to_string());
        for (i, path) in report.static_pages.iter().enumerate() {
            lines.push(format!("{} {} → {}/", format_index(i + 1), path, path));
        }
    }

    let listing_pages: usize = report.listings.iter().map(|l| l.pages).sum();
    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}, {} ({})",
        plural(listing_pages, "listing page"),
        plural(report.detail_pages, "detail page"),
        plural(report.static_pages.len(), "page"),
        plural(report.files_written, "file")
    ));
    lines
}

pub fn print_generate_output(report: &GenerateReport) {
    for line in format_generate_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// List
// ============================================================================

/// One listing view: summary header, then each visible item with its URL
/// and a shortened summary. Items are numbered by position in the filtered list.
pub fn format_listing(kind: ContentKind, view: &ListingView, page_size: usize) -> Vec<String> {
    let mut lines = vec![format!(
        "{}: {} (page {} of {})",
        kind.title(),
        view.summary(kind.noun()),
        view.page,
        view.page_count
    )];
    let offset = view.page.saturating_sub(1).saturating_mul(page_size);
    for (i, item) in view.visible_items.iter().enumerate() {
        let title = if item.title.is_empty() {
            format!("({})", item.id)
        } else {
            item.title.clone()
        };
        lines.push(format!("{} {}", format_index(offset + i + 1), title));
        if let Some(url) = detail_url(kind, &item.id) {
            lines.push(format!("{}{}", indent(1), url));
        }
        if let Some(summary) = &item.summary {
            lines.push(format!("{}{}", indent(1), truncate(summary, 80)));
        }
    }
    lines
}

pub fn print_listing(kind: ContentKind, view: &ListingView, page_size: usize) {
    for line in format_listing(kind, view, page_size) {
        println!("{}", line);
    }
}

// ============================================================================
// Crumbs
// ============================================================================

/// Breadcrumb trail on one line, then one line per entry with its link.
///
/// ```text
/// Home › Podcasts › Leadership Talk
/// Home → /
/// Podcasts → /podcasts
/// Leadership Talk (current)
/// ```
pub fn format_crumbs(crumbs: &[Crumb]) -> Vec<String> {
    let trail: Vec<&str> = crumbs.iter().map(|c| c.display_label.as_str()).collect();
    let mut lines = vec![trail.join(" › ")];
    for crumb in crumbs {
        if crumb.is_terminal {
            lines.push(format!("{} (current)", crumb.display_label));
        } else {
            lines.push(format!("{} → {}", crumb.display_label, crumb.link_target));
        }
    }
    lines
}

pub fn print_crumbs(crumbs: &[Crumb]) {
    for line in format_crumbs(crumbs) {
        println!("{}", line);
    }
}
