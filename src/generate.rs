//! HTML site generation.
//!
//! Stage 2 of the build pipeline. Takes the fetch manifest and the markdown
//! pages and renders the final static HTML site.
//!
//! ## Generated Pages
//!
//! - **Index page** (`/index.html`): one card per content collection
//! - **Listing pages** (`/{kind}/index.html`, `/{kind}/{n}/index.html`): the
//!   card grid for one page of a collection, with the filter controls, the
//!   "Showing N of M" summary, and the numbered pagination bar
//! - **Listing data** (`/{kind}/items.json`): the collection's cards and
//!   paging settings, read by `static/listing.js`
//! - **Detail pages** (`/{kind-singular}/{id}/index.html`): one item, followed
//!   by related items from the same collection
//! - **Static pages** (`/{path}/index.html`): markdown from `content/pages/`
//!
//! Every page carries a breadcrumb trail resolved from its URL path.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html
//! ├── podcasts/
//! │   ├── index.html             # page 1
//! │   ├── 2/index.html           # page 2
//! │   └── items.json             # listing data for client-side filtering
//! ├── podcast/
//! │   └── p1/index.html          # detail
//! ├── articles/ ...
//! ├── in-the-press/index.html    # unpaginated: full list on one page
//! └── about/index.html           # from content/pages/010-about.md
//! ```
//!
//! ## Images
//!
//! Card and hero images go through [`LazyImage`]. Priority images (the
//! leading cards of each listing page, detail heroes) are written with their
//! source, `loading="eager"` and `decoding="sync"`. The rest are written
//! pending: the source sits in `data-src` and `static/lazy.js` assigns it once
//! the image nears the viewport, swapping in the fallback graphic on error.
//!
//! ## Filtering
//!
//! Listing pages are written unfiltered. The filter form ships `hidden`;
//! `static/listing.js` reveals it once the listing data has loaded, then
//! applies search, category filters and pagination in the browser with the
//! same rules as [`listing`], keeping `page`, `q` and each dimension in the
//! query string. A query present on load is authoritative.
//!
//! ## CSS and JavaScript
//!
//! Static assets are embedded at compile time:
//! - `static/style.css`: Base styles
//! - `static/lazy.js`: Deferred image loading
//! - `static/listing.js`: Client-side search, filters and pagination
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Templates are type-safe Rust code with automatic XSS escaping. Pages are
//! rendered in parallel on the rayon pool and written out sequentially.

use crate::breadcrumb::{BreadcrumbResolver, Crumb};
use crate::config::{ConfigError, SiteConfig};
use crate::content::{ContentKind, PROGRAM_CATEGORIES, PROGRAM_LEVELS};
use crate::fetch::{Collection, FetchError, Manifest, read_manifest};
use crate::lazy_image::{FALLBACK_PLACEHOLDER, ImageDescriptor, LazyImage};
use crate::listing::{
    self, FilterState, ListingError, ListingView, PageLink, next_page, page_window, previous_page,
    related_items,
};
use crate::pages::{PagesError, scan_pages};
use crate::types::{ContentItem, NavItem, Page};
use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Manifest error: {0}")]
    Fetch(#[from] FetchError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Listing error: {0}")]
    Listing(#[from] ListingError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Pages error: {0}")]
    Pages(#[from] PagesError),
}

const CSS: &str = include_str!("../static/style.css");
const JS: &str = include_str!("../static/lazy.js");
const LISTING_JS: &str = include_str!("../static/listing.js");

/// File name of the listing data written next to each listing's first page.
pub const LISTING_DATA_FILE: &str = "items.json";

/// Related items shown under a detail page.
const RELATED_LIMIT: usize = 3;

/// What the generate stage wrote.
#[derive(Debug, Default)]
pub struct GenerateReport {
    pub listings: Vec<ListingReport>,
    pub detail_pages: usize,
    /// URL paths of rendered markdown pages.
    pub static_pages: Vec<String>,
    pub files_written: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingReport {
    pub kind: ContentKind,
    pub items: usize,
    pub pages: usize,
}

/// Read the manifest and `{source_dir}/pages`, render the site into `output_dir`.
pub fn generate(
    manifest_path: &Path,
    source_dir: &Path,
    output_dir: &Path,
) -> Result<GenerateReport, GenerateError> {
    let manifest = read_manifest(manifest_path)?;
    let pages = scan_pages(&source_dir.join("pages"))?;
    generate_site(&manifest, &pages, output_dir)
}

/// Render every page for `manifest` and `pages` into `output_dir`.
pub fn generate_site(
    manifest: &Manifest,
    pages: &[Page],
    output_dir: &Path,
) -> Result<GenerateReport, GenerateError> {
    manifest.config.validate()?;
    let renderer = Renderer::new(manifest, pages);
    let mut report = GenerateReport::default();

    let mut jobs = vec![Job::Index];
    // Routes already taken by a detail or markdown page; the first claim wins
    let mut claimed = HashSet::new();
    for collection in &manifest.collections {
        let page_count = renderer.page_count(collection);
        jobs.extend((1..=page_count).map(|page| Job::Listing { collection, page }));
        jobs.push(Job::ListingData(collection));
        report.listings.push(ListingReport {
            kind: collection.kind,
            items: collection.items.len(),
            pages: page_count,
        });

        for item in &collection.items {
            let Some(url) = detail_url(collection.kind, &item.id) else {
                tracing::warn!(kind = collection.kind.slug(), id = %item.id, "skipping detail page for unsafe id");
                continue;
            };
            if !claimed.insert(url) {
                tracing::warn!(kind = collection.kind.slug(), id = %item.id, "duplicate item id; keeping the first");
                continue;
            }
            jobs.push(Job::Detail { collection, item });
            report.detail_pages += 1;
        }
    }
    for page in pages {
        if is_reserved_path(&page.path) {
            tracing::warn!(path = %page.path, "page path collides with a generated route; skipping");
            continue;
        }
        if !claimed.insert(format!("/{}/", page.path)) {
            tracing::warn!(path = %page.path, "two pages share this path; keeping the first");
            continue;
        }
        jobs.push(Job::Page(page));
        report.static_pages.push(page.path.clone());
    }

    let rendered = jobs
        .par_iter()
        .map(|job| -> Result<(PathBuf, String), GenerateError> {
            Ok((job.output_path(), renderer.render(job)?))
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (relative, html) in &rendered {
        let path = output_dir.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, html)?;
        tracing::debug!(path = %relative.display(), "wrote page");
    }
    report.files_written = rendered.len();
    tracing::info!(files = report.files_written, output = %output_dir.display(), "site generated");
    Ok(report)
}

// ============================================================================
// Routes
// ============================================================================

/// URL of page `page` of a listing: page 1 is the bare listing path.
pub fn listing_url(kind: ContentKind, page: usize) -> String {
    if page <= 1 {
        format!("/{}/", kind.slug())
    } else {
        format!("/{}/{}/", kind.slug(), page)
    }
}

/// URL of a listing's data file.
pub fn listing_data_url(kind: ContentKind) -> String {
    format!("/{}/{}", kind.slug(), LISTING_DATA_FILE)
}

/// URL of an item's detail page, or `None` when the id cannot be a path segment.
pub fn detail_url(kind: ContentKind, id: &str) -> Option<String> {
    let safe = !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\', '?', '#']);
    safe.then(|| format!("/{}/{}/", kind.detail_segment(), id))
}

/// Paths owned by generated listings and detail pages.
fn is_reserved_path(path: &str) -> bool {
    let first = path.split('/').next().unwrap_or_default();
    first.is_empty()
        || ContentKind::ALL
            .iter()
            .any(|k| k.slug() == first || k.detail_segment() == first)
}

/// Only absolute http(s) links and site-relative paths are emitted.
fn safe_href(url: &str) -> Option<&str> {
    let ok = url.starts_with("https://")
        || url.starts_with("http://")
        || (url.starts_with('/') && !url.starts_with("//"));
    ok.then_some(url)
}

enum Job<'a> {
    Index,
    Listing {
        collection: &'a Collection,
        page: usize,
    },
    ListingData(&'a Collection),
    Detail {
        collection: &'a Collection,
        item: &'a ContentItem,
    },
    Page(&'a Page),
}

impl Job<'_> {
    fn output_path(&self) -> PathBuf {
        let url = match self {
            Job::Index => String::new(),
            Job::Listing { collection, page } => listing_url(collection.kind, *page),
            Job::ListingData(collection) => {
                return PathBuf::from(listing_data_url(collection.kind).trim_start_matches('/'));
            }
            Job::Detail { collection, item } => {
                detail_url(collection.kind, &item.id).unwrap_or_default()
            }
            Job::Page(page) => format!("/{}/", page.path),
        };
        PathBuf::from(url.trim_matches('/')).join("index.html")
    }
}

/// What `static/listing.js` needs to filter and page a listing in the browser.
#[derive(Debug, Serialize)]
struct ListingData<'a> {
    noun: &'static str,
    /// `None` for listings shown in full.
    page_size: Option<usize>,
    priority_count: usize,
    root_margin_px: u32,
    fallback: &'static str,
    items: Vec<ListingEntry<'a>>,
}

/// One card, with the fields search and category filters run over.
#[derive(Debug, Serialize)]
struct ListingEntry<'a> {
    id: &'a str,
    title: &'a str,
    href: Option<String>,
    image: Option<ImageEntry<'a>>,
    summary: Option<&'a str>,
    date: Option<&'a str>,
    searchable: &'a [String],
    categories: &'a BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct ImageEntry<'a> {
    src: &'a str,
    aspect_ratio: String,
}

// ============================================================================
// Renderer
// ============================================================================

struct Renderer<'a> {
    manifest: &'a Manifest,
    config: &'a SiteConfig,
    resolver: BreadcrumbResolver,
    nav: Vec<NavItem>,
}

impl<'a> Renderer<'a> {
    fn new(manifest: &'a Manifest, pages: &[Page]) -> Self {
        let config = &manifest.config;
        let resolver = BreadcrumbResolver::for_site(
            &config.breadcrumbs.labels,
            &config.breadcrumbs.detail_parents,
        );
        let nav = manifest
            .collections
            .iter()
            .map(|c| NavItem {
                title: c.kind.title().to_string(),
                path: c.kind.slug().to_string(),
            })
            .chain(pages.iter().filter(|p| p.in_nav).map(|p| NavItem {
                title: p.link_title.clone(),
                path: p.path.clone(),
            }))
            .collect();
        Self {
            manifest,
            config,
            resolver,
            nav,
        }
    }

    fn page_count(&self, collection: &Collection) -> usize {
        if collection.kind.is_paginated() {
            listing::page_count(collection.items.len(), self.config.listing.page_size)
        } else {
            1
        }
    }

    /// Filter state for the static rendering of `page`.
    fn filter_for(&self, kind: ContentKind, page: usize) -> FilterState {
        if kind.is_paginated() {
            let mut filter = FilterState::new(self.config.listing.page_size);
            filter.set_page(page);
            filter
        } else {
            FilterState::full_list()
        }
    }

    fn render(&self, job: &Job) -> Result<String, GenerateError> {
        let markup = match job {
            Job::Index => self.render_index(),
            Job::Listing { collection, page } => self.render_listing(collection, *page)?,
            Job::ListingData(collection) => {
                return Ok(serde_json::to_string(&self.listing_data(collection))?);
            }
            Job::Detail { collection, item } => self.render_detail(collection, item),
            Job::Page(page) => self.render_page(page),
        };
        Ok(markup.into_string())
    }

    fn listing_data<'c>(&self, collection: &'c Collection) -> ListingData<'c> {
        let kind = collection.kind;
        let items = collection
            .items
            .iter()
            .map(|item| ListingEntry {
                id: &item.id,
                title: &item.title,
                href: detail_url(kind, &item.id),
                image: item.image.as_deref().and_then(safe_href).map(|src| ImageEntry {
                    src,
                    aspect_ratio: ImageDescriptor::new(src, item.title.as_str()).aspect_ratio(),
                }),
                summary: item.summary.as_deref(),
                date: item.date.as_deref(),
                searchable: &item.searchable_fields,
                categories: &item.category_fields,
            })
            .collect();
        ListingData {
            noun: kind.noun(),
            page_size: kind.is_paginated().then_some(self.config.listing.page_size),
            priority_count: self.config.lazy_images.priority_count,
            root_margin_px: self.config.lazy_images.root_margin_px,
            fallback: FALLBACK_PLACEHOLDER,
            items,
        }
    }

    /// Wraps page content in the document shell, header, and breadcrumb trail.
    fn document(&self, title: &str, current_path: &str, crumbs: &[Crumb], main: Markup) -> Markup {
        let content = html! {
            (site_header(&self.config.site_name, render_nav(&self.nav, current_path)))
            (render_breadcrumbs(crumbs))
            (main)
            script { (PreEscaped(JS)) }
            script { (PreEscaped(LISTING_JS)) }
        };
        base_document(&self.config.page_title(title), CSS, content)
    }

    fn render_index(&self) -> Markup {
        let crumbs = self.resolver.resolve("/", None);
        let main = html! {
            main.index-page {
                h1 { (self.config.site_name) }
                div.collection-grid {
                    @for collection in &self.manifest.collections {
                        a.collection-card href=(listing_url(collection.kind, 1)) {
                            strong { (collection.kind.title()) }
                            span { (collection.items.len()) " " (collection.kind.noun()) }
                        }
                    }
                }
            }
        };
        self.document("", "", &crumbs, main)
    }

    /// Unfiltered page `page` of `collection`.
    fn render_listing(&self, collection: &Collection, page: usize) -> Result<Markup, GenerateError> {
        let kind = collection.kind;
        let filter = self.filter_for(kind, page);
        let view = listing::view_of(&collection.items, &filter)?;

        let (path, title) = if view.page > 1 {
            (
                format!("/{}/{}", kind.slug(), view.page),
                format!("{} - Page {}", kind.title(), view.page),
            )
        } else {
            (format!("/{}", kind.slug()), kind.title().to_string())
        };
        let page_label = format!("Page {}", view.page);
        let crumbs = self
            .resolver
            .resolve(&path, (view.page > 1).then_some(page_label.as_str()));

        let main = html! {
            main.listing-page data-listing=(listing_data_url(kind)) data-path=(listing_url(kind, 1))
                data-page=(view.page) {
                h1 { (kind.title()) }
                (render_filters(kind, &collection.items))
                p.listing-summary { (view.summary(kind.noun())) }
                div.listing-results {
                    @if view.visible_items.is_empty() {
                        p.empty-state { "No " (kind.noun()) " yet." }
                    } @else {
                        div.card-grid {
                            @for (index, item) in view.visible_items.iter().enumerate() {
                                (self.render_card(kind, item, index < self.config.lazy_images.priority_count))
                            }
                        }
                    }
                }
                div.listing-pages {
                    @if kind.is_paginated() && view.page_count > 1 {
                        (render_pagination(kind, &view))
                    }
                }
            }
        };
        Ok(self.document(&title, kind.slug(), &crumbs, main))
    }

    fn render_card(&self, kind: ContentKind, item: &ContentItem, priority: bool) -> Markup {
        let href = detail_url(kind, &item.id);
        let image = self.lazy_image(item, priority);
        html! {
            article.card {
                @if let Some(image) = &image {
                    @if let Some(href) = &href {
                        a href=(href) tabindex="-1" { (render_image(image)) }
                    } @else {
                        (render_image(image))
                    }
                }
                div.card-body {
                    h2 {
                        @if let Some(href) = &href {
                            a href=(href) { (item.title) }
                        } @else {
                            (item.title)
                        }
                    }
                    @if let Some(summary) = &item.summary {
                        p { (summary) }
                    }
                    @if let Some(date) = &item.date {
                        time { (date) }
                    }
                }
            }
        }
    }

    fn lazy_image(&self, item: &ContentItem, priority: bool) -> Option<LazyImage> {
        let src = safe_href(item.image.as_deref()?)?;
        let descriptor = ImageDescriptor::new(src, item.title.as_str()).with_priority(priority);
        Some(LazyImage::with_root_margin(
            descriptor,
            self.config.lazy_images.root_margin_px,
        ))
    }

    fn render_detail(&self, collection: &Collection, item: &ContentItem) -> Markup {
        let kind = collection.kind;
        let related = related_items(&collection.items, item, RELATED_LIMIT);
        let path = format!("/{}/{}", kind.detail_segment(), item.id);
        let crumbs = self.resolver.resolve(&path, Some(item.title.as_str()));
        let hero = self.lazy_image(item, true);
        let link = item.link.as_deref().and_then(safe_href);

        let main = html! {
            main.detail-page {
                article {
                    @if let Some(hero) = &hero {
                        div.hero { (render_image(hero)) }
                    }
                    h1 { (item.title) }
                    @if let Some(date) = &item.date {
                        p.detail-meta { time { (date) } }
                    }
                    @if let Some(summary) = &item.summary {
                        p { (summary) }
                    }
                    @if let Some(link) = link {
                        a.detail-link href=(link) rel="noopener" { (link_label(kind)) }
                    }
                    p {
                        a href=(listing_url(kind, 1)) { "Back to " (kind.title()) }
                    }
                }
                @if !related.is_empty() {
                    section.related {
                        h2 { "Similar " (kind.noun()) }
                        div.card-grid {
                            @for other in &related {
                                (self.render_card(kind, other, false))
                            }
                        }
                    }
                }
            }
        };
        let title: &str = if item.title.is_empty() {
            kind.title()
        } else {
            &item.title
        };
        self.document(title, kind.slug(), &crumbs, main)
    }

    fn render_page(&self, page: &Page) -> Markup {
        let crumbs = self.resolver.resolve(&page.path, Some(page.title.as_str()));

        let parser = Parser::new(&page.body);
        let mut body_html = String::new();
        md_html::push_html(&mut body_html, parser);

        let main = html! {
            main.static-page {
                article.page-content {
                    (PreEscaped(body_html))
                }
            }
        };
        self.document(&page.title, &page.path, &crumbs, main)
    }
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure
fn base_document(title: &str, css: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Renders the site header with the site name and navigation
fn site_header(site_name: &str, nav: Markup) -> Markup {
    html! {
        header.site-header {
            a.site-name href="/" { (site_name) }
            nav.site-nav {
                (nav)
            }
        }
    }
}

/// Renders the top-level navigation
pub fn render_nav(items: &[NavItem], current_path: &str) -> Markup {
    html! {
        ul {
            @for item in items {
                @let is_current = item.path == current_path
                    || current_path.starts_with(&format!("{}/", item.path));
                li class=[is_current.then_some("current")] {
                    a href={ "/" (item.path) "/" } { (item.title) }
                }
            }
        }
    }
}

/// Renders a breadcrumb trail; the terminal entry is text, the rest links.
pub fn render_breadcrumbs(crumbs: &[Crumb]) -> Markup {
    html! {
        nav.breadcrumb aria-label="Breadcrumb" {
            ol {
                @for crumb in crumbs {
                    li {
                        @if crumb.is_terminal {
                            span aria-current="page" { (crumb.display_label) }
                        } @else {
                            a href=(crumb.link_target) { (crumb.display_label) }
                        }
                    }
                }
            }
        }
    }
}

/// Renders one image in its current load state.
pub fn render_image(image: &LazyImage) -> Markup {
    let descriptor = image.descriptor();
    let aspect = format!("aspect-ratio: {};", descriptor.aspect_ratio());
    html! {
        div.lazy-image data-state=(image.state().as_str()) style=(aspect) {
            @if let Some(src) = image.current_src() {
                img src=(src) alt=(descriptor.alt)
                    loading=(image.loading_attr()) decoding=(image.decoding_attr())
                    width=[descriptor.width] height=[descriptor.height]
                    data-fallback=(FALLBACK_PLACEHOLDER);
            } @else {
                img data-src=(descriptor.src) alt=(descriptor.alt)
                    loading=(image.loading_attr()) decoding=(image.decoding_attr())
                    width=[descriptor.width] height=[descriptor.height]
                    data-root-margin=[image.subscription().map(|s| s.root_margin_px())]
                    data-fallback=(FALLBACK_PLACEHOLDER);
                noscript {
                    img src=(descriptor.src) alt=(descriptor.alt) loading="lazy";
                }
            }
        }
    }
}

/// Search box and one dropdown per filter dimension. Hidden until
/// `static/listing.js` takes over the listing; the field names are the query
/// parameters [`FilterState::from_query`] reads.
fn render_filters(kind: ContentKind, items: &[ContentItem]) -> Markup {
    html! {
        form.filters hidden method="get" action=(listing_url(kind, 1)) {
            label.filter-group {
                "Search "
                input type="search" name=(listing::SEARCH_PARAM)
                    placeholder={ "Search " (kind.noun()) };
            }
            @for dimension in kind.dimensions() {
                label.filter-group {
                    (dimension_label(dimension)) " "
                    select name=(dimension) {
                        @for option in dimension_options(kind, items, dimension) {
                            option value=(option) selected[option == listing::ALL] {
                                (option)
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Dropdown options: the fixed program lists, or the values present in `items`.
fn dimension_options(kind: ContentKind, items: &[ContentItem], dimension: &str) -> Vec<String> {
    let fixed = match (kind, dimension) {
        (ContentKind::Programs, "category") => Some(PROGRAM_CATEGORIES),
        (ContentKind::Programs, "level") => Some(PROGRAM_LEVELS),
        _ => None,
    };
    match fixed {
        Some(options) => options.iter().map(|o| o.to_string()).collect(),
        None => listing::distinct_values(items, dimension),
    }
}

fn dimension_label(dimension: &str) -> String {
    let mut chars = dimension.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn link_label(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Podcasts => "Listen",
        ContentKind::Videos => "Watch",
        ContentKind::Newsroom => "Read more",
        ContentKind::Press => "Read the article",
        ContentKind::Articles => "Read more",
        ContentKind::Events => "Register",
        ContentKind::Programs => "Learn more",
    }
}

/// Previous / numbered window / Next.
fn render_pagination(kind: ContentKind, view: &ListingView) -> Markup {
    let current = view.page;
    html! {
        nav.pagination aria-label="Pagination" {
            @if current > 1 {
                a.prev href=(listing_url(kind, previous_page(current))) { "Previous" }
            } @else {
                span.prev.disabled { "Previous" }
            }
            @for link in page_window(current, view.page_count) {
                @match link {
                    PageLink::Page(n) => {
                        @if n == current {
                            span.current aria-current="page" { (n) }
                        } @else {
                            a href=(listing_url(kind, n)) { (n) }
                        }
                    },
                    PageLink::Ellipsis => {
                        span.ellipsis { "…" }
                    },
                }
            }
            @if current < view.page_count {
                a.next href=(listing_url(kind, next_page(current, view.page_count))) { "Next" }
            } @else {
                span.next.disabled { "Next" }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
