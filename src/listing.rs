//! Content listing: search, category filters, and pagination.
//!
//! Every listing page (podcasts, press, articles, programs, events) runs the
//! same two steps over an already-fetched list of [`ContentItem`]s:
//!
//! ```text
//! items ──apply_filters(filter)──▶ filtered ──paginate(page, page_size)──▶ visible page
//! ```
//!
//! Both steps are pure functions of their inputs. Neither mutates the item
//! list, so calling them twice with the same arguments yields the same view.
//!
//! ## Filter Semantics
//!
//! An item is kept iff:
//! - the search term is empty, or at least one searchable field contains it
//!   as a case-insensitive substring (no trimming, no tokenizing), **and**
//! - for every active category filter, the item's value for that dimension
//!   equals the selected value exactly. A dimension set to [`ALL`] is not a
//!   constraint.
//!
//! ## Page Reset
//!
//! [`FilterState`] owns the rule that edits to the search term or a category
//! filter send the view back to page 1, while moving between pages leaves the
//! filters alone. The fields are private so the rule cannot be bypassed.
//!
//! ## Page Clamping
//!
//! [`paginate`] does not clamp: a page past the end yields an empty slice.
//! Callers that accept a page from outside (a URL, a CLI flag) call
//! [`FilterState::clamp_to`] once they know the page count.

use crate::types::ContentItem;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use url::form_urlencoded;

/// Sentinel filter value meaning "no constraint on this dimension".
pub const ALL: &str = "All";

/// Page size used by the podcast and article listings.
pub const DEFAULT_PAGE_SIZE: usize = 30;

/// Query parameter carrying the current page.
pub const PAGE_PARAM: &str = "page";

/// Query parameter carrying the search term.
pub const SEARCH_PARAM: &str = "q";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ListingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

// ============================================================================
// Filter state
// ============================================================================

/// User-controlled search, category, and pagination state for one listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    search_term: String,
    category_filters: BTreeMap<String, String>,
    page: usize,
    page_size: usize,
}

impl FilterState {
    /// Fresh state: no search, no category constraints, page 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            search_term: String::new(),
            category_filters: BTreeMap::new(),
            page: 1,
            page_size,
        }
    }

    /// State for a listing that shows everything on a single page.
    pub fn full_list() -> Self {
        Self::new(usize::MAX)
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Selected value for a dimension, [`ALL`] when unconstrained.
    pub fn category(&self, dimension: &str) -> &str {
        self.category_filters
            .get(dimension)
            .map(String::as_str)
            .unwrap_or(ALL)
    }

    /// Active (non-[`ALL`]) category constraints.
    pub fn active_categories(&self) -> impl Iterator<Item = (&str, &str)> {
        self.category_filters
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// True when any search or category constraint is active.
    pub fn has_active_filters(&self) -> bool {
        !self.search_term.is_empty() || !self.category_filters.is_empty()
    }

    /// Replace the search term. Resets to page 1 when the term changes.
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        if term != self.search_term {
            self.search_term = term;
            self.page = 1;
        }
    }

    /// Select a value for a dimension; [`ALL`] removes the constraint.
    /// Resets to page 1 when the effective selection changes.
    pub fn set_category(&mut self, dimension: impl Into<String>, value: impl Into<String>) {
        let dimension = dimension.into();
        let value = value.into();
        if self.category(&dimension) == value {
            return;
        }
        if value == ALL {
            self.category_filters.remove(&dimension);
        } else {
            self.category_filters.insert(dimension, value);
        }
        self.page = 1;
    }

    /// Drop the search term and every category constraint.
    pub fn clear_filters(&mut self) {
        if self.has_active_filters() {
            self.search_term.clear();
            self.category_filters.clear();
            self.page = 1;
        }
    }

    /// Move to another page. Search and category state are untouched.
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    /// Pull the current page into `1..=page_count`.
    pub fn clamp_to(&mut self, page_count: usize) {
        self.page = self.page.clamp(1, page_count.max(1));
    }

    /// Build state from a URL query string (`page=2&q=risk&speaker=Jane`).
    ///
    /// The URL is authoritative on load, so the page it names is kept even
    /// when search or category parameters are also present. A missing or
    /// unparseable page falls back to 1. Every other key is read as a
    /// category dimension.
    pub fn from_query(query: &str, page_size: usize) -> Self {
        let mut state = Self::new(page_size);
        let mut page = 1;
        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            match key.as_ref() {
                PAGE_PARAM => {
                    page = value.parse::<usize>().ok().filter(|p| *p > 0).unwrap_or(1);
                }
                SEARCH_PARAM => state.search_term = value.into_owned(),
                _ if value == ALL || value.is_empty() => {}
                _ => {
                    state
                        .category_filters
                        .insert(key.into_owned(), value.into_owned());
                }
            }
        }
        state.page = page;
        state
    }

    /// Serialize state back into a query string; the page is always written.
    pub fn to_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair(PAGE_PARAM, &self.page.to_string());
        if !self.search_term.is_empty() {
            serializer.append_pair(SEARCH_PARAM, &self.search_term);
        }
        for (dimension, value) in &self.category_filters {
            serializer.append_pair(dimension, value);
        }
        serializer.finish()
    }
}

// ============================================================================
// Filtering and pagination
// ============================================================================

/// Keep the items matching the search term and every active category filter.
///
/// Relative order of `items` is preserved.
pub fn apply_filters<'a>(items: &'a [ContentItem], filter: &FilterState) -> Vec<&'a ContentItem> {
    let needle = filter.search_term.to_lowercase();
    items
        .iter()
        .filter(|item| matches_search(item, &needle))
        .filter(|item| matches_categories(item, filter))
        .collect()
}

fn matches_search(item: &ContentItem, needle: &str) -> bool {
    needle.is_empty()
        || item
            .searchable_fields
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
}

fn matches_categories(item: &ContentItem, filter: &FilterState) -> bool {
    filter
        .active_categories()
        .all(|(dimension, value)| item.category(dimension) == Some(value))
}

/// One page of a filtered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginated<'a, T> {
    pub visible_items: &'a [T],
    pub page: usize,
    pub page_count: usize,
    pub total_count: usize,
}

/// Slice out page `page` (1-based) of `filtered`.
///
/// `page_count` is never below 1, so an empty list still has one (empty)
/// page. A page beyond `page_count` yields an empty slice rather than being
/// clamped; see the module docs.
pub fn paginate<T>(
    filtered: &[T],
    page: usize,
    page_size: usize,
) -> Result<Paginated<'_, T>, ListingError> {
    if page == 0 {
        return Err(ListingError::InvalidInput("page numbers start at 1".into()));
    }
    if page_size == 0 {
        return Err(ListingError::InvalidInput(
            "page size must be positive".into(),
        ));
    }
    let total_count = filtered.len();
    let page_count = page_count(total_count, page_size);
    let start = (page - 1).saturating_mul(page_size).min(total_count);
    let end = start.saturating_add(page_size).min(total_count);
    Ok(Paginated {
        visible_items: &filtered[start..end],
        page,
        page_count,
        total_count,
    })
}

/// `max(1, ceil(total / page_size))`. `page_size` must be non-zero.
pub fn page_count(total: usize, page_size: usize) -> usize {
    total.div_ceil(page_size).max(1)
}

/// Options for a dimension's dropdown: [`ALL`] followed by the sorted,
/// de-duplicated values present in `items`.
pub fn distinct_values(items: &[ContentItem], dimension: &str) -> Vec<String> {
    let values: BTreeSet<&str> = items.iter().filter_map(|i| i.category(dimension)).collect();
    std::iter::once(ALL)
        .chain(values)
        .map(str::to_string)
        .collect()
}

/// Up to `limit` other items sharing a category value with `item`, in
/// collection order. Items with more shared values come first.
pub fn related_items<'a>(
    items: &'a [ContentItem],
    item: &ContentItem,
    limit: usize,
) -> Vec<&'a ContentItem> {
    let mut scored: Vec<(usize, &ContentItem)> = items
        .iter()
        .filter(|other| other.id != item.id)
        .filter_map(|other| {
            let shared = item
                .category_fields
                .iter()
                .filter(|(dimension, value)| other.category(dimension) == Some(value.as_str()))
                .count();
            (shared > 0).then_some((shared, other))
        })
        .collect();
    // Stable: ties keep collection order
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().take(limit).map(|(_, other)| other).collect()
}

// ============================================================================
// Pagination controls
// ============================================================================

/// One control in the numbered pagination bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page(usize),
    Ellipsis,
}

/// Numbered buttons around `current`: up to two pages either side, plus the
/// first and last page separated by an ellipsis when they are out of reach.
///
/// ```text
/// current=1,  count=10 → 1 2 3 … 10
/// current=6,  count=10 → 1 … 4 5 6 7 8 … 10
/// current=10, count=10 → 1 … 8 9 10
/// ```
pub fn page_window(current: usize, page_count: usize) -> Vec<PageLink> {
    let mut links = Vec::new();
    if current > 3 {
        links.push(PageLink::Page(1));
        if current > 4 {
            links.push(PageLink::Ellipsis);
        }
    }
    let first = current.saturating_sub(2).max(1);
    let last = current.saturating_add(2).min(page_count);
    links.extend((first..=last).map(PageLink::Page));
    if current.saturating_add(2) < page_count {
        if current.saturating_add(3) < page_count {
            links.push(PageLink::Ellipsis);
        }
        links.push(PageLink::Page(page_count));
    }
    links
}

/// Target of the "Previous" button.
pub fn previous_page(current: usize) -> usize {
    current.saturating_sub(1).max(1)
}

/// Target of the "Next" button.
pub fn next_page(current: usize, page_count: usize) -> usize {
    (current + 1).min(page_count.max(1))
}

// ============================================================================
// Controller
// ============================================================================

/// Items plus the filter state applied to them.
#[derive(Debug, Clone)]
pub struct ListingController {
    items: Vec<ContentItem>,
    filter: FilterState,
}

/// The currently visible page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingView<'a> {
    pub visible_items: Vec<&'a ContentItem>,
    pub page: usize,
    pub page_count: usize,
    /// Items surviving the filters.
    pub filtered_count: usize,
    /// Items before filtering.
    pub total_count: usize,
}

impl ListingView<'_> {
    /// "Showing N of M" line shown above the grid.
    pub fn summary(&self, noun: &str) -> String {
        format!(
            "Showing {} of {} {}",
            self.filtered_count, self.total_count, noun
        )
    }
}

impl ListingController {
    pub fn new(items: Vec<ContentItem>, filter: FilterState) -> Self {
        Self { items, filter }
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Mutable filter access; edits go through [`FilterState`]'s setters so
    /// the page-reset rule still applies.
    pub fn filter_mut(&mut self) -> &mut FilterState {
        &mut self.filter
    }

    /// Replace the item list (a new fetch). The filter state is kept but the
    /// view returns to page 1.
    pub fn replace_items(&mut self, items: Vec<ContentItem>) {
        self.items = items;
        self.filter.page = 1;
    }

    /// Compute the visible page for the current items and filter state.
    pub fn view(&self) -> Result<ListingView<'_>, ListingError> {
        view_of(&self.items, &self.filter)
    }
}

/// Filter then paginate `items` under `filter`.
pub fn view_of<'a>(
    items: &'a [ContentItem],
    filter: &FilterState,
) -> Result<ListingView<'a>, ListingError> {
    let filtered = apply_filters(items, filter);
    let paged = paginate(&filtered, filter.page, filter.page_size)?;
    Ok(ListingView {
        visible_items: paged.visible_items.to_vec(),
        page: paged.page,
        page_count: paged.page_count,
        filtered_count: paged.total_count,
        total_count: items.len(),
    })
}

/// Require a JSON API response to be an array before adapting its elements.
pub fn require_array(value: &Value) -> Result<&[Value], ListingError> {
    value.as_array().map(Vec::as_slice).ok_or_else(|| {
        ListingError::InvalidInput(format!(
            "expected a JSON array of content items, got {}",
            json_kind(value)
        ))
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
