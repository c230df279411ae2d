//! # Vanguard Site
//!
//! A static site builder for a leadership-development network's public site.
//! Content (podcasts, press coverage, articles, events, programs) is fetched
//! once per kind from a content API and rendered into browsable listings with
//! search, category filters, pagination, breadcrumbs, and deferred image
//! loading.
//!
//! # Architecture: Two-Stage Pipeline
//!
//! ```text
//! 1. Fetch     API or snapshot/  →  manifest.json    (raw JSON → ContentItems)
//! 2. Generate  manifest + pages/ →  dist/            (final HTML site)
//! ```
//!
//! The manifest is human-readable JSON, so a fetch can be inspected, checked
//! in as a snapshot, or regenerated offline without touching the network.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`fetch`] | Stage 1: pulls every content kind from a [`fetch::ContentSource`] into the manifest |
//! | [`generate`] | Stage 2: renders listings, detail pages, and markdown pages with Maud |
//! | [`content`] | Content kinds, their endpoints, and per-schema adapters into [`types::ContentItem`] |
//! | [`listing`] | Search and category filtering, pagination, page-window controls |
//! | [`breadcrumb`] | URL path → labelled, linked breadcrumb trail |
//! | [`lazy_image`] | Per-image load state machine for deferred loading |
//! | [`pages`] | `content/pages/` markdown discovery with `NNN-` ordering |
//! | [`config`] | `config.toml` loading, validation, merging, env overrides |
//! | [`types`] | Shared types serialized between stages (`ContentItem`, `Page`, `NavItem`) |
//! | [`output`] | CLI output formatting for each command |
//!
//! # Design Decisions
//!
//! ## One Item Shape
//!
//! Every endpoint has its own schema. The [`content`] adapters fold each one
//! into [`types::ContentItem`] (searchable fields plus category fields) at the
//! fetch boundary, so filtering and pagination are written once and know
//! nothing about podcasts or events.
//!
//! ## Filters Own the Page Reset
//!
//! [`listing::FilterState`] keeps its fields private. Changing the search term
//! or a category goes back to page 1; moving between pages leaves the filters
//! alone. Callers cannot forget the rule because they cannot bypass it.
//!
//! ## Maud Over Template Engines
//!
//! HTML is generated with [Maud](https://maud.lambda.xyz/), a compile-time HTML
//! macro system. Malformed markup is a build error and all interpolation is
//! auto-escaped, which matters here because every title and summary comes
//! from an external API.

pub mod breadcrumb;
pub mod config;
pub mod content;
pub mod fetch;
pub mod generate;
pub mod lazy_image;
pub mod listing;
pub mod output;
pub mod pages;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
