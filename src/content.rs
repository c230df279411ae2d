//! Content kinds and their adapters into [`ContentItem`].
//!
//! Each API endpoint returns its own schema: podcasts carry a
//! `featured_speaker`, press articles an `article_title` and `author_names`,
//! and so on. The adapters here fold each schema into the uniform
//! searchable/category envelope once, at the fetch boundary, so listing code
//! stays schema-agnostic.
//!
//! | Kind | Endpoint | Searchable | Dimensions |
//! |------|----------|------------|------------|
//! | Podcasts | `/api/podcasts` | title, featured speaker | `speaker` |
//! | Videos | `/api/videos` | name, description, featured speakers | none |
//! | In The Press | `/api/in-the-press` | title, authors, description | none |
//! | Articles | `/api/articles` | title, teaser, speaker, type | `type` |
//! | Newsroom | `/api/newsroom` | title, teaser, news type | none |
//! | Events | `/api/events` | title, speaker, session leader | `speaker` |
//! | Programs | built-in | name, description, audience | `category`, `level` |
//!
//! Category fields are kept even for kinds with no dropdowns (a video's
//! speaker, a news item's type); detail pages use them to pick related items.
//!
//! Field values that are not JSON strings are treated as absent: they never
//! match a search or a category filter.

use crate::listing::{ListingError, require_array};
use crate::types::ContentItem;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Fallback registration link for events with no explicit URL.
pub const MEMBERS_EVENTS_URL: &str = "https://members.thevanguardnetwork.com/events";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind {
    Podcasts,
    Videos,
    Press,
    Articles,
    Newsroom,
    Events,
    Programs,
}

impl ContentKind {
    pub const ALL: [ContentKind; 7] = [
        ContentKind::Podcasts,
        ContentKind::Videos,
        ContentKind::Press,
        ContentKind::Articles,
        ContentKind::Newsroom,
        ContentKind::Events,
        ContentKind::Programs,
    ];

    /// Listing URL segment (`/podcasts`).
    pub fn slug(self) -> &'static str {
        match self {
            ContentKind::Podcasts => "podcasts",
            ContentKind::Videos => "videos",
            ContentKind::Press => "in-the-press",
            ContentKind::Articles => "articles",
            ContentKind::Newsroom => "newsroom",
            ContentKind::Events => "events",
            ContentKind::Programs => "programs",
        }
    }

    /// Singular segment for detail routes (`/podcast/:id`).
    pub fn detail_segment(self) -> &'static str {
        match self {
            ContentKind::Podcasts => "podcast",
            ContentKind::Videos => "video",
            ContentKind::Press => "press-item",
            ContentKind::Articles => "article",
            ContentKind::Newsroom => "newsroom-item",
            ContentKind::Events => "event",
            ContentKind::Programs => "program",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ContentKind::Podcasts => "Podcasts",
            ContentKind::Videos => "Videos",
            ContentKind::Press => "In The Press",
            ContentKind::Articles => "Articles",
            ContentKind::Newsroom => "Newsroom",
            ContentKind::Events => "Upcoming Events",
            ContentKind::Programs => "Programs",
        }
    }

    /// Lowercase plural used in "Showing N of M podcasts".
    pub fn noun(self) -> &'static str {
        match self {
            ContentKind::Podcasts => "podcasts",
            ContentKind::Videos => "videos",
            ContentKind::Press => "press articles",
            ContentKind::Articles => "articles",
            ContentKind::Newsroom => "news items",
            ContentKind::Events => "events",
            ContentKind::Programs => "programs",
        }
    }

    /// API path, or `None` for content that ships with the site.
    pub fn endpoint(self) -> Option<&'static str> {
        match self {
            ContentKind::Podcasts => Some("/api/podcasts"),
            ContentKind::Videos => Some("/api/videos"),
            ContentKind::Press => Some("/api/in-the-press"),
            ContentKind::Articles => Some("/api/articles"),
            ContentKind::Newsroom => Some("/api/newsroom"),
            ContentKind::Events => Some("/api/events"),
            ContentKind::Programs => None,
        }
    }

    /// Filter dimensions offered on this kind's listing.
    pub fn dimensions(self) -> &'static [&'static str] {
        match self {
            ContentKind::Podcasts => &["speaker"],
            ContentKind::Videos => &[],
            ContentKind::Press => &[],
            ContentKind::Articles => &["type"],
            ContentKind::Newsroom => &[],
            ContentKind::Events => &["speaker"],
            ContentKind::Programs => &["category", "level"],
        }
    }

    /// Whether the listing is split into pages; others show the full list.
    pub fn is_paginated(self) -> bool {
        matches!(
            self,
            ContentKind::Podcasts | ContentKind::Videos | ContentKind::Articles
        )
    }

    /// Parse a CLI argument: accepts the slug or the serde name.
    pub fn parse(name: &str) -> Option<ContentKind> {
        Self::ALL
            .into_iter()
            .find(|k| k.slug() == name || k.serde_name() == name)
    }

    fn serde_name(self) -> &'static str {
        match self {
            ContentKind::Press => "press",
            other => other.slug(),
        }
    }

    /// Adapt a raw API response for this kind.
    ///
    /// The response must be a JSON array; anything else is a programmer or
    /// contract error and fails fast. Elements that are not objects or lack
    /// an id are skipped with a warning.
    pub fn adapt(self, response: &Value) -> Result<Vec<ContentItem>, ListingError> {
        let elements = require_array(response)?;
        let items: Vec<ContentItem> = elements
            .iter()
            .enumerate()
            .filter_map(|(index, element)| {
                let Some(obj) = element.as_object() else {
                    tracing::warn!(kind = self.slug(), index, "skipping non-object element");
                    return None;
                };
                let item = match self {
                    ContentKind::Podcasts => adapt_podcast(obj),
                    ContentKind::Videos => adapt_video(obj),
                    ContentKind::Press => adapt_press(obj),
                    ContentKind::Articles => adapt_article(obj),
                    ContentKind::Newsroom => adapt_news(obj),
                    ContentKind::Events => adapt_event(obj),
                    ContentKind::Programs => adapt_program(obj),
                };
                if item.is_none() {
                    tracing::warn!(kind = self.slug(), index, "skipping element without an id");
                }
                item
            })
            .collect();
        tracing::debug!(kind = self.slug(), count = items.len(), "adapted content items");
        Ok(items)
    }
}

// ============================================================================
// Field access
// ============================================================================

/// String value of a field; non-strings and blank strings count as absent.
fn text<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    match obj.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.as_str()),
        Some(Value::String(_)) | Some(Value::Null) | None => None,
        Some(other) => {
            tracing::debug!(field = key, value = %other, "ignoring non-string field");
            None
        }
    }
}

/// Identifier: string ids pass through, numeric ids are stringified.
fn id_of(obj: &Map<String, Value>) -> Option<String> {
    match obj.get("id") {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn searchable(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .filter_map(|k| text(obj, k))
        .map(str::to_string)
        .collect()
}

fn categories(obj: &Map<String, Value>, pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .filter_map(|(dimension, key)| text(obj, key).map(|v| (dimension.to_string(), v.to_string())))
        .collect()
}

fn owned(value: Option<&str>) -> Option<String> {
    value.map(str::to_string)
}

// ============================================================================
// Adapters
// ============================================================================

fn adapt_podcast(obj: &Map<String, Value>) -> Option<ContentItem> {
    Some(ContentItem {
        id: id_of(obj)?,
        searchable_fields: searchable(obj, &["title", "featured_speaker"]),
        category_fields: categories(obj, &[("speaker", "featured_speaker")]),
        title: text(obj, "title").unwrap_or_default().to_string(),
        summary: owned(text(obj, "description")),
        image: owned(text(obj, "thumbnail")),
        link: owned(text(obj, "url").or_else(|| text(obj, "podcast_url"))),
        date: owned(text(obj, "published_date").or_else(|| text(obj, "date"))),
    })
}

fn adapt_video(obj: &Map<String, Value>) -> Option<ContentItem> {
    let title = text(obj, "vimeo_name").or_else(|| text(obj, "video_description"));
    Some(ContentItem {
        id: id_of(obj)?,
        searchable_fields: searchable(obj, &["vimeo_name", "video_description", "featured_speakers"]),
        category_fields: categories(obj, &[("speaker", "featured_speakers")]),
        title: title.unwrap_or_default().to_string(),
        summary: owned(text(obj, "video_description")),
        image: owned(text(obj, "headshot")),
        link: owned(text(obj, "vanguard_vimeo_link")),
        date: None,
    })
}

fn adapt_press(obj: &Map<String, Value>) -> Option<ContentItem> {
    Some(ContentItem {
        id: id_of(obj)?,
        searchable_fields: searchable(obj, &["article_title", "author_names", "short_description"]),
        category_fields: BTreeMap::new(),
        title: text(obj, "article_title").unwrap_or_default().to_string(),
        summary: owned(text(obj, "short_description")),
        image: owned(text(obj, "photo")),
        link: owned(text(obj, "article_url").or_else(|| text(obj, "url"))),
        date: owned(text(obj, "publication_date").or_else(|| text(obj, "date"))),
    })
}

fn adapt_article(obj: &Map<String, Value>) -> Option<ContentItem> {
    Some(ContentItem {
        id: id_of(obj)?,
        searchable_fields: searchable(
            obj,
            &[
                "blog_title",
                "description_teaser",
                "featured_speaker_linkedin",
                "type_content",
            ],
        ),
        category_fields: categories(obj, &[("type", "type_content")]),
        title: text(obj, "blog_title").unwrap_or_default().to_string(),
        summary: owned(text(obj, "description_teaser")),
        image: owned(text(obj, "featured_image").or_else(|| text(obj, "image"))),
        link: None,
        date: owned(text(obj, "publish_date").or_else(|| text(obj, "date"))),
    })
}

fn adapt_news(obj: &Map<String, Value>) -> Option<ContentItem> {
    Some(ContentItem {
        id: id_of(obj)?,
        searchable_fields: searchable(
            obj,
            &["blog_title", "title", "description_teaser", "description", "type_of_news"],
        ),
        category_fields: categories(obj, &[("type", "type_of_news")]),
        title: text(obj, "blog_title")
            .or_else(|| text(obj, "title"))
            .unwrap_or_default()
            .to_string(),
        summary: owned(text(obj, "description_teaser").or_else(|| text(obj, "description"))),
        image: owned(
            text(obj, "photo")
                .or_else(|| text(obj, "image"))
                .or_else(|| text(obj, "newsroom_detail_image")),
        ),
        link: owned(text(obj, "link")),
        date: owned(text(obj, "publish_by").or_else(|| text(obj, "date"))),
    })
}

fn adapt_event(obj: &Map<String, Value>) -> Option<ContentItem> {
    Some(ContentItem {
        id: id_of(obj)?,
        searchable_fields: searchable(obj, &["event_title", "speaker", "session_leader_name"]),
        category_fields: categories(obj, &[("speaker", "speaker")]),
        title: text(obj, "event_title").unwrap_or_default().to_string(),
        summary: owned(text(obj, "date_time")),
        image: owned(text(obj, "listing_picture")),
        link: Some(registration_url(obj)),
        date: owned(text(obj, "start_date")),
    })
}

/// The backend-computed registration URL, then the more-details URL, then the
/// non-member signup URL, then the members page.
fn registration_url(obj: &Map<String, Value>) -> String {
    text(obj, "registration_url")
        .or_else(|| text(obj, "more_details_url"))
        .or_else(|| text(obj, "default_signup_url"))
        .unwrap_or(MEMBERS_EVENTS_URL)
        .to_string()
}

fn adapt_program(obj: &Map<String, Value>) -> Option<ContentItem> {
    Some(ContentItem {
        id: id_of(obj)?,
        searchable_fields: searchable(obj, &["name", "description", "audience"]),
        category_fields: categories(obj, &[("category", "category"), ("level", "level")]),
        title: text(obj, "name").unwrap_or_default().to_string(),
        summary: owned(text(obj, "description")),
        image: owned(text(obj, "image")),
        link: owned(text(obj, "url")),
        date: None,
    })
}

// ============================================================================
// Built-in programs catalogue
// ============================================================================

/// Category options shown on the programs listing.
pub const PROGRAM_CATEGORIES: &[&str] = &["All", "Legal", "Life Sciences", "General"];

/// Level options shown on the programs listing.
pub const PROGRAM_LEVELS: &[&str] = &["All", "Executive", "Senior", "Emerging", "Entry"];

/// The current programs, in the shape the program adapter expects.
pub fn program_catalogue() -> Value {
    serde_json::json!([
        {
            "id": "gc-exchange",
            "name": "GC EXCHANGE",
            "description": "A highly pragmatic leadership problem-solving group that meets monthly, moderated by Vanguard. Monthly, in virtual format; face-to-face sessions occur at our bi-annual Forums.",
            "audience": "General Counsel",
            "category": "Legal",
            "level": "Executive",
            "image": "/gc-exchange-program.jpg",
            "url": "/gc-exchange"
        },
        {
            "id": "senior-counsel-exchange",
            "name": "SENIOR IN-HOUSE COUNSEL EXCHANGE",
            "description": "An exchange for GCs' immediate reports to compare notes and solve problems together. Monthly, in virtual format.",
            "audience": "Senior In-House Counsel",
            "category": "Legal",
            "level": "Senior",
            "image": "/senior-counsel-exchange-program.jpg",
            "url": "/senior-counsel-exchange"
        },
        {
            "id": "life-sciences-ceo",
            "name": "LIFE SCIENCES CEO EXCHANGES",
            "description": "For Life Sciences CEOs, focusing on leadership aspects rather than day-to-day tasks. Discussions include AI in development and commercialization.",
            "audience": "Life Sciences CEOs",
            "category": "Life Sciences",
            "level": "Executive",
            "image": "/life-sciences-ceo-program.jpg",
            "url": "/life-sciences-ceo"
        },
        {
            "id": "next-gen-gc",
            "name": "NEXT GENERATION GC",
            "description": "A six-month program to accelerate the trajectory of potential GCs, uniquely developed and led by Vanguard General Counsel Members.",
            "audience": "Future General Counsel",
            "category": "Legal",
            "level": "Emerging",
            "image": "/next-generation-gc-program.jpg",
            "url": "/next-gen-gc"
        },
        {
            "id": "new-leaders",
            "name": "NEW LEADERS PROGRAM",
            "description": "A six to twelve month program to jump-start leadership capabilities among graduate students and newer hires.",
            "audience": "Graduate Students & New Hires",
            "category": "General",
            "level": "Entry",
            "image": "/new-leaders-program.jpg",
            "url": "/new-leaders"
        }
    ])
}
