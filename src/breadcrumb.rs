//! Breadcrumb trail resolution from URL paths.
//!
//! A path like `/podcast/abc123` becomes:
//!
//! ```text
//! Home (/)  ›  Podcast (/podcasts)  ›  <episode title>
//! ```
//!
//! Two lookup tables drive the trail, and they are consulted independently:
//!
//! - **labels**: segment → display name (`in-the-press` → "In The Press").
//!   Unmapped segments show verbatim.
//! - **detail parents**: segment → link override. Detail routes use a
//!   singular segment (`/podcast/:id`) that has no page of its own, so the
//!   crumb links to the plural listing instead of the dead `/podcast`.
//!
//! Resolution never fails. An unknown segment degrades to its raw text with a
//! cumulative link.

use serde::Serialize;
use std::collections::BTreeMap;

/// Label of the synthetic leading crumb.
pub const HOME_LABEL: &str = "Home";

/// One entry in a breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Crumb {
    /// Literal path token (empty for the home entry).
    pub raw_segment: String,
    pub display_label: String,
    pub link_target: String,
    /// Last entry of the trail; rendered as plain text, not a link.
    pub is_terminal: bool,
}

/// Resolves URL paths against fixed label and detail-parent tables.
#[derive(Debug, Clone, Default)]
pub struct BreadcrumbResolver {
    labels: BTreeMap<String, String>,
    detail_parents: BTreeMap<String, String>,
}

impl BreadcrumbResolver {
    pub fn new(labels: BTreeMap<String, String>, detail_parents: BTreeMap<String, String>) -> Self {
        Self {
            labels,
            detail_parents,
        }
    }

    /// Resolver for the site's own routes, with configured entries layered on
    /// top of the built-in tables (configured entries win).
    pub fn for_site(
        extra_labels: &BTreeMap<String, String>,
        extra_detail_parents: &BTreeMap<String, String>,
    ) -> Self {
        let mut labels = owned_table(SITE_LABELS);
        labels.extend(extra_labels.iter().map(|(k, v)| (k.clone(), v.clone())));
        let mut detail_parents = owned_table(SITE_DETAIL_PARENTS);
        detail_parents.extend(
            extra_detail_parents
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        Self::new(labels, detail_parents)
    }

    pub fn label_for<'a>(&'a self, segment: &'a str) -> &'a str {
        self.labels.get(segment).map(String::as_str).unwrap_or(segment)
    }

    /// Build the trail for `path`, led by a home entry.
    ///
    /// Empty tokens are dropped, so leading, trailing, and doubled slashes
    /// all resolve the same way. A non-empty `custom_terminal_title` replaces
    /// the label of the last entry; links are unaffected.
    pub fn resolve(&self, path: &str, custom_terminal_title: Option<&str>) -> Vec<Crumb> {
        let tokens: Vec<&str> = path.split('/').filter(|t| !t.is_empty()).collect();
        let custom = custom_terminal_title.filter(|t| !t.is_empty());

        let mut trail = Vec::with_capacity(tokens.len() + 1);
        trail.push(Crumb {
            raw_segment: String::new(),
            display_label: HOME_LABEL.to_string(),
            link_target: "/".to_string(),
            is_terminal: tokens.is_empty(),
        });

        for (i, token) in tokens.iter().enumerate() {
            let is_terminal = i == tokens.len() - 1;
            let display_label = match custom {
                Some(title) if is_terminal => title.to_string(),
                _ => self.label_for(token).to_string(),
            };
            let link_target = self
                .detail_parents
                .get(*token)
                .cloned()
                .unwrap_or_else(|| format!("/{}", tokens[..=i].join("/")));
            trail.push(Crumb {
                raw_segment: token.to_string(),
                display_label,
                link_target,
                is_terminal,
            });
        }
        trail
    }
}

fn owned_table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Display names for the site's route segments.
pub const SITE_LABELS: &[(&str, &str)] = &[
    ("advisory", "Advisory"),
    ("programs", "Programs"),
    ("networking", "Networking"),
    ("case-studies", "Case Studies"),
    ("success-stories", "Success Stories"),
    ("contact", "Contact"),
    ("team", "Team"),
    ("upcoming-events", "Events"),
    ("events", "Events"),
    ("content", "Content"),
    ("articles", "Articles"),
    ("article", "Article"),
    ("podcasts", "Podcasts"),
    ("podcast", "Podcast"),
    ("videos", "Videos"),
    ("video", "Video"),
    ("newsroom", "Newsroom"),
    ("newsroom-item", "Newsroom"),
    ("in-the-press", "In The Press"),
    ("press-item", "In The Press"),
    ("event", "Event"),
    ("program", "Program"),
];

/// Singular detail segments and the listing each one links back to.
pub const SITE_DETAIL_PARENTS: &[(&str, &str)] = &[
    ("article", "/articles"),
    ("podcast", "/podcasts"),
    ("video", "/videos"),
    ("newsroom-item", "/newsroom"),
    ("press-item", "/in-the-press"),
    ("event", "/events"),
    ("program", "/programs"),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        owned_table(entries)
    }

    fn empty() -> BreadcrumbResolver {
        BreadcrumbResolver::default()
    }

    #[test]
    fn empty_path_is_just_home() {
        let trail = empty().resolve("", None);
        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].link_target, "/");
        assert_eq!(trail[0].display_label, HOME_LABEL);
        assert!(trail[0].is_terminal);
    }

    #[test]
    fn slash_only_path_is_just_home() {
        assert_eq!(empty().resolve("/", None).len(), 1);
        assert_eq!(empty().resolve("///", None).len(), 1);
    }

    #[test]
    fn home_is_not_terminal_when_path_has_segments() {
        let trail = empty().resolve("/team", None);
        assert!(!trail[0].is_terminal);
        assert!(trail[1].is_terminal);
    }

    #[test]
    fn unmapped_segment_passes_through() {
        let trail = empty().resolve("/foobar", None);
        assert_eq!(trail.len(), 2);
        assert_eq!(
            trail[1],
            Crumb {
                raw_segment: "foobar".into(),
                display_label: "foobar".into(),
                link_target: "/foobar".into(),
                is_terminal: true,
            }
        );
    }

    #[test]
    fn unmapped_label_keeps_original_case() {
        let trail = empty().resolve("/GC-Exchange", None);
        assert_eq!(trail[1].display_label, "GC-Exchange");
    }

    #[test]
    fn detail_segment_links_to_parent_listing() {
        let resolver = BreadcrumbResolver::new(
            table(&[("article", "Articles")]),
            table(&[("article", "/articles")]),
        );
        let trail = resolver.resolve("/article/42", None);
        assert_eq!(trail.len(), 3);
        assert_eq!(trail[1].display_label, "Articles");
        assert_eq!(trail[1].link_target, "/articles");
        assert!(!trail[1].is_terminal);
        assert_eq!(trail[2].display_label, "42");
        assert_eq!(trail[2].link_target, "/article/42");
        assert!(trail[2].is_terminal);
    }

    #[test]
    fn terminal_detail_segment_keeps_override_link() {
        let resolver = BreadcrumbResolver::new(
            table(&[("article", "Articles")]),
            table(&[("article", "/articles")]),
        );
        let trail = resolver.resolve("/article", None);
        assert_eq!(trail.len(), 2);
        assert_eq!(
            trail[1],
            Crumb {
                raw_segment: "article".into(),
                display_label: "Articles".into(),
                link_target: "/articles".into(),
                is_terminal: true,
            }
        );

        let titled = resolver.resolve("/article", Some("My Big Article"));
        assert_eq!(titled[1].display_label, "My Big Article");
        assert_eq!(titled[1].link_target, "/articles");
    }

    #[test]
    fn detail_parent_never_changes_label() {
        let resolver = BreadcrumbResolver::new(BTreeMap::new(), table(&[("podcast", "/podcasts")]));
        let trail = resolver.resolve("/podcast/7", None);
        assert_eq!(trail[1].display_label, "podcast");
        assert_eq!(trail[1].link_target, "/podcasts");
    }

    #[test]
    fn custom_title_only_replaces_terminal_label() {
        let resolver = BreadcrumbResolver::new(table(&[("newsroom", "Newsroom")]), BTreeMap::new());
        let trail = resolver.resolve("/newsroom/abc", Some("Quarterly Update"));
        assert_eq!(trail[1].display_label, "Newsroom");
        assert_eq!(trail[2].display_label, "Quarterly Update");
        assert_eq!(trail[2].link_target, "/newsroom/abc");
    }

    #[test]
    fn empty_custom_title_is_ignored() {
        let trail = empty().resolve("/team", Some(""));
        assert_eq!(trail[1].display_label, "team");
    }

    #[test]
    fn cumulative_links_ignore_doubled_slashes() {
        let trail = empty().resolve("//programs//gc-exchange/", None);
        let links: Vec<&str> = trail.iter().map(|c| c.link_target.as_str()).collect();
        assert_eq!(links, ["/", "/programs", "/programs/gc-exchange"]);
    }

    #[test]
    fn site_tables_cover_detail_routes() {
        let resolver = BreadcrumbResolver::for_site(&BTreeMap::new(), &BTreeMap::new());
        let trail = resolver.resolve("/press-item/xyz", Some("Featured in Forbes"));
        assert_eq!(trail[1].display_label, "In The Press");
        assert_eq!(trail[1].link_target, "/in-the-press");
        assert_eq!(trail[2].display_label, "Featured in Forbes");
    }

    #[test]
    fn configured_entries_override_site_tables() {
        let resolver = BreadcrumbResolver::for_site(
            &table(&[("team", "Our People"), ("book", "The Book")]),
            &table(&[("podcast", "/listen")]),
        );
        let trail = resolver.resolve("/team", None);
        assert_eq!(trail[1].display_label, "Our People");
        assert_eq!(resolver.label_for("book"), "The Book");
        assert_eq!(resolver.resolve("/podcast/1", None)[1].link_target, "/listen");
    }
}
