//! End-to-end pipeline test: snapshot directory → fetch → manifest → generate.
//!
//! Runs both stages through the library API against a temp directory and
//! checks the routes, breadcrumbs, pagination, and lazy images in the output.
//!
//! Run with: cargo test --test pipeline

use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use vanguard_site::config::{SiteConfig, load_config};
use vanguard_site::content::ContentKind;
use vanguard_site::fetch::{SnapshotSource, fetch, read_manifest, write_manifest};
use vanguard_site::generate::generate;

fn write_json(dir: &Path, name: &str, value: &Value) {
    fs::write(dir.join(name), serde_json::to_string(value).unwrap()).unwrap();
}

fn write_snapshot(dir: &Path) {
    let podcasts: Vec<Value> = (1..=32)
        .map(|i| {
            json!({
                "id": format!("p{i}"),
                "title": format!("Episode {i}"),
                "featured_speaker": if i % 2 == 0 { "Dana Reyes" } else { "Sam Okafor" },
                "thumbnail": format!("/img/p{i}.jpg"),
            })
        })
        .collect();
    write_json(dir, "podcasts.json", &Value::Array(podcasts));
    write_json(
        dir,
        "in-the-press.json",
        &json!([
            {"id": "n1", "article_title": "Vanguard in the Journal", "author_names": "Lee Park", "article_url": "https://news.example.com/a"}
        ]),
    );
    write_json(
        dir,
        "newsroom.json",
        &json!([
            {"id": 7, "blog_title": "Next Gen GC launches in Washington", "type_of_news": "Announcement"}
        ]),
    );
    write_json(
        dir,
        "events.json",
        &json!([
            {"id": "e1", "event_title": "Spring Forum", "speaker": "Dana Reyes"}
        ]),
    );
    // articles.json and videos.json deliberately missing: empty collections
}

fn write_content(dir: &Path) {
    fs::create_dir_all(dir.join("pages")).unwrap();
    fs::write(
        dir.join("config.toml"),
        "site_name = \"Test Network\"\n\n[listing]\npage_size = 10\n",
    )
    .unwrap();
    fs::write(
        dir.join("pages/010-about.md"),
        "# About Us\n\nWe are a *network*.",
    )
    .unwrap();
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("{}: {e}", path.display()))
}

#[test]
fn snapshot_to_site() {
    let tmp = TempDir::new().unwrap();
    let snapshot = tmp.path().join("snapshot");
    let content = tmp.path().join("content");
    let dist = tmp.path().join("dist");
    fs::create_dir_all(&snapshot).unwrap();
    write_snapshot(&snapshot);
    write_content(&content);

    // Stage 1
    let config = load_config(&content).unwrap();
    assert_eq!(config.listing.page_size, 10);
    let manifest = fetch(&SnapshotSource::new(&snapshot), &config).unwrap();
    let manifest_path = tmp.path().join("temp/manifest.json");
    write_manifest(&manifest, &manifest_path).unwrap();

    let reread = read_manifest(&manifest_path).unwrap();
    assert_eq!(reread.collection(ContentKind::Podcasts).unwrap().items.len(), 32);
    assert!(reread.collection(ContentKind::Articles).unwrap().items.is_empty());
    assert_eq!(reread.collection(ContentKind::Programs).unwrap().items.len(), 5);

    // Stage 2
    let report = generate(&manifest_path, &content, &dist).unwrap();
    assert_eq!(report.static_pages, ["about"]);

    // 32 podcasts at 10 per page → 4 pages
    for rel in [
        "index.html",
        "podcasts/index.html",
        "podcasts/2/index.html",
        "podcasts/4/index.html",
        "podcast/p1/index.html",
        "press-item/n1/index.html",
        "in-the-press/index.html",
        "events/index.html",
        "event/e1/index.html",
        "programs/index.html",
        "program/gc-exchange/index.html",
        "articles/index.html",
        "videos/index.html",
        "newsroom/index.html",
        "newsroom-item/7/index.html",
        "podcasts/items.json",
        "about/index.html",
    ] {
        assert!(dist.join(rel).exists(), "missing {rel}");
    }
    assert!(!dist.join("podcasts/5/index.html").exists());

    let page_two = read(&dist.join("podcasts/2/index.html"));
    assert!(page_two.contains("<title>Podcasts - Page 2 | Test Network</title>"));
    assert!(page_two.contains("Showing 32 of 32 podcasts"));
    assert!(page_two.contains("Episode 11"));
    assert!(!page_two.contains("Episode 10<"));
    assert!(page_two.contains(r#"<a href="/podcasts">Podcasts</a>"#));
    assert!(page_two.contains(r#"<span aria-current="page">Page 2</span>"#));
    assert!(page_two.contains(r#"<option value="Dana Reyes">Dana Reyes</option>"#));
    // Leading cards load eagerly, the rest wait for the viewport
    assert!(page_two.contains(r#"src="/img/p11.jpg""#));
    assert!(page_two.contains(r#"data-src="/img/p20.jpg""#));

    let detail = read(&dist.join("podcast/p7/index.html"));
    assert!(detail.contains(r#"<a href="/podcasts">Podcast</a>"#));
    assert!(detail.contains(r#"<span aria-current="page">Episode 7</span>"#));
    // Same speaker as p7
    assert!(detail.contains("Similar podcasts"));
    assert!(detail.contains(r#"<a href="/podcast/p1/">Episode 1</a>"#));

    let data: Value = serde_json::from_str(&read(&dist.join("podcasts/items.json"))).unwrap();
    assert_eq!(data["page_size"], 10);
    assert_eq!(data["items"].as_array().unwrap().len(), 32);
    assert_eq!(data["items"][1]["categories"]["speaker"], "Dana Reyes");

    let news = read(&dist.join("newsroom-item/7/index.html"));
    assert!(news.contains(r#"<a href="/newsroom">Newsroom</a>"#));

    let event = read(&dist.join("event/e1/index.html"));
    assert!(event.contains("https://members.thevanguardnetwork.com/events"));

    let about = read(&dist.join("about/index.html"));
    assert!(about.contains("<em>network</em>"));
    assert!(about.contains("<title>About Us | Test Network</title>"));
}

#[test]
fn bad_snapshot_fails_fetch() {
    let tmp = TempDir::new().unwrap();
    write_json(tmp.path(), "podcasts.json", &json!({"detail": "Failed to fetch"}));
    let result = fetch(&SnapshotSource::new(tmp.path()), &SiteConfig::default());
    let err = result.unwrap_err().to_string();
    assert!(err.contains("podcasts.json"), "{err}");
    assert!(err.contains("expected a JSON array"), "{err}");
}
