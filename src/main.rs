use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use vanguard_site::breadcrumb::BreadcrumbResolver;
use vanguard_site::content::ContentKind;
use vanguard_site::fetch::{self, ApiSource, ContentSource, Manifest, SnapshotSource};
use vanguard_site::listing::{FilterState, ListingController};
use vanguard_site::{config, generate, output, pages};

/// Where fetched content comes from.
#[derive(clap::Args, Clone)]
struct SourceArgs {
    /// Read `<kind>.json` snapshot files from this directory instead of the API
    #[arg(long)]
    from: Option<PathBuf>,
}

#[derive(clap::Args, Clone)]
struct ListArgs {
    /// Content kind: podcasts, videos, in-the-press, articles, newsroom, events, programs
    kind: String,

    /// Case-insensitive substring search
    #[arg(long)]
    search: Option<String>,

    /// Category filter as `dimension=value` (repeatable)
    #[arg(long = "filter", value_name = "DIM=VALUE")]
    filters: Vec<String>,

    /// Page to show (1-based)
    #[arg(long)]
    page: Option<usize>,

    /// Start from a listing URL query string (`page=2&q=risk&speaker=Jane`)
    #[arg(long)]
    query: Option<String>,
}

fn version_string() -> &'static str {
    if env!("VANGUARD_TAGGED") == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("VANGUARD_COMMIT");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "vanguard-site")]
#[command(about = "Static site builder for the Vanguard Network content listings")]
#[command(long_about = "\
Static site builder for the Vanguard Network content listings

Content is fetched once per kind from the content API (or a snapshot
directory), written to a JSON manifest, and rendered into static HTML:
paginated listings with search and category filters, detail pages, and
markdown pages, each with a breadcrumb trail.

Content structure:

  content/
  ├── config.toml                  # Site config (optional)
  └── pages/
      ├── 010-about.md             # Page (numbered = shown in nav)
      ├── privacy.md               # No number prefix = hidden from nav
      └── programs/
          └── gc-exchange.md       # Nested page → /programs/gc-exchange

Snapshot directory (for --from):

  snapshot/
  ├── podcasts.json                # Same shape as GET /api/podcasts
  ├── videos.json
  ├── in-the-press.json
  ├── articles.json
  ├── newsroom.json
  └── events.json

The API base URL can be overridden with VANGUARD_BACKEND_URL.
Run 'vanguard-site gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Directory for intermediate files (manifest)
    #[arg(long, default_value = ".vanguard-temp", global = true)]
    temp_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch all content into a manifest
    Fetch(SourceArgs),
    /// Produce the HTML site from the manifest and markdown pages
    Generate,
    /// Run the full pipeline: fetch → generate
    Build(SourceArgs),
    /// Print one filtered, paginated listing from the manifest
    List(ListArgs),
    /// Print the breadcrumb trail for a URL path
    Crumbs {
        /// URL path, e.g. /podcast/42
        path: String,
        /// Label for the last entry (e.g. the item title)
        #[arg(long)]
        title: Option<String>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();
    let manifest_path = cli.temp_dir.join("manifest.json");

    match cli.command {
        Command::Fetch(source_args) => {
            let manifest = run_fetch(&cli.source, &source_args)?;
            fetch::write_manifest(&manifest, &manifest_path)?;
            output::print_fetch_output(&manifest);
        }
        Command::Generate => {
            let manifest = fetch::read_manifest(&manifest_path)?;
            run_generate(&manifest, &cli.source, &cli.output)?;
        }
        Command::Build(source_args) => {
            println!("==> Stage 1: Fetching content");
            let manifest = run_fetch(&cli.source, &source_args)?;
            fetch::write_manifest(&manifest, &manifest_path)?;
            output::print_fetch_output(&manifest);

            println!("==> Stage 2: Generating HTML → {}", cli.output.display());
            run_generate(&manifest, &cli.source, &cli.output)?;

            println!("==> Build complete: {}", cli.output.display());
        }
        Command::List(args) => {
            let manifest = fetch::read_manifest(&manifest_path)?;
            run_list(&manifest, &args)?;
        }
        Command::Crumbs { path, title } => {
            let site_config = config::load_config(&cli.source)?;
            let resolver = BreadcrumbResolver::for_site(
                &site_config.breadcrumbs.labels,
                &site_config.breadcrumbs.detail_parents,
            );
            output::print_crumbs(&resolver.resolve(&path, title.as_deref()));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Logs go to stderr so stage output on stdout stays clean.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

fn run_fetch(
    source_dir: &Path,
    args: &SourceArgs,
) -> Result<Manifest, Box<dyn std::error::Error>> {
    let mut site_config = config::load_config(source_dir)?;
    config::apply_env_overrides(&mut site_config, |key| std::env::var(key).ok())?;

    let source: Box<dyn ContentSource> = match &args.from {
        Some(dir) => Box::new(SnapshotSource::new(dir)),
        None => Box::new(ApiSource::from_config(&site_config)),
    };
    Ok(fetch::fetch(source.as_ref(), &site_config)?)
}

fn run_generate(
    manifest: &Manifest,
    source_dir: &Path,
    output_dir: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    init_thread_pool(&manifest.config.processing);
    let pages = pages::scan_pages(&source_dir.join("pages"))?;
    let report = generate::generate_site(manifest, &pages, output_dir)?;
    output::print_generate_output(&report);
    Ok(())
}

fn run_list(manifest: &Manifest, args: &ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let kind = ContentKind::parse(&args.kind)
        .ok_or_else(|| format!("unknown content kind '{}'", args.kind))?;
    let collection = manifest
        .collection(kind)
        .ok_or_else(|| format!("manifest has no {} collection", kind.slug()))?;

    let page_size = if kind.is_paginated() {
        manifest.config.listing.page_size
    } else {
        usize::MAX
    };
    let filter = match &args.query {
        Some(query) => FilterState::from_query(query, page_size),
        None => FilterState::new(page_size),
    };

    let mut controller = ListingController::new(collection.items.clone(), filter);
    if let Some(term) = &args.search {
        controller.filter_mut().set_search_term(term.as_str());
    }
    for pair in &args.filters {
        let (dimension, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("filter '{pair}' is not in dimension=value form"))?;
        controller.filter_mut().set_category(dimension, value);
    }
    // Page is applied last: filter edits reset it
    if let Some(page) = args.page {
        if page == 0 {
            return Err("page numbers start at 1".into());
        }
        controller.filter_mut().set_page(page);
    }

    let page_count = controller.view()?.page_count;
    if controller.filter().page() > page_count {
        tracing::warn!(
            requested = controller.filter().page(),
            page_count,
            "page out of range; showing last page"
        );
        controller.filter_mut().clamp_to(page_count);
    }
    output::print_listing(kind, &controller.view()?, page_size);
    Ok(())
}
