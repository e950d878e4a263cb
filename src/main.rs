use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use gallery_sync::catalog::{self, Catalog};
use gallery_sync::config::{self, GalleryConfig};
use gallery_sync::filter::{DateRange, RangeFilter, TagLogic};
use gallery_sync::naming;
use gallery_sync::output;
use gallery_sync::resolve::{ImageResolver, UrlTemplateResolver};
use gallery_sync::session::{PageScope, PageSession, SessionOptions};
use std::error::Error;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Parser)]
#[command(name = "gallery-sync")]
#[command(about = "Filter a photo catalog and render the synced grid and viewer")]
#[command(long_about = "\
Filter a photo catalog and render the synced grid and viewer

The catalog is a JSON file, or a directory of per-album JSON files:

  catalog/
  ├── street.json       # { \"album\": {...}, \"photos\": [...] }
  └── night.json

An album page (--album) shows a simple tag filter and starts with the whole
album. Without --album you get the all-photos explorer, which also filters
by album, camera, date and exposure, and starts empty until a filter is set.

Range flags take MIN..MAX, MIN.. or ..MAX; shutter speeds may be written
as fractions (--shutter 1/500..1/60).

Set RUST_LOG=debug to trace filter changes and sync passes.

Run 'gallery-sync gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Catalog JSON file or directory
    #[arg(long, default_value = "catalog.json", global = true)]
    catalog: PathBuf,

    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply filters and print the resulting list, pills and viewer state
    Filter(PageArgs),
    /// Validate the catalog and print its albums, tags and cameras
    Check,
    /// Write a standalone HTML page with controls, grid and viewer
    Render {
        #[command(flatten)]
        page: PageArgs,
        /// Output HTML file
        #[arg(long, default_value = "gallery.html")]
        out: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogicArg {
    And,
    Or,
}

/// Flags shared by commands that build a page view.
#[derive(clap::Args, Clone)]
struct PageArgs {
    /// Album page to show; omit for the all-photos explorer
    #[arg(long)]
    album: Option<String>,

    /// Activate a tag (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// How active tags combine
    #[arg(long, value_enum, default_value_t = LogicArg::And)]
    logic: LogicArg,

    /// Container width in pixels, for the column layout
    #[arg(long, default_value_t = 1200)]
    width: u32,

    /// Open the viewer on this photo id
    #[arg(long)]
    open: Option<String>,

    /// Restrict to an album (all-photos page, repeatable)
    #[arg(long = "in-album")]
    in_albums: Vec<String>,

    /// Restrict to a camera (all-photos page, repeatable)
    #[arg(long = "camera")]
    cameras: Vec<String>,

    /// Earliest capture date, YYYY-MM-DD
    #[arg(long, value_parser = parse_day)]
    from: Option<NaiveDate>,

    /// Latest capture date, YYYY-MM-DD
    #[arg(long, value_parser = parse_day)]
    to: Option<NaiveDate>,

    /// Aperture range, e.g. 1.4..2.8
    #[arg(long)]
    aperture: Option<RangeFilter>,

    /// Shutter range in seconds, e.g. 1/500..1/60
    #[arg(long)]
    shutter: Option<RangeFilter>,

    /// ISO range, e.g. 100..800
    #[arg(long)]
    iso: Option<RangeFilter>,

    /// Focal length range in mm, e.g. 24..50
    #[arg(long)]
    focal: Option<RangeFilter>,
}

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("invalid date '{s}': {e}"))
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Filter(page) => {
            let config = config::load_config(&cli.config)?;
            let catalog = catalog::load_catalog(&cli.catalog)?;
            let session = open_page(&catalog, config, &page)?;
            output::print_filter_output(&session, page.width);
        }
        Command::Check => {
            let catalog = catalog::load_catalog(&cli.catalog)?;
            output::print_check_output(&catalog);
        }
        Command::Render { page, out } => {
            let config = config::load_config(&cli.config)?;
            let catalog = catalog::load_catalog(&cli.catalog)?;
            let session = open_page(&catalog, config, &page)?;
            let title = match &page.album {
                Some(id) => catalog.album_title(id).unwrap_or(id.as_str()).to_string(),
                None => "All photos".to_string(),
            };
            let html = session.render_document(&title, page.width).into_string();
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&out, html)?;
            println!(
                "{} ({} of {} photos) → {}",
                title,
                session.grid().len(),
                session.catalog().len(),
                out.display()
            );
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Build a page session and replay the requested filter changes on it.
fn open_page(
    catalog: &Catalog,
    config: GalleryConfig,
    page: &PageArgs,
) -> Result<PageSession, Box<dyn Error>> {
    let scope = match &page.album {
        Some(id) if catalog.album_title(id).is_none() => {
            return Err(format!("unknown album '{id}'").into());
        }
        Some(id) => PageScope::Album(id.clone()),
        None => PageScope::AllPhotos,
    };

    let resolver: Rc<dyn ImageResolver> =
        Rc::new(UrlTemplateResolver::new(config.images.url_template.clone()));
    let mut tags = naming::normalize_tags(&page.tags).into_iter();
    let options = SessionOptions {
        seed_tag: tags.next(),
        ..SessionOptions::default()
    };
    let session = PageSession::new(catalog, scope, config, resolver, options);

    {
        let mut controls = session.controls_mut();
        for tag in tags {
            controls.toggle_tag(&tag);
        }
        if page.logic == LogicArg::Or {
            controls.set_tag_logic(TagLogic::Any);
        }
        for album in &page.in_albums {
            controls.toggle_album(album);
        }
        for camera in &page.cameras {
            controls.toggle_camera(camera);
        }
        if page.from.is_some() || page.to.is_some() {
            controls.set_date_range(Some(DateRange {
                from: page
                    .from
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
                    .map(|t| t.and_utc()),
                to: page
                    .to
                    .and_then(|d| d.and_hms_opt(23, 59, 59))
                    .map(|t| t.and_utc()),
            }));
        }
        if page.aperture.is_some() {
            controls.set_aperture(page.aperture);
        }
        if page.shutter.is_some() {
            controls.set_shutter_speed(page.shutter);
        }
        if page.iso.is_some() {
            controls.set_iso(page.iso);
        }
        if page.focal.is_some() {
            controls.set_focal_length(page.focal);
        }
    }

    if let Some(id) = &page.open
        && !session.open_photo(id)
    {
        log::warn!("could not open viewer on '{id}': no photos match");
    }
    Ok(session)
}
