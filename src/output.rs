//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every photo is shown by positional index and title first, with album,
//! exposure and capture date as indented context lines. The same pattern is
//! used by `filter` and `check` so a photo reads the same everywhere.
//!
//! # Output Format
//!
//! ## Filter
//!
//! ```text
//! Filters: night + street (or)
//! 3 of 5 photos, 3 rendered, 3 columns at 1200px
//! 001 street-only
//!     Album: Street
//!     Fujifilm X100V · 23mm · f/5.6 · 1/500s · ISO 400
//!     Captured: 2023-03-05
//! 002 street-night
//!     ...
//!
//! Tags
//!     [street] (2)
//!     [night] (2)
//!     landscape (0, unavailable)
//! Viewer: closed
//! ```
//!
//! ## Check
//!
//! ```text
//! Albums
//! 001 Street (2 photos)
//! 002 After Dark (1 photos)
//!
//! Tags
//!     landscape: 1
//!     night: 2
//!
//! Cameras
//!     Leica M6
//!
//! Catalog OK: 3 albums, 5 photos, 3 tags
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::catalog::Catalog;
use crate::controls::ControlsView;
use crate::filter::FilterState;
use crate::lightbox::{LightboxController, metadata_line};
use crate::session::PageSession;
use crate::types::LightboxPhoto;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// Filter output
// ============================================================================

/// One line describing the active predicates, e.g.
/// `Filters: night + street (and); album night; iso 100..800`.
pub fn format_filter_summary(state: &FilterState) -> String {
    if state.is_empty() {
        return "Filters: none".to_string();
    }
    let mut parts = Vec::new();
    if !state.active_tags.is_empty() {
        let tags: Vec<&str> = state.active_tags.iter().map(String::as_str).collect();
        parts.push(format!("{} ({})", tags.join(" + "), state.tag_logic.as_str()));
    }
    if !state.album_ids.is_empty() {
        let albums: Vec<&str> = state.album_ids.iter().map(String::as_str).collect();
        parts.push(format!("album {}", albums.join(", ")));
    }
    if !state.camera_names.is_empty() {
        let cameras: Vec<&str> = state.camera_names.iter().map(String::as_str).collect();
        parts.push(format!("camera {}", cameras.join(", ")));
    }
    if let Some(dates) = state.date_range.filter(|d| d.is_active()) {
        let day = |d: Option<chrono::DateTime<chrono::Utc>>| {
            d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
        };
        parts.push(format!("dates {}..{}", day(dates.from), day(dates.to)));
    }
    let ranges = [
        ("aperture", state.aperture),
        ("shutter", state.shutter_speed),
        ("iso", state.iso),
        ("focal", state.focal_length),
    ];
    for (name, range) in ranges {
        if let Some(range) = range.filter(|r| r.is_active()) {
            parts.push(format!("{} {}", name, range));
        }
    }
    format!("Filters: {}", parts.join("; "))
}

/// Photo listing with context lines.
///
/// ```text
/// 001 Dusk Crossing
///     Album: Street
///     Leica M6 · 35mm · f/2 · 1/60s · ISO 3200
///     Location: Shinjuku, Tokyo
///     Captured: 2023-03-01
///     Story: Shot on **Portra 800**, pushed one stop.
/// ```
pub fn format_photo_list(photos: &[LightboxPhoto]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, photo) in photos.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), photo.title));
        if let Some(album) = &photo.album_title {
            lines.push(format!("{}Album: {}", indent(1), album));
        }
        if let Some(meta) = metadata_line(photo) {
            lines.push(format!("{}{}", indent(1), meta));
        }
        if let Some(location) = &photo.location {
            lines.push(format!("{}Location: {}", indent(1), location));
        }
        lines.push(format!(
            "{}Captured: {}",
            indent(1),
            photo.captured_at.format("%Y-%m-%d")
        ));
        if let Some(body) = &photo.body {
            let first_line = body.lines().next().unwrap_or_default();
            lines.push(format!("{}Story: {}", indent(1), truncate(first_line, 60)));
        }
    }
    lines
}

/// Result header: `3 of 5 photos, 3 rendered, 3 columns at 1200px`.
pub fn format_result_header(
    matched: usize,
    total: usize,
    rendered: usize,
    columns: u32,
    width: u32,
) -> String {
    format!(
        "{} of {} photos, {} rendered, {} columns at {}px",
        matched, total, rendered, columns, width
    )
}

/// Tag pills as text. Active tags are bracketed.
pub fn format_controls(view: &ControlsView) -> Vec<String> {
    let mut lines = vec!["Tags".to_string()];
    for pill in &view.pills {
        let name = if pill.active {
            format!("[{}]", pill.tag)
        } else {
            pill.tag.clone()
        };
        if pill.available {
            lines.push(format!("{}{} ({})", indent(1), name, pill.count));
        } else {
            lines.push(format!("{}{} ({}, unavailable)", indent(1), name, pill.count));
        }
    }
    if view.badge > 0 {
        lines.push(format!("Active filters: {}", view.badge));
    }
    lines
}

pub fn format_lightbox(lightbox: &LightboxController) -> String {
    match (lightbox.current(), lightbox.counter_text()) {
        (Some(photo), Some(counter)) => format!("Viewer: {} {}", counter, photo.title),
        _ => "Viewer: closed".to_string(),
    }
}

/// Full `filter` report for a session: summary, result header, the
/// viewer's list, tag pills and viewer state.
pub fn format_filter_output(session: &PageSession, container_width: u32) -> Vec<String> {
    let controls = session.controls();
    let grid = session.grid();
    let mut lines = vec![
        format_filter_summary(controls.state()),
        format_result_header(
            grid.len(),
            session.catalog().len(),
            grid.visible_count(),
            grid.column_count(container_width),
            container_width,
        ),
    ];
    let photos = session
        .lightbox()
        .with(|lb| lb.photos().to_vec())
        .unwrap_or_default();
    lines.extend(format_photo_list(&photos));
    lines.push(String::new());
    lines.extend(format_controls(&controls.view()));
    if let Some(viewer) = session.lightbox().with(format_lightbox) {
        lines.push(viewer);
    }
    lines
}

pub fn print_filter_output(session: &PageSession, container_width: u32) {
    print_lines(format_filter_output(session, container_width));
}

// ============================================================================
// Check output
// ============================================================================

/// Catalog inventory: albums with counts, tag counts, cameras.
pub fn format_check_output(catalog: &Catalog) -> Vec<String> {
    let mut lines = vec!["Albums".to_string()];
    for (i, album) in catalog.albums().iter().enumerate() {
        let count = catalog
            .photos()
            .iter()
            .filter(|p| p.album_id == album.id)
            .count();
        lines.push(format!(
            "{} {} ({} photos)",
            format_index(i + 1),
            album.title,
            count
        ));
        if let Some(desc) = &album.description {
            lines.push(format!("{}Description: {}", indent(1), truncate(desc, 40)));
        }
    }

    let tags = catalog.tag_counts();
    if !tags.is_empty() {
        lines.push(String::new());
        lines.push("Tags".to_string());
        for (tag, count) in &tags {
            lines.push(format!("{}{}: {}", indent(1), tag, count));
        }
    }

    let cameras = catalog.camera_names();
    if !cameras.is_empty() {
        lines.push(String::new());
        lines.push("Cameras".to_string());
        for camera in &cameras {
            lines.push(format!("{}{}", indent(1), camera));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Catalog OK: {} albums, {} photos, {} tags",
        catalog.albums().len(),
        catalog.len(),
        tags.len()
    ));
    lines
}

pub fn print_check_output(catalog: &Catalog) {
    print_lines(format_check_output(catalog));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::to_lightbox_photo;
    use crate::config::LightboxConfig;
    use crate::filter::{RangeFilter, TagLogic};
    use crate::test_helpers::*;

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn truncate_short_and_long() {
        assert_eq!(truncate("Short text", 40), "Short text");
        assert_eq!(truncate(&"a".repeat(50), 40), format!("{}...", "a".repeat(40)));
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        assert_eq!(truncate("ééééé", 3), "ééé...");
    }

    // =========================================================================
    // Filter output
    // =========================================================================

    #[test]
    fn summary_for_empty_state() {
        assert_eq!(format_filter_summary(&FilterState::new()), "Filters: none");
    }

    #[test]
    fn summary_lists_each_dimension() {
        let mut state = FilterState::seeded("street");
        state.add_tag("night");
        state.tag_logic = TagLogic::Any;
        state.toggle_album("night");
        state.iso = Some(RangeFilter::new(100.0, 800.0));
        assert_eq!(
            format_filter_summary(&state),
            "Filters: night + street (or); album night; iso 100..800"
        );
    }

    #[test]
    fn photo_list_shows_context_lines() {
        let catalog = sample_catalog();
        let resolver = test_resolver();
        let photos: Vec<LightboxPhoto> = ["street-night", "night-only"]
            .iter()
            .map(|id| to_lightbox_photo(catalog.photo(id).unwrap(), &catalog, resolver.as_ref(), 2048))
            .collect();
        let lines = format_photo_list(&photos);
        assert_eq!(lines[0], "001 street-night");
        assert_eq!(lines[1], "    Album: Street");
        assert_eq!(lines[2], "    Leica M6 · 35mm · f/2 · 1/60s · ISO 3200");
        assert_eq!(lines[3], "    Location: Shinjuku, Tokyo");
        assert_eq!(lines[4], "    Captured: 2023-03-01");
        assert_eq!(lines[5], "002 night-only");
        assert!(lines.last().unwrap().starts_with("    Story: Shot on"));
    }

    #[test]
    fn lightbox_line() {
        let mut lb = LightboxController::with_photos(LightboxConfig::default(), lightbox_photos(&["a", "b"]));
        assert_eq!(format_lightbox(&lb), "Viewer: closed");
        lb.open("b");
        assert_eq!(format_lightbox(&lb), "Viewer: 2 / 2 b");
    }

    #[test]
    fn filter_report_for_session() {
        use crate::config::GalleryConfig;
        use crate::session::{PageScope, SessionOptions};

        let session = PageSession::new(
            &sample_catalog(),
            PageScope::AllPhotos,
            GalleryConfig::default(),
            test_resolver(),
            SessionOptions {
                seed_tag: Some("street".to_string()),
                ..SessionOptions::default()
            },
        );
        let lines = format_filter_output(&session, 1200);
        assert_eq!(lines[0], "Filters: street (and)");
        assert_eq!(lines[1], "2 of 5 photos, 2 rendered, 3 columns at 1200px");
        assert_eq!(lines[2], "001 street-only");
        assert!(lines.contains(&"    [street] (2)".to_string()));
        assert!(lines.contains(&"    landscape (0, unavailable)".to_string()));
        assert_eq!(lines.last().unwrap(), "Viewer: closed");
    }

    // =========================================================================
    // Check output
    // =========================================================================

    #[test]
    fn check_output_inventory() {
        let lines = format_check_output(&sample_catalog());
        assert_eq!(lines[0], "Albums");
        assert_eq!(lines[1], "001 Street (2 photos)");
        assert_eq!(lines[2], "002 After Dark (1 photos)");
        assert_eq!(lines[3], "    Description: Long exposures and neon.");
        assert!(lines.contains(&"    night: 2".to_string()));
        assert!(lines.contains(&"    Sony A7 IV".to_string()));
        assert_eq!(
            lines.last().unwrap(),
            "Catalog OK: 3 albums, 5 photos, 3 tags"
        );
    }
}
