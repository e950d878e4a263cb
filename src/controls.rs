//! Filter control surface.
//!
//! [`FilterControls`] owns the page's [`FilterState`] and is the only thing
//! that mutates it. Every mutation publishes a fresh
//! [`FilterChanged`](crate::message::FilterChanged) on the channel; the
//! controls never talk to the grid or the lightbox directly.
//!
//! Two surfaces exist:
//!
//! - [`Surface::Simple`] on album pages: tag pills and an AND/OR toggle.
//!   Publishes the `Tags` variant.
//! - [`Surface::Advanced`] on the all-photos page: adds album, camera,
//!   date and exposure sections. Publishes the `Advanced` variant.
//!
//! Advanced-only mutations are ignored on the simple surface.
//!
//! Collapsed/expanded sections are remembered in [`UiPrefs`].

use crate::catalog::Catalog;
use crate::channel::FilterChannel;
use crate::filter::{DateRange, FilterState, RangeFilter, TagLogic, tag_availability};
use crate::message::FilterChanged;
use crate::naming;
use crate::prefs::UiPrefs;
use maud::{Markup, html};
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    Simple,
    Advanced,
}

impl Surface {
    pub fn is_advanced(self) -> bool {
        self == Surface::Advanced
    }

    /// Sections rendered on this surface, in order.
    pub fn sections(self) -> &'static [&'static str] {
        match self {
            Surface::Simple => &["tags"],
            Surface::Advanced => &["tags", "albums", "cameras", "dates", "exposure"],
        }
    }
}

/// One tag pill.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPill {
    pub tag: String,
    pub label: String,
    pub active: bool,
    /// Greyed out when false.
    pub available: bool,
    pub count: usize,
}

/// One checkbox in the album or camera section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Render model for the whole surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlsView {
    pub surface: Surface,
    pub pills: Vec<TagPill>,
    pub tag_logic: TagLogic,
    /// Number shown on the filter badge; zero hides it.
    pub badge: usize,
    pub albums: Vec<Choice>,
    pub cameras: Vec<Choice>,
    pub date_range: Option<DateRange>,
    pub ranges: Vec<(&'static str, Option<RangeFilter>)>,
    pub collapsed: Vec<(&'static str, bool)>,
}

#[derive(Debug)]
pub struct FilterControls {
    surface: Surface,
    state: FilterState,
    catalog: Rc<Catalog>,
    channel: FilterChannel,
    prefs: UiPrefs,
    prefs_dir: Option<PathBuf>,
}

impl FilterControls {
    /// Create the surface, optionally pre-seeded with one tag (landing on a
    /// tag page). Nothing is published until [`mount`](Self::mount).
    pub fn new(
        surface: Surface,
        catalog: Rc<Catalog>,
        channel: FilterChannel,
        seed_tag: Option<&str>,
    ) -> Self {
        let state = match seed_tag {
            Some(tag) => FilterState::seeded(tag),
            None => FilterState::new(),
        };
        Self {
            surface,
            state,
            catalog,
            channel,
            prefs: UiPrefs::default(),
            prefs_dir: None,
        }
    }

    /// Load and persist section state in `dir`.
    pub fn with_prefs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        self.prefs = UiPrefs::load(&dir);
        self.prefs_dir = Some(dir);
        self
    }

    /// Publish the initial state so consumers render the first list.
    pub fn mount(&self) {
        self.publish();
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    fn publish(&self) {
        self.channel
            .publish(FilterChanged::from_state(&self.state, self.surface.is_advanced()));
    }

    fn update(&mut self, f: impl FnOnce(&mut FilterState)) {
        f(&mut self.state);
        self.publish();
    }

    fn update_advanced(&mut self, what: &str, f: impl FnOnce(&mut FilterState)) {
        if !self.surface.is_advanced() {
            log::debug!("controls: {what} ignored on simple surface");
            return;
        }
        self.update(f);
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Pill click. Returns whether the tag is active afterwards.
    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        let mut active = false;
        self.update(|s| active = s.toggle_tag(tag));
        active
    }

    pub fn set_tag_logic(&mut self, logic: TagLogic) {
        self.update(|s| s.tag_logic = logic);
    }

    pub fn toggle_tag_logic(&mut self) -> TagLogic {
        self.update(|s| s.tag_logic = s.tag_logic.toggled());
        self.state.tag_logic
    }

    pub fn toggle_album(&mut self, album_id: &str) {
        self.update_advanced("album", |s| {
            s.toggle_album(album_id);
        });
    }

    pub fn toggle_camera(&mut self, camera: &str) {
        self.update_advanced("camera", |s| {
            s.toggle_camera(camera);
        });
    }

    pub fn set_date_range(&mut self, range: Option<DateRange>) {
        self.update_advanced("date range", |s| s.date_range = range);
    }

    pub fn set_aperture(&mut self, range: Option<RangeFilter>) {
        self.update_advanced("aperture", |s| s.aperture = range);
    }

    pub fn set_shutter_speed(&mut self, range: Option<RangeFilter>) {
        self.update_advanced("shutter speed", |s| s.shutter_speed = range);
    }

    pub fn set_iso(&mut self, range: Option<RangeFilter>) {
        self.update_advanced("iso", |s| s.iso = range);
    }

    pub fn set_focal_length(&mut self, range: Option<RangeFilter>) {
        self.update_advanced("focal length", |s| s.focal_length = range);
    }

    /// "Clear all": drop every predicate, keep the tag logic.
    pub fn clear_all(&mut self) {
        self.update(FilterState::clear);
    }

    // =========================================================================
    // Collapsible sections
    // =========================================================================

    pub fn is_collapsed(&self, section: &str) -> bool {
        self.prefs.is_collapsed(section)
    }

    pub fn set_collapsed(&mut self, section: &str, collapsed: bool) {
        self.prefs.set_collapsed(section, collapsed);
        if let Some(dir) = &self.prefs_dir
            && let Err(e) = self.prefs.save(dir)
        {
            log::warn!("could not save UI prefs to {}: {}", dir.display(), e);
        }
    }

    pub fn toggle_section(&mut self, section: &str) -> bool {
        let collapsed = !self.is_collapsed(section);
        self.set_collapsed(section, collapsed);
        collapsed
    }

    // =========================================================================
    // View
    // =========================================================================

    pub fn view(&self) -> ControlsView {
        let pills = tag_availability(self.catalog.photos(), &self.state)
            .into_iter()
            .map(|a| TagPill {
                label: naming::tag_label(&a.tag),
                available: a.available(),
                active: a.active,
                count: a.count,
                tag: a.tag,
            })
            .collect();

        let advanced = self.surface.is_advanced();
        let albums = if advanced {
            self.catalog
                .albums()
                .iter()
                .map(|a| Choice {
                    value: a.id.clone(),
                    label: a.title.clone(),
                    selected: self.state.album_ids.contains(&a.id),
                })
                .collect()
        } else {
            Vec::new()
        };
        let cameras = if advanced {
            self.catalog
                .camera_names()
                .into_iter()
                .map(|name| Choice {
                    selected: self.state.camera_names.contains(&name.to_lowercase()),
                    value: name.clone(),
                    label: name,
                })
                .collect()
        } else {
            Vec::new()
        };
        let ranges = if advanced {
            vec![
                ("aperture", self.state.aperture),
                ("shutter", self.state.shutter_speed),
                ("iso", self.state.iso),
                ("focal", self.state.focal_length),
            ]
        } else {
            Vec::new()
        };

        ControlsView {
            surface: self.surface,
            pills,
            tag_logic: self.state.tag_logic,
            badge: self.state.active_count(),
            albums,
            cameras,
            date_range: if advanced { self.state.date_range } else { None },
            ranges,
            collapsed: self
                .surface
                .sections()
                .iter()
                .map(|s| (*s, self.is_collapsed(s)))
                .collect(),
        }
    }

    pub fn render(&self) -> Markup {
        render_view(&self.view())
    }
}

fn is_collapsed(view: &ControlsView, section: &str) -> bool {
    view.collapsed
        .iter()
        .any(|(name, collapsed)| *name == section && *collapsed)
}

fn section(view: &ControlsView, name: &str, title: &str, body: Markup) -> Markup {
    let collapsed = is_collapsed(view, name);
    html! {
        section.filter-section data-section=(name) {
            button.filter-section-toggle type="button" aria-expanded=(!collapsed) { (title) }
            @if !collapsed {
                div.filter-section-body { (body) }
            }
        }
    }
}

fn render_view(view: &ControlsView) -> Markup {
    let pills = html! {
        div.tag-pills {
            @for pill in &view.pills {
                button.tag-pill.active[pill.active] type="button"
                    data-tag=(pill.tag)
                    aria-pressed=(pill.active)
                    disabled[!pill.available] {
                    (pill.label)
                    " "
                    span.tag-count { (pill.count) }
                }
            }
        }
        button.tag-logic type="button" data-logic=(view.tag_logic.as_str()) {
            @match view.tag_logic {
                TagLogic::All => "Match all",
                TagLogic::Any => "Match any",
            }
        }
    };

    html! {
        div.filter-controls data-surface=(if view.surface.is_advanced() { "advanced" } else { "simple" }) {
            div.filter-header {
                @if view.badge > 0 {
                    span.filter-badge { (view.badge) }
                    button.filter-clear type="button" { "Clear all" }
                }
            }
            (section(view, "tags", "Tags", pills))
            @if view.surface.is_advanced() {
                (section(view, "albums", "Albums", choices("album", &view.albums)))
                (section(view, "cameras", "Cameras", choices("camera", &view.cameras)))
                (section(view, "dates", "Dates", html! {
                    @let range = view.date_range.unwrap_or_default();
                    input.date-from type="date"
                        value=[range.from.map(|d| d.format("%Y-%m-%d").to_string())];
                    input.date-to type="date"
                        value=[range.to.map(|d| d.format("%Y-%m-%d").to_string())];
                }))
                (section(view, "exposure", "Exposure", html! {
                    @for (name, range) in &view.ranges {
                        label.range-filter data-range=(name) {
                            (name)
                            input type="text" placeholder="min..max"
                                value=[range.map(|r| r.to_string())];
                        }
                    }
                }))
            }
        }
    }
}

fn choices(kind: &str, items: &[Choice]) -> Markup {
    html! {
        ul.filter-choices data-kind=(kind) {
            @for item in items {
                li {
                    label {
                        input type="checkbox" value=(item.value) checked[item.selected];
                        (item.label)
                    }
                }
            }
        }
    }
}
