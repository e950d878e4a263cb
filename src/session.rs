//! One page view's worth of wired-up components.
//!
//! A [`PageSession`] is built once per page view. It owns the channel and
//! constructs the controls, grid, lightbox and bridge, passing each the
//! handles it needs. Nothing is global: two sessions never share state.
//!
//! | Scope               | Surface    | Empty selection           |
//! |---------------------|------------|---------------------------|
//! | `Album(id)`         | `Simple`   | `[filters] album_empty`   |
//! | `AllPhotos`         | `Advanced` | `[filters] all_photos_empty` |
//!
//! Construction ends by mounting the controls, which publishes the initial
//! state, so the grid (and the lightbox, if installed) start with the first
//! filtered list.

use crate::bridge::{LightboxSlot, SyncBridge, to_lightbox_photo};
use crate::catalog::Catalog;
use crate::channel::FilterChannel;
use crate::config::GalleryConfig;
use crate::controls::{FilterControls, Surface};
use crate::filter::EmptySelection;
use crate::grid::GridRenderer;
use crate::lightbox::{LightboxController, LightboxInput};
use crate::resolve::ImageResolver;
use maud::{DOCTYPE, Markup, html};
use std::cell::{Ref, RefCell, RefMut};
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageScope {
    Album(String),
    AllPhotos,
}

impl PageScope {
    pub fn surface(&self) -> Surface {
        match self {
            PageScope::Album(_) => Surface::Simple,
            PageScope::AllPhotos => Surface::Advanced,
        }
    }

    pub fn empty_selection(&self, config: &GalleryConfig) -> EmptySelection {
        match self {
            PageScope::Album(_) => config.filters.album_empty,
            PageScope::AllPhotos => config.filters.all_photos_empty,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Tag pre-selected when landing on a tag page.
    pub seed_tag: Option<String>,
    /// Where collapsed-section state is stored.
    pub prefs_dir: Option<PathBuf>,
    /// Leave the lightbox slot empty; call
    /// [`PageSession::install_lightbox`] later.
    pub defer_lightbox: bool,
}

pub struct PageSession {
    scope: PageScope,
    config: GalleryConfig,
    catalog: Rc<Catalog>,
    resolver: Rc<dyn ImageResolver>,
    channel: FilterChannel,
    controls: Rc<RefCell<FilterControls>>,
    grid: Rc<RefCell<GridRenderer>>,
    lightbox: LightboxSlot,
    bridge: Rc<SyncBridge>,
}

impl std::fmt::Debug for PageSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageSession")
            .field("scope", &self.scope)
            .field("photos", &self.catalog.len())
            .field("channel", &self.channel)
            .field("bridge", &self.bridge)
            .finish_non_exhaustive()
    }
}

impl PageSession {
    pub fn new(
        catalog: &Catalog,
        scope: PageScope,
        config: GalleryConfig,
        resolver: Rc<dyn ImageResolver>,
        options: SessionOptions,
    ) -> Self {
        let catalog = Rc::new(match &scope {
            PageScope::Album(id) => catalog.scoped_to_album(id),
            PageScope::AllPhotos => catalog.clone(),
        });
        log::debug!("session: {:?} with {} photos", scope, catalog.len());

        let channel = FilterChannel::new();
        let grid = Rc::new(RefCell::new(GridRenderer::new(
            config.grid.clone(),
            resolver.clone(),
            config.images.thumbnail_width,
        )));
        let lightbox = LightboxSlot::new();
        if !options.defer_lightbox {
            lightbox.install(LightboxController::new(config.lightbox.clone()));
        }

        let bridge = Rc::new(SyncBridge::new(
            catalog.clone(),
            grid.clone(),
            lightbox.clone(),
            resolver.clone(),
            scope.empty_selection(&config),
            config.images.display_width,
        ));
        bridge.clone().subscribe(&channel);

        let mut controls = FilterControls::new(
            scope.surface(),
            catalog.clone(),
            channel.clone(),
            options.seed_tag.as_deref(),
        );
        if let Some(dir) = options.prefs_dir {
            controls = controls.with_prefs_dir(dir);
        }
        controls.mount();

        Self {
            scope,
            config,
            catalog,
            resolver,
            channel,
            controls: Rc::new(RefCell::new(controls)),
            grid,
            lightbox,
            bridge,
        }
    }

    /// Install the lightbox after the fact, loaded with the grid's current
    /// list. Replaces any installed controller.
    pub fn install_lightbox(&self) {
        let photos = self
            .grid
            .borrow()
            .photos()
            .iter()
            .map(|p| {
                to_lightbox_photo(
                    p,
                    &self.catalog,
                    self.resolver.as_ref(),
                    self.config.images.display_width,
                )
            })
            .collect();
        self.lightbox.install(LightboxController::with_photos(
            self.config.lightbox.clone(),
            photos,
        ));
    }

    // =========================================================================
    // Handles
    // =========================================================================

    pub fn scope(&self) -> &PageScope {
        &self.scope
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn channel(&self) -> &FilterChannel {
        &self.channel
    }

    pub fn controls(&self) -> Ref<'_, FilterControls> {
        self.controls.borrow()
    }

    /// Mutable access to the controls. Mutations publish synchronously, so
    /// the grid and lightbox are already updated when this borrow ends.
    pub fn controls_mut(&self) -> RefMut<'_, FilterControls> {
        self.controls.borrow_mut()
    }

    pub fn grid(&self) -> Ref<'_, GridRenderer> {
        self.grid.borrow()
    }

    pub fn grid_mut(&self) -> RefMut<'_, GridRenderer> {
        self.grid.borrow_mut()
    }

    pub fn lightbox(&self) -> &LightboxSlot {
        &self.lightbox
    }

    pub fn recompute_count(&self) -> u64 {
        self.bridge.recompute_count()
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    /// A grid card was clicked: open the lightbox on that photo. Returns
    /// false if the card is not rendered or no lightbox is installed.
    pub fn activate_card(&self, index: usize) -> bool {
        let Some(id) = self.grid.borrow().card_activated(index).map(str::to_string) else {
            return false;
        };
        self.open_photo(&id)
    }

    pub fn open_photo(&self, photo_id: &str) -> bool {
        self.lightbox
            .with_mut(|lb| lb.open(photo_id))
            .unwrap_or(false)
    }

    pub fn handle_lightbox_input(&self, input: LightboxInput) -> bool {
        self.lightbox
            .with_mut(|lb| lb.handle_input(input))
            .unwrap_or(false)
    }

    pub fn sentinel_intersected(&self, distance_px: f64) -> bool {
        self.grid.borrow_mut().sentinel_intersected(distance_px)
    }

    pub fn grid_ids(&self) -> Vec<String> {
        self.grid
            .borrow()
            .photo_ids()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Ids in the lightbox's list, or `None` when no lightbox is installed.
    pub fn lightbox_ids(&self) -> Option<Vec<String>> {
        self.lightbox
            .with(|lb| lb.photos().iter().map(|p| p.id.clone()).collect())
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Controls, grid and viewer for a container of the given width.
    pub fn render(&self, container_width: u32) -> Markup {
        let viewer = self.lightbox.with(|lb| lb.render());
        html! {
            aside.filters { (self.controls.borrow().render()) }
            main.gallery { (self.grid.borrow().render(container_width)) }
            @if let Some(viewer) = viewer {
                (viewer)
            }
        }
    }

    /// Standalone HTML document wrapping [`render`](Self::render).
    pub fn render_document(&self, title: &str, container_width: u32) -> Markup {
        html! {
            (DOCTYPE)
            html lang="en" {
                head {
                    meta charset="UTF-8";
                    meta name="viewport" content="width=device-width, initial-scale=1.0";
                    title { (title) }
                }
                body {
                    (self.render(container_width))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::TagLogic;
    use crate::test_helpers::*;

    fn session(scope: PageScope, options: SessionOptions) -> PageSession {
        PageSession::new(
            &sample_catalog(),
            scope,
            GalleryConfig::default(),
            test_resolver(),
            options,
        )
    }

    #[test]
    fn album_page_starts_with_whole_album() {
        let s = session(PageScope::Album("street".into()), SessionOptions::default());
        assert_eq!(s.grid_ids(), vec!["street-only", "street-night"]);
        assert_eq!(s.lightbox_ids(), Some(s.grid_ids()));
        assert_eq!(s.recompute_count(), 1);
        assert_eq!(s.controls().surface(), Surface::Simple);
    }

    #[test]
    fn all_photos_page_starts_empty() {
        let s = session(PageScope::AllPhotos, SessionOptions::default());
        assert!(s.grid_ids().is_empty());
        assert!(s.render(1200).into_string().contains("No photos match"));
    }

    #[test]
    fn seed_tag_narrows_initial_list() {
        let options = SessionOptions {
            seed_tag: Some("Night".into()),
            ..SessionOptions::default()
        };
        let s = session(PageScope::AllPhotos, options);
        assert_eq!(s.grid_ids(), vec!["street-night", "night-only"]);
    }

    #[test]
    fn control_changes_reach_both_views() {
        let s = session(PageScope::AllPhotos, SessionOptions::default());
        s.controls_mut().toggle_tag("street");
        s.controls_mut().toggle_tag("night");
        s.controls_mut().set_tag_logic(TagLogic::Any);
        assert_eq!(s.grid_ids(), vec!["street-only", "street-night", "night-only"]);
        assert_eq!(s.lightbox_ids(), Some(s.grid_ids()));
        assert_eq!(s.recompute_count(), 4);
    }

    #[test]
    fn card_activation_opens_viewer() {
        let s = session(PageScope::Album("street".into()), SessionOptions::default());
        assert!(s.activate_card(1));
        assert_eq!(
            s.lightbox().with(|lb| lb.counter_text()),
            Some(Some("2 / 2".to_string()))
        );
        assert!(s.handle_lightbox_input(LightboxInput::ArrowLeft));
        assert!(s.handle_lightbox_input(LightboxInput::Escape));
        assert!(!s.activate_card(9));
    }

    #[test]
    fn deferred_lightbox_picks_up_current_list() {
        let options = SessionOptions {
            defer_lightbox: true,
            ..SessionOptions::default()
        };
        let s = session(PageScope::Album("street".into()), options);
        assert_eq!(s.lightbox_ids(), None);
        assert!(!s.activate_card(0));

        s.install_lightbox();
        assert_eq!(s.lightbox_ids(), Some(s.grid_ids()));
        assert!(s.activate_card(0));
    }

    #[test]
    fn document_wraps_all_components() {
        let s = session(PageScope::Album("street".into()), SessionOptions::default());
        s.open_photo("street-night");
        let html = s.render_document("Street", 900).into_string();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("filter-controls"));
        assert!(html.contains("photo-grid"));
        assert!(html.contains("lightbox open"));
    }
}
