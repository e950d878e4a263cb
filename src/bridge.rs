//! Keeps the grid and the lightbox showing the same filtered set.
//!
//! [`SyncBridge::handle`] is subscribed to the filter channel. For every
//! message it runs [`apply_filters`] once, hands the result to the grid,
//! then converts the same result to viewer entries and hands those to the
//! lightbox, all before returning. Neither consumer ever filters on its
//! own, so they cannot diverge.
//!
//! The lightbox is reached through a [`LightboxSlot`], which may be empty
//! when the viewer has not been set up yet. Updating an empty slot does
//! nothing.

use crate::catalog::Catalog;
use crate::channel::{FilterChannel, SubscriptionId};
use crate::filter::{EmptySelection, apply_filters};
use crate::grid::GridRenderer;
use crate::lightbox::LightboxController;
use crate::message::FilterChanged;
use crate::resolve::ImageResolver;
use crate::types::{LightboxPhoto, Photo};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Shared handle to the page's single lightbox, which may not exist yet.
#[derive(Debug, Clone, Default)]
pub struct LightboxSlot(Rc<RefCell<Option<LightboxController>>>);

impl LightboxSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the controller, replacing any previous one.
    pub fn install(&self, controller: LightboxController) {
        *self.0.borrow_mut() = Some(controller);
    }

    pub fn is_installed(&self) -> bool {
        self.0.borrow().is_some()
    }

    /// Push a new list into the lightbox. No-op when nothing is installed.
    pub fn replace_photos(&self, photos: Vec<LightboxPhoto>) {
        match self.0.borrow_mut().as_mut() {
            Some(controller) => controller.replace_photos(photos),
            None => log::debug!("lightbox not installed, dropping {} photos", photos.len()),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&LightboxController) -> R) -> Option<R> {
        self.0.borrow().as_ref().map(f)
    }

    pub fn with_mut<R>(&self, f: impl FnOnce(&mut LightboxController) -> R) -> Option<R> {
        self.0.borrow_mut().as_mut().map(f)
    }
}

/// Hook for external code that wants to push a freshly filtered list into
/// the lightbox.
pub fn update_lightbox(slot: &LightboxSlot, photos: Vec<LightboxPhoto>) {
    slot.replace_photos(photos);
}

/// Project a catalog photo into the viewer's shape.
pub fn to_lightbox_photo(
    photo: &Photo,
    catalog: &Catalog,
    resolver: &dyn ImageResolver,
    display_width: u32,
) -> LightboxPhoto {
    LightboxPhoto {
        id: photo.id.clone(),
        title: photo.title.clone(),
        url: resolver.resolve(&photo.image_ref, display_width),
        album_id: photo.album_id.clone(),
        album_title: catalog.album_title(&photo.album_id).map(str::to_string),
        body: photo.story.clone(),
        camera: photo.camera.clone(),
        exposure: photo.exposure,
        focal_length_mm: photo.focal_length_mm,
        location: photo.location.clone(),
        captured_at: photo.captured_at,
    }
}

pub struct SyncBridge {
    catalog: Rc<Catalog>,
    grid: Rc<RefCell<GridRenderer>>,
    lightbox: LightboxSlot,
    resolver: Rc<dyn ImageResolver>,
    empty: EmptySelection,
    display_width: u32,
    recomputes: Cell<u64>,
    last_ids: RefCell<Vec<String>>,
}

impl std::fmt::Debug for SyncBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncBridge")
            .field("empty", &self.empty)
            .field("recomputes", &self.recomputes.get())
            .finish_non_exhaustive()
    }
}

impl SyncBridge {
    pub fn new(
        catalog: Rc<Catalog>,
        grid: Rc<RefCell<GridRenderer>>,
        lightbox: LightboxSlot,
        resolver: Rc<dyn ImageResolver>,
        empty: EmptySelection,
        display_width: u32,
    ) -> Self {
        Self {
            catalog,
            grid,
            lightbox,
            resolver,
            empty,
            display_width,
            recomputes: Cell::new(0),
            last_ids: RefCell::new(Vec::new()),
        }
    }

    /// Register on the channel. The bridge lives as long as the channel
    /// holds the subscription.
    pub fn subscribe(self: Rc<Self>, channel: &FilterChannel) -> SubscriptionId {
        channel.subscribe(move |message| self.handle(message))
    }

    /// Recompute once and update both consumers.
    pub fn handle(&self, message: &FilterChanged) {
        let state = message.to_state();
        let result = apply_filters(self.catalog.photos(), &state, self.empty);
        self.recomputes.set(self.recomputes.get() + 1);
        log::debug!(
            "sync: {} tags ({}) -> {} photos",
            state.active_tags.len(),
            state.tag_logic,
            result.len()
        );

        let viewer: Vec<LightboxPhoto> = result
            .iter()
            .map(|p| to_lightbox_photo(p, &self.catalog, self.resolver.as_ref(), self.display_width))
            .collect();
        *self.last_ids.borrow_mut() = result.iter().map(|p| p.id.clone()).collect();

        self.grid.borrow_mut().replace_list(result);
        self.lightbox.replace_photos(viewer);
    }

    /// Number of filter recomputations so far.
    pub fn recompute_count(&self) -> u64 {
        self.recomputes.get()
    }

    /// Ids of the most recent result.
    pub fn last_result_ids(&self) -> Vec<String> {
        self.last_ids.borrow().clone()
    }
}
