//! Photo grid with progressive reveal.
//!
//! The grid holds the current filtered list and renders only the first
//! `visible_count` cards. A sentinel element follows the last rendered
//! card; when the host's viewport-intersection callback reports it within
//! `lookahead_px`, another batch is revealed. Every new list starts over at
//! one batch.
//!
//! ## Columns
//!
//! `floor(container_width / min_column_width)`, clamped to
//! `[1, max_columns]`. Cards keep a fixed aspect ratio at any column count;
//! each photo's [`CropAnchor`](crate::types::CropAnchor) decides which part
//! of the image stays in frame.
//!
//! ## Post-render hook
//!
//! [`GridRenderer::on_cards_appended`] is called with exactly the cards that
//! were added, after every replace and every reveal. Hosts use it to attach
//! per-image behaviour (for instance blocking drag-to-save) without watching
//! the whole document for mutations. The hook runs while the grid is
//! borrowed and must not call back into it.

use crate::config::GridConfig;
use crate::resolve::ImageResolver;
use crate::types::Photo;
use maud::{Markup, html};
use std::collections::HashSet;
use std::rc::Rc;

pub const EMPTY_STATE_TEXT: &str = "No photos match these filters.";

/// Callback receiving newly appended cards.
pub type CardsAppendedHook = Box<dyn FnMut(&[PhotoCard])>;

/// Render model for one grid card.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoCard {
    /// Position in the filtered list.
    pub index: usize,
    pub id: String,
    pub title: String,
    pub url: String,
    pub object_position: &'static str,
    pub load_failed: bool,
}

pub struct GridRenderer {
    photos: Vec<Photo>,
    visible_count: usize,
    config: GridConfig,
    resolver: Rc<dyn ImageResolver>,
    thumbnail_width: u32,
    failed: HashSet<String>,
    hook: Option<CardsAppendedHook>,
}

impl std::fmt::Debug for GridRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridRenderer")
            .field("photos", &self.photos.len())
            .field("visible_count", &self.visible_count)
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

impl GridRenderer {
    pub fn new(config: GridConfig, resolver: Rc<dyn ImageResolver>, thumbnail_width: u32) -> Self {
        Self {
            photos: Vec::new(),
            visible_count: 0,
            config,
            resolver,
            thumbnail_width,
            failed: HashSet::new(),
            hook: None,
        }
    }

    /// Install the post-render hook, replacing any previous one.
    pub fn on_cards_appended(&mut self, hook: impl FnMut(&[PhotoCard]) + 'static) {
        self.hook = Some(Box::new(hook));
    }

    /// Swap in a new filtered list and reset progressive reveal.
    pub fn replace_list(&mut self, photos: Vec<Photo>) {
        self.photos = photos;
        self.visible_count = self.config.batch_size.min(self.photos.len());
        log::debug!(
            "grid: {} photos, showing {}",
            self.photos.len(),
            self.visible_count
        );
        self.notify_appended(0);
    }

    /// Viewport callback for the sentinel. `distance_px` is how far below
    /// the viewport the sentinel currently sits (zero or negative once it is
    /// on screen). Returns true if a batch was revealed.
    pub fn sentinel_intersected(&mut self, distance_px: f64) -> bool {
        if distance_px > f64::from(self.config.lookahead_px) {
            return false;
        }
        self.reveal_more() > 0
    }

    /// Reveal the next batch. Returns how many cards were added.
    pub fn reveal_more(&mut self) -> usize {
        let start = self.visible_count;
        self.visible_count = (start + self.config.batch_size).min(self.photos.len());
        let added = self.visible_count - start;
        if added > 0 {
            self.notify_appended(start);
        }
        added
    }

    fn notify_appended(&mut self, start: usize) {
        if start >= self.visible_count {
            return;
        }
        let cards: Vec<PhotoCard> = (start..self.visible_count).map(|i| self.card(i)).collect();
        if let Some(hook) = self.hook.as_mut() {
            hook(&cards);
        }
    }

    pub fn visible_count(&self) -> usize {
        self.visible_count
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn has_more(&self) -> bool {
        self.visible_count < self.photos.len()
    }

    /// The whole current list, in display order.
    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    /// Ids of the whole current list, in display order.
    pub fn photo_ids(&self) -> Vec<&str> {
        self.photos.iter().map(|p| p.id.as_str()).collect()
    }

    pub fn column_count(&self, container_width: u32) -> u32 {
        let max = self.config.max_columns.max(1);
        (container_width / self.config.min_column_width.max(1)).clamp(1, max)
    }

    fn card(&self, index: usize) -> PhotoCard {
        let photo = &self.photos[index];
        PhotoCard {
            index,
            id: photo.id.clone(),
            title: photo.title.clone(),
            url: self.resolver.resolve(&photo.image_ref, self.thumbnail_width),
            object_position: photo.crop_anchor.object_position(),
            load_failed: self.failed.contains(&photo.id),
        }
    }

    /// Cards currently rendered.
    pub fn visible_cards(&self) -> Vec<PhotoCard> {
        (0..self.visible_count).map(|i| self.card(i)).collect()
    }

    /// Photo id for an activated card, if that card is rendered.
    pub fn card_activated(&self, index: usize) -> Option<&str> {
        if index >= self.visible_count {
            return None;
        }
        self.photos.get(index).map(|p| p.id.as_str())
    }

    /// Record an image load failure for one card. Returns false if the id
    /// is not in the current list.
    pub fn mark_load_failed(&mut self, photo_id: &str) -> bool {
        if !self.photos.iter().any(|p| p.id == photo_id) {
            return false;
        }
        log::debug!("grid: image for {photo_id} failed to load");
        self.failed.insert(photo_id.to_string());
        true
    }

    pub fn render(&self, container_width: u32) -> Markup {
        if self.photos.is_empty() {
            return html! {
                div.photo-grid-empty role="status" {
                    p { (EMPTY_STATE_TEXT) }
                }
            };
        }
        let columns = self.column_count(container_width);
        let [w, h] = self.config.aspect_ratio;
        html! {
            div.photo-grid data-columns=(columns)
                style={ "grid-template-columns: repeat(" (columns) ", 1fr)" } {
                @for card in self.visible_cards() {
                    (render_card(&card, w, h))
                }
            }
            @if self.has_more() {
                div.grid-sentinel
                    data-lookahead=(self.config.lookahead_px)
                    data-remaining=(self.photos.len() - self.visible_count)
                    aria-hidden="true" {}
            }
        }
    }
}

fn render_card(card: &PhotoCard, w: u32, h: u32) -> Markup {
    html! {
        button.photo-card type="button"
            data-index=(card.index)
            data-photo-id=(card.id)
            style={ "aspect-ratio: " (w) " / " (h) } {
            @if card.load_failed {
                span.photo-card-error role="img" aria-label=(card.title) { "Image unavailable" }
            } @else {
                img src=(card.url) alt=(card.title) loading="lazy" draggable="false"
                    style={ "object-position: " (card.object_position) };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use crate::types::CropAnchor;
    use std::cell::RefCell;

    fn grid() -> GridRenderer {
        GridRenderer::new(GridConfig::default(), test_resolver(), 600)
    }

    // =========================================================================
    // Progressive reveal
    // =========================================================================

    #[test]
    fn reveal_advances_by_batch_and_clamps() {
        let mut g = grid();
        g.replace_list(numbered_photos(50));
        assert_eq!(g.visible_count(), 20);

        assert!(g.sentinel_intersected(0.0));
        assert_eq!(g.visible_count(), 40);

        assert!(g.sentinel_intersected(-10.0));
        assert_eq!(g.visible_count(), 50);

        assert!(!g.sentinel_intersected(0.0));
        assert_eq!(g.visible_count(), 50);
        assert!(!g.has_more());
    }

    #[test]
    fn new_list_resets_visible_count() {
        let mut g = grid();
        g.replace_list(numbered_photos(50));
        g.reveal_more();
        g.reveal_more();
        assert_eq!(g.visible_count(), 50);

        g.replace_list(numbered_photos(50));
        assert_eq!(g.visible_count(), 20);
    }

    #[test]
    fn short_list_shows_everything() {
        let mut g = grid();
        g.replace_list(numbered_photos(7));
        assert_eq!(g.visible_count(), 7);
        assert!(!g.has_more());
    }

    #[test]
    fn sentinel_beyond_lookahead_does_nothing() {
        let mut g = grid();
        g.replace_list(numbered_photos(30));
        assert!(!g.sentinel_intersected(601.0));
        assert_eq!(g.visible_count(), 20);
        assert!(g.sentinel_intersected(600.0));
        assert_eq!(g.visible_count(), 30);
    }

    #[test]
    fn custom_batch_size() {
        let config = GridConfig {
            batch_size: 8,
            ..GridConfig::default()
        };
        let mut g = GridRenderer::new(config, test_resolver(), 600);
        g.replace_list(numbered_photos(20));
        assert_eq!(g.visible_count(), 8);
        g.reveal_more();
        assert_eq!(g.visible_count(), 16);
    }

    // =========================================================================
    // Post-render hook
    // =========================================================================

    #[test]
    fn hook_receives_only_appended_cards() {
        let mut g = grid();
        let seen: Rc<RefCell<Vec<(usize, usize)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        g.on_cards_appended(move |cards| {
            let first = cards.first().map(|c| c.index).unwrap_or(0);
            sink.borrow_mut().push((first, cards.len()));
        });

        g.replace_list(numbered_photos(45));
        g.reveal_more();
        g.reveal_more();
        g.reveal_more();
        assert_eq!(*seen.borrow(), vec![(0, 20), (20, 20), (40, 5)]);
    }

    #[test]
    fn hook_not_called_for_empty_list() {
        let mut g = grid();
        let calls = Rc::new(RefCell::new(0));
        let counter = calls.clone();
        g.on_cards_appended(move |_| *counter.borrow_mut() += 1);
        g.replace_list(Vec::new());
        assert_eq!(*calls.borrow(), 0);
    }

    // =========================================================================
    // Layout
    // =========================================================================

    #[test]
    fn column_count_is_clamped() {
        let g = grid();
        assert_eq!(g.column_count(0), 1);
        assert_eq!(g.column_count(279), 1);
        assert_eq!(g.column_count(560), 2);
        assert_eq!(g.column_count(900), 3);
        assert_eq!(g.column_count(4000), 3);
    }

    #[test]
    fn cards_carry_crop_anchor_and_resolved_url() {
        let mut g = grid();
        let mut top = photo("top");
        top.crop_anchor = CropAnchor::Top;
        g.replace_list(vec![top, photo("mid")]);

        let cards = g.visible_cards();
        assert_eq!(cards[0].object_position, "50% 0%");
        assert_eq!(cards[0].url, "/img/top.jpg?w=600");
        assert_eq!(cards[1].object_position, "50% 50%");
    }

    // =========================================================================
    // Interaction and rendering
    // =========================================================================

    #[test]
    fn card_activation_only_for_rendered_cards() {
        let mut g = grid();
        g.replace_list(numbered_photos(25));
        assert_eq!(g.card_activated(3), Some("p03"));
        assert_eq!(g.card_activated(22), None);
        g.reveal_more();
        assert_eq!(g.card_activated(22), Some("p22"));
    }

    #[test]
    fn empty_list_renders_empty_state() {
        let mut g = grid();
        g.replace_list(Vec::new());
        let html = g.render(1200).into_string();
        assert!(html.contains(EMPTY_STATE_TEXT));
        assert!(!html.contains("grid-sentinel"));
    }

    #[test]
    fn render_includes_sentinel_while_more_remain() {
        let mut g = grid();
        g.replace_list(numbered_photos(21));
        let html = g.render(1200).into_string();
        assert!(html.contains("grid-sentinel"));
        assert!(html.contains("data-remaining=\"1\""));
        assert!(html.contains("repeat(3, 1fr)"));
        assert!(html.contains("aspect-ratio: 4 / 5"));

        g.reveal_more();
        assert!(!g.render(1200).into_string().contains("grid-sentinel"));
    }

    #[test]
    fn failed_image_only_affects_its_card() {
        let mut g = grid();
        g.replace_list(numbered_photos(3));
        assert!(g.mark_load_failed("p01"));
        assert!(!g.mark_load_failed("missing"));

        let cards = g.visible_cards();
        assert!(!cards[0].load_failed);
        assert!(cards[1].load_failed);
        assert!(!cards[2].load_failed);

        let html = g.render(900).into_string();
        assert_eq!(html.matches("Image unavailable").count(), 1);
        assert_eq!(html.matches("<img").count(), 2);
    }
}
