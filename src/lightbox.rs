//! Full-screen photo viewer.
//!
//! One [`LightboxController`] exists per page view. It keeps its own copy of
//! the filtered list (as [`LightboxPhoto`] values) so that navigation order
//! always matches the grid, and it tracks the displayed photo by id rather
//! than by index.
//!
//! ## States
//!
//! ```text
//! Closed --open(id)--> Open{index} --close/Escape/backdrop--> Closed
//!                         |   ^
//!                         +---+ next / prev / replace_photos (same id kept)
//! ```
//!
//! - `open(id)` with an id missing from the current list opens at index 0.
//!   An empty list stays closed.
//! - Navigation stops at the ends unless `wrap` is configured.
//! - `replace_photos` while open re-locates the displayed photo by id. If
//!   the new list no longer contains it, the viewer closes instead of
//!   showing a different photo at the old index.
//! - Closing restores whatever page scroll-lock state existed at open.
//!
//! ## Preloading
//!
//! On open and on every navigation the neighbours within `preload_radius`
//! are queued for preloading. A URL is queued at most once per controller;
//! the host drains the queue with [`LightboxController::take_preloads`].

use crate::config::LightboxConfig;
use crate::metadata;
use crate::types::LightboxPhoto;
use maud::{Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};
use std::collections::HashSet;

pub const LOAD_ERROR_TEXT: &str = "This image could not be loaded.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightboxState {
    Closed,
    Open { index: usize },
}

/// User input the viewer reacts to. Keyboard, pointer and touch variants
/// of the same intent map to the same transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightboxInput {
    ArrowLeft,
    ArrowRight,
    Escape,
    /// Horizontal touch travel in pixels; negative is a leftward swipe.
    Swipe { dx: f64 },
    Backdrop,
    CloseButton,
    PrevButton,
    NextButton,
}

impl LightboxInput {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(LightboxInput::ArrowLeft),
            "ArrowRight" => Some(LightboxInput::ArrowRight),
            "Escape" | "Esc" => Some(LightboxInput::Escape),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct LightboxController {
    photos: Vec<LightboxPhoto>,
    state: LightboxState,
    config: LightboxConfig,
    page_scroll_locked: bool,
    scroll_lock_before_open: Option<bool>,
    preloaded: HashSet<String>,
    pending_preloads: Vec<String>,
    failed_urls: HashSet<String>,
}

impl LightboxController {
    pub fn new(config: LightboxConfig) -> Self {
        Self {
            photos: Vec::new(),
            state: LightboxState::Closed,
            config,
            page_scroll_locked: false,
            scroll_lock_before_open: None,
            preloaded: HashSet::new(),
            pending_preloads: Vec::new(),
            failed_urls: HashSet::new(),
        }
    }

    pub fn with_photos(config: LightboxConfig, photos: Vec<LightboxPhoto>) -> Self {
        let mut controller = Self::new(config);
        controller.photos = photos;
        controller
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn state(&self) -> LightboxState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, LightboxState::Open { .. })
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            LightboxState::Open { index } => Some(index),
            LightboxState::Closed => None,
        }
    }

    pub fn current(&self) -> Option<&LightboxPhoto> {
        self.current_index().and_then(|i| self.photos.get(i))
    }

    pub fn photos(&self) -> &[LightboxPhoto] {
        &self.photos
    }

    /// `"{index+1} / {len}"` while open.
    pub fn counter_text(&self) -> Option<String> {
        self.current_index()
            .map(|i| format!("{} / {}", i + 1, self.photos.len()))
    }

    /// Scroll-lock state of the host page.
    pub fn page_scroll_locked(&self) -> bool {
        self.page_scroll_locked
    }

    /// Record a scroll-lock change made by something other than the viewer,
    /// such as an open navigation menu.
    pub fn set_page_scroll_locked(&mut self, locked: bool) {
        self.page_scroll_locked = locked;
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    /// Open on `photo_id`. Returns false if the list is empty.
    pub fn open(&mut self, photo_id: &str) -> bool {
        if self.photos.is_empty() {
            log::debug!("lightbox: open({photo_id}) ignored, no photos");
            return false;
        }
        let index = match self.position_of(photo_id) {
            Some(i) => i,
            None => {
                log::debug!("lightbox: {photo_id} not in current list, opening at 0");
                0
            }
        };
        if !self.is_open() {
            self.scroll_lock_before_open = Some(self.page_scroll_locked);
            self.page_scroll_locked = true;
        }
        self.show(index);
        true
    }

    /// Close the viewer. Returns false if it was already closed.
    pub fn close(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.state = LightboxState::Closed;
        if let Some(previous) = self.scroll_lock_before_open.take() {
            self.page_scroll_locked = previous;
        }
        log::debug!("lightbox: closed");
        true
    }

    /// Move to the next photo. Returns true if the index changed.
    pub fn next(&mut self) -> bool {
        let Some(index) = self.current_index() else {
            return false;
        };
        let len = self.photos.len();
        let target = if index + 1 < len {
            index + 1
        } else if self.config.wrap {
            0
        } else {
            return false;
        };
        if target == index {
            return false;
        }
        self.show(target);
        true
    }

    /// Move to the previous photo. Returns true if the index changed.
    pub fn prev(&mut self) -> bool {
        let Some(index) = self.current_index() else {
            return false;
        };
        let len = self.photos.len();
        let target = if index > 0 {
            index - 1
        } else if self.config.wrap {
            len - 1
        } else {
            return false;
        };
        if target == index {
            return false;
        }
        self.show(target);
        true
    }

    /// Replace the list, keeping the displayed photo by identity.
    pub fn replace_photos(&mut self, photos: Vec<LightboxPhoto>) {
        let current_id = self.current().map(|p| p.id.clone());
        self.photos = photos;
        let Some(id) = current_id else {
            return;
        };
        match self.position_of(&id) {
            Some(index) => {
                log::debug!("lightbox: {id} kept at index {index}");
                self.show(index);
            }
            None => {
                log::debug!("lightbox: {id} filtered out, closing");
                self.close();
            }
        }
    }

    /// Apply one input event. Returns true if anything changed. Inputs are
    /// ignored while closed.
    pub fn handle_input(&mut self, input: LightboxInput) -> bool {
        if !self.is_open() {
            return false;
        }
        match input {
            LightboxInput::ArrowRight | LightboxInput::NextButton => self.next(),
            LightboxInput::ArrowLeft | LightboxInput::PrevButton => self.prev(),
            LightboxInput::Escape | LightboxInput::Backdrop | LightboxInput::CloseButton => {
                self.close()
            }
            LightboxInput::Swipe { dx } => {
                if dx.is_nan() || dx.abs() < self.config.swipe_threshold_px {
                    false
                } else if dx < 0.0 {
                    self.next()
                } else {
                    self.prev()
                }
            }
        }
    }

    /// Record that the image at `url` failed to load.
    pub fn mark_load_failed(&mut self, url: &str) {
        log::debug!("lightbox: image {url} failed to load");
        self.failed_urls.insert(url.to_string());
    }

    /// Drain the queued preload URLs.
    pub fn take_preloads(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_preloads)
    }

    fn position_of(&self, photo_id: &str) -> Option<usize> {
        self.photos.iter().position(|p| p.id == photo_id)
    }

    fn show(&mut self, index: usize) {
        self.state = LightboxState::Open { index };
        self.preloaded.insert(self.photos[index].url.clone());
        self.queue_neighbours(index);
    }

    fn queue_neighbours(&mut self, index: usize) {
        for offset in 1..=self.config.preload_radius {
            for target in [
                self.neighbour(index, offset, true),
                self.neighbour(index, offset, false),
            ]
            .into_iter()
            .flatten()
            {
                let url = &self.photos[target].url;
                if self.preloaded.insert(url.clone()) {
                    self.pending_preloads.push(url.clone());
                }
            }
        }
    }

    fn neighbour(&self, index: usize, offset: usize, forward: bool) -> Option<usize> {
        let len = self.photos.len();
        if forward {
            let target = index + offset;
            if target < len {
                Some(target)
            } else if self.config.wrap {
                Some(target % len)
            } else {
                None
            }
        } else if offset <= index {
            Some(index - offset)
        } else if self.config.wrap {
            Some((index + len - offset % len) % len)
        } else {
            None
        }
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    pub fn render(&self) -> Markup {
        let (Some(index), Some(photo)) = (self.current_index(), self.current()) else {
            return html! {
                div.lightbox hidden aria-hidden="true" {}
            };
        };
        let len = self.photos.len();
        let has_prev = index > 0 || (self.config.wrap && len > 1);
        let has_next = index + 1 < len || (self.config.wrap && len > 1);
        let failed = self.failed_urls.contains(&photo.url);

        html! {
            div.lightbox.open role="dialog" aria-modal="true" aria-label=(photo.title) {
                div.lightbox-backdrop data-action="backdrop" {}
                button.lightbox-close type="button" data-action="close" aria-label="Close" { "×" }
                @if has_prev {
                    button.lightbox-prev type="button" data-action="prev" aria-label="Previous photo" { "‹" }
                }
                figure.lightbox-figure {
                    @if failed {
                        p.lightbox-error role="alert" { (LOAD_ERROR_TEXT) }
                    } @else {
                        img.lightbox-image src=(photo.url) alt=(photo.title) draggable="false";
                    }
                    figcaption.lightbox-meta {
                        h2.lightbox-title { (photo.title) }
                        @if let Some(album) = &photo.album_title {
                            p.lightbox-album { (album) }
                        }
                        @if let Some(line) = metadata_line(photo) {
                            p.lightbox-exposure { (line) }
                        }
                        @if let Some(location) = &photo.location {
                            p.lightbox-location { (location) }
                        }
                        time.lightbox-date datetime=(photo.captured_at.to_rfc3339()) {
                            (photo.captured_at.format("%-d %B %Y").to_string())
                        }
                        span.lightbox-counter { (index + 1) " / " (len) }
                    }
                    @if let Some(body) = &photo.body {
                        div.lightbox-story { (PreEscaped(render_markdown(body))) }
                    }
                }
                @if has_next {
                    button.lightbox-next type="button" data-action="next" aria-label="Next photo" { "›" }
                }
            }
        }
    }
}

/// Camera, focal length and exposure joined for display, e.g.
/// `"Leica M6 · 35mm · f/2 · 1/60s · ISO 3200"`.
pub fn metadata_line(photo: &LightboxPhoto) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(camera) = &photo.camera {
        parts.push(camera.clone());
    }
    if let Some(mm) = photo.focal_length_mm {
        parts.push(metadata::format_focal_length(mm));
    }
    if let Some(exposure) = &photo.exposure {
        if let Some(f) = exposure.aperture {
            parts.push(metadata::format_aperture(f));
        }
        if let Some(s) = exposure.shutter_seconds {
            parts.push(metadata::format_shutter(s));
        }
        if let Some(iso) = exposure.iso {
            parts.push(metadata::format_iso(iso));
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" · "))
    }
}

fn render_markdown(source: &str) -> String {
    let parser = Parser::new(source);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}
