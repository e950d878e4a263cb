//! Filter state and the filtering engine.
//!
//! [`FilterState`] is the single mutable description of what the user asked
//! to see. [`apply_filters`] is a pure function from a catalog slice and a
//! state to a freshly sorted `Vec<Photo>`; it has no hidden state, so calling
//! it twice with the same inputs yields the same output.
//!
//! ## Predicate Combination
//!
//! ```text
//! tags (ALL | ANY)  AND  albums  AND  cameras  AND  dates  AND  ranges...
//! ```
//!
//! Every active dimension narrows the result; none widens it. Inactive
//! dimensions (empty sets, absent ranges) are unconstrained.
//!
//! ## Missing Data
//!
//! A photo without a value for a field that an active range filter
//! constrains does not match, however wide the range. An ISO range of
//! `[0, 100000]` still excludes a film scan with no recorded ISO.
//!
//! ## Empty Selection
//!
//! What "nothing selected" means is decided by the surface, not the engine:
//! the album page's simple toggle shows everything, the all-photos explorer
//! shows nothing until the user picks something. See [`EmptySelection`].
//!
//! ## Ordering
//!
//! Output is sorted by descending `sort_weight`, then descending
//! `captured_at`, then ascending `id`. The final key makes the order
//! independent of catalog order.

use crate::naming;
use crate::types::Photo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How active tags combine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagLogic {
    /// Photo must carry every active tag.
    #[default]
    #[serde(rename = "and")]
    All,
    /// Photo must carry at least one active tag.
    #[serde(rename = "or")]
    Any,
}

impl TagLogic {
    pub fn as_str(self) -> &'static str {
        match self {
            TagLogic::All => "and",
            TagLogic::Any => "or",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TagLogic::All => TagLogic::Any,
            TagLogic::Any => TagLogic::All,
        }
    }
}

impl fmt::Display for TagLogic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an entirely empty filter state shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmptySelection {
    ShowAll,
    ShowNone,
}

/// Inclusive numeric range. Either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl RangeFilter {
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn at_least(min: f64) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn at_most(max: f64) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// Bounds with NaN dropped and inverted bounds swapped. `None` when no
    /// usable bound remains, meaning the range constrains nothing.
    pub fn normalized(&self) -> Option<(Option<f64>, Option<f64>)> {
        let min = self.min.filter(|v| !v.is_nan());
        let max = self.max.filter(|v| !v.is_nan());
        match (min, max) {
            (None, None) => None,
            (Some(lo), Some(hi)) if lo > hi => Some((Some(hi), Some(lo))),
            bounds => Some(bounds),
        }
    }

    pub fn is_active(&self) -> bool {
        self.normalized().is_some()
    }

    /// Whether an optional field value falls inside the range. Absent values
    /// never match an active range.
    pub fn matches(&self, value: Option<f64>) -> bool {
        let Some((min, max)) = self.normalized() else {
            return true;
        };
        let Some(v) = value else {
            return false;
        };
        min.is_none_or(|lo| v >= lo) && max.is_none_or(|hi| v <= hi)
    }
}

impl fmt::Display for RangeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = |b: Option<f64>| b.map(|v| v.to_string()).unwrap_or_default();
        write!(f, "{}..{}", bound(self.min), bound(self.max))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid range '{0}': expected MIN..MAX, MIN.. or ..MAX")]
pub struct ParseRangeError(String);

impl FromStr for RangeFilter {
    type Err = ParseRangeError;

    /// Parse `"100..800"`, `"100.."`, `"..800"`. Bounds may use shutter
    /// notation (`"1/500..1/60"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseRangeError(s.to_string());
        let (lo, hi) = s.split_once("..").ok_or_else(err)?;
        let bound = |b: &str| -> Result<Option<f64>, ParseRangeError> {
            let b = b.trim();
            if b.is_empty() {
                Ok(None)
            } else if b.contains('/') {
                crate::metadata::parse_shutter(b).map(Some).ok_or_else(err)
            } else {
                b.parse::<f64>().map(Some).map_err(|_| err())
            }
        };
        let range = RangeFilter {
            min: bound(lo)?,
            max: bound(hi)?,
        };
        if range.min.is_none() && range.max.is_none() {
            return Err(err());
        }
        Ok(range)
    }
}

/// Inclusive capture-date range. Either bound may be open. On the wire the
/// bounds are `from`/`to`; `min`/`max` are accepted as well.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, alias = "min", skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    #[serde(default, alias = "max", skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn is_active(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    pub fn matches(&self, at: DateTime<Utc>) -> bool {
        let (from, to) = match (self.from, self.to) {
            (Some(a), Some(b)) if a > b => (Some(b), Some(a)),
            bounds => bounds,
        };
        from.is_none_or(|f| at >= f) && to.is_none_or(|t| at <= t)
    }
}

/// The current set of active filter predicates for one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub active_tags: BTreeSet<String>,
    pub tag_logic: TagLogic,
    pub album_ids: BTreeSet<String>,
    /// Lowercased camera names.
    pub camera_names: BTreeSet<String>,
    pub date_range: Option<DateRange>,
    pub aperture: Option<RangeFilter>,
    pub shutter_speed: Option<RangeFilter>,
    pub iso: Option<RangeFilter>,
    pub focal_length: Option<RangeFilter>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State pre-seeded with one tag, e.g. when landing on a tag page.
    pub fn seeded(tag: &str) -> Self {
        let mut state = Self::default();
        state.add_tag(tag);
        state
    }

    /// Add a tag after normalizing it. Returns false for blank tags or tags
    /// already active.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        naming::normalize_tag(tag).is_some_and(|t| self.active_tags.insert(t))
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        naming::normalize_tag(tag).is_some_and(|t| self.active_tags.remove(&t))
    }

    /// Flip a tag on or off. Returns whether the tag is active afterwards.
    pub fn toggle_tag(&mut self, tag: &str) -> bool {
        let Some(tag) = naming::normalize_tag(tag) else {
            return false;
        };
        if self.active_tags.remove(&tag) {
            false
        } else {
            self.active_tags.insert(tag);
            true
        }
    }

    pub fn toggle_album(&mut self, album_id: &str) -> bool {
        toggle_in(&mut self.album_ids, album_id.trim().to_string())
    }

    pub fn toggle_camera(&mut self, camera: &str) -> bool {
        toggle_in(&mut self.camera_names, camera.trim().to_lowercase())
    }

    /// Reset every predicate; tag logic is kept.
    pub fn clear(&mut self) {
        *self = Self {
            tag_logic: self.tag_logic,
            ..Self::default()
        };
    }

    fn ranges(&self) -> [Option<&RangeFilter>; 4] {
        [
            self.aperture.as_ref(),
            self.shutter_speed.as_ref(),
            self.iso.as_ref(),
            self.focal_length.as_ref(),
        ]
    }

    /// Number of active non-tag dimensions.
    fn active_dimensions(&self) -> usize {
        let sets = [!self.album_ids.is_empty(), !self.camera_names.is_empty()];
        let dates = self.date_range.is_some_and(|d| d.is_active());
        let ranges = self
            .ranges()
            .iter()
            .filter(|r| r.is_some_and(RangeFilter::is_active))
            .count();
        sets.iter().filter(|&&on| on).count() + usize::from(dates) + ranges
    }

    /// Badge count: one per active tag plus one per other active dimension.
    pub fn active_count(&self) -> usize {
        self.active_tags.len() + self.active_dimensions()
    }

    /// True when no predicate of any kind is active.
    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    fn tags_match(&self, photo: &Photo) -> bool {
        if self.active_tags.is_empty() {
            return true;
        }
        match self.tag_logic {
            TagLogic::All => self.active_tags.iter().all(|t| photo.has_tag(t)),
            TagLogic::Any => self.active_tags.iter().any(|t| photo.has_tag(t)),
        }
    }

    /// Every predicate except tags.
    fn others_match(&self, photo: &Photo) -> bool {
        if !self.album_ids.is_empty() && !self.album_ids.contains(&photo.album_id) {
            return false;
        }
        if !self.camera_names.is_empty() {
            let camera = photo.camera.as_deref().map(|c| c.trim().to_lowercase());
            if !camera.is_some_and(|c| self.camera_names.contains(&c)) {
                return false;
            }
        }
        if let Some(dates) = &self.date_range
            && !dates.matches(photo.captured_at)
        {
            return false;
        }
        let checks = [
            (self.aperture.as_ref(), photo.aperture()),
            (self.shutter_speed.as_ref(), photo.shutter_seconds()),
            (self.iso.as_ref(), photo.iso().map(f64::from)),
            (self.focal_length.as_ref(), photo.focal_length_mm),
        ];
        checks
            .iter()
            .all(|(range, value)| range.is_none_or(|r| r.matches(*value)))
    }

    /// Whether a single photo passes every active predicate.
    pub fn matches(&self, photo: &Photo) -> bool {
        self.tags_match(photo) && self.others_match(photo)
    }
}

fn toggle_in(set: &mut BTreeSet<String>, value: String) -> bool {
    if value.is_empty() {
        return false;
    }
    if set.remove(&value) {
        false
    } else {
        set.insert(value);
        true
    }
}

/// Display order: weight desc, capture time desc, id asc.
pub fn display_order(a: &Photo, b: &Photo) -> Ordering {
    b.sort_weight
        .cmp(&a.sort_weight)
        .then_with(|| b.captured_at.cmp(&a.captured_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort photos into display order in place.
pub fn sort_photos(photos: &mut [Photo]) {
    photos.sort_by(display_order);
}

/// Apply a filter state to a catalog slice.
///
/// Pure: no side effects, and the result is a fresh vector in display
/// order regardless of the input order.
pub fn apply_filters(catalog: &[Photo], state: &FilterState, empty: EmptySelection) -> Vec<Photo> {
    if state.is_empty() && empty == EmptySelection::ShowNone {
        return Vec::new();
    }
    let mut result: Vec<Photo> = catalog
        .iter()
        .filter(|p| state.matches(p))
        .cloned()
        .collect();
    sort_photos(&mut result);
    result
}

/// Per-tag availability for greying out pills.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagAvailability {
    pub tag: String,
    /// Photos that would carry this tag in the narrowed result.
    pub count: usize,
    pub active: bool,
}

impl TagAvailability {
    /// Active tags stay clickable so they can be switched off.
    pub fn available(&self) -> bool {
        self.active || self.count > 0
    }
}

/// Compute, for every tag in the catalog, how many photos selecting it would
/// touch given the rest of the state.
///
/// - `All` mode: count among photos already in the current result, since
///   adding a tag can only narrow further.
/// - `Any` mode: count among photos passing the non-tag predicates, since
///   adding a tag widens the tag predicate.
pub fn tag_availability(catalog: &[Photo], state: &FilterState) -> Vec<TagAvailability> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for photo in catalog {
        for tag in &photo.tags {
            counts.entry(tag.as_str()).or_insert(0);
        }
    }

    for photo in catalog.iter().filter(|p| state.others_match(p)) {
        let in_scope = match state.tag_logic {
            TagLogic::All => state.tags_match(photo),
            TagLogic::Any => true,
        };
        if !in_scope {
            continue;
        }
        for tag in &photo.tags {
            if let Some(count) = counts.get_mut(tag.as_str()) {
                *count += 1;
            }
        }
    }

    counts
        .into_iter()
        .map(|(tag, count)| TagAvailability {
            active: state.active_tags.contains(tag),
            tag: tag.to_string(),
            count,
        })
        .collect()
}
