//! Shared types used across the filter, grid and lightbox components.
//!
//! [`Photo`] is the catalog record every component reads; it is built once
//! per page view and never mutated. [`LightboxPhoto`] is the viewer's
//! projection of it, with the display URL and album title already resolved.

use chrono::{DateTime, Utc};
use crate::naming;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Vertical crop focus for fixed-aspect cards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropAnchor {
    Top,
    #[default]
    Middle,
    Bottom,
}

impl CropAnchor {
    /// CSS `object-position` value for this anchor.
    pub fn object_position(self) -> &'static str {
        match self {
            CropAnchor::Top => "50% 0%",
            CropAnchor::Middle => "50% 50%",
            CropAnchor::Bottom => "50% 100%",
        }
    }
}

/// Structured exposure settings. Each part is independently optional:
/// film scans often know the aperture but not the shutter speed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Exposure {
    /// f-number, e.g. `2.8`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aperture: Option<f64>,
    /// Shutter speed in seconds, e.g. `0.004` for 1/250s.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shutter_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iso: Option<u32>,
}

impl Exposure {
    pub fn is_empty(&self) -> bool {
        self.aperture.is_none() && self.shutter_seconds.is_none() && self.iso.is_none()
    }
}

/// One photo in the catalog.
///
/// Tags are normalized (see [`crate::naming::normalize_tag`]) on
/// deserialization and again by [`Catalog::new`](crate::catalog::Catalog::new),
/// so set operations on `tags` are always case-insensitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    /// Stable unique identifier within the catalog.
    pub id: String,
    pub title: String,
    /// Opaque image location, turned into a URL by an
    /// [`ImageResolver`](crate::resolve::ImageResolver).
    pub image_ref: String,
    pub album_id: String,
    #[serde(default, deserialize_with = "normalized_tags")]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure: Option<Exposure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focal_length_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub captured_at: DateTime<Utc>,
    /// Higher weights sort first. Defaults to 0.
    #[serde(default)]
    pub sort_weight: i32,
    #[serde(default)]
    pub crop_anchor: CropAnchor,
    /// Long-form Markdown story shown in the viewer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub story: Option<String>,
}

impl Photo {
    pub fn aperture(&self) -> Option<f64> {
        self.exposure.and_then(|e| e.aperture)
    }

    pub fn shutter_seconds(&self) -> Option<f64> {
        self.exposure.and_then(|e| e.shutter_seconds)
    }

    pub fn iso(&self) -> Option<u32> {
        self.exposure.and_then(|e| e.iso)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// An album as referenced by `Photo::album_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The viewer's projection of a [`Photo`].
///
/// Built by the sync bridge from the same filtered list the grid receives,
/// so index `i` here is the photo at index `i` in the grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LightboxPhoto {
    pub id: String,
    pub title: String,
    /// Resolved display URL.
    pub url: String,
    pub album_id: String,
    /// `None` when the album id is unknown to the catalog.
    pub album_title: Option<String>,
    /// Markdown story text.
    pub body: Option<String>,
    pub camera: Option<String>,
    pub exposure: Option<Exposure>,
    pub focal_length_mm: Option<f64>,
    pub location: Option<String>,
    pub captured_at: DateTime<Utc>,
}

fn normalized_tags<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(naming::normalize_tags(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_anchor_defaults_to_middle() {
        assert_eq!(CropAnchor::default(), CropAnchor::Middle);
        assert_eq!(CropAnchor::Top.object_position(), "50% 0%");
    }

    #[test]
    fn photo_deserializes_with_defaults() {
        let json = r#"{
            "id": "p1",
            "title": "Dusk",
            "image_ref": "street/dusk.jpg",
            "album_id": "street",
            "captured_at": "2023-05-01T18:30:00Z"
        }"#;
        let photo: Photo = serde_json::from_str(json).unwrap();
        assert_eq!(photo.sort_weight, 0);
        assert_eq!(photo.crop_anchor, CropAnchor::Middle);
        assert!(photo.tags.is_empty());
        assert_eq!(photo.iso(), None);
    }

    #[test]
    fn photo_tags_normalize_on_deserialize() {
        let json = r#"{
            "id": "p1",
            "title": "Dusk",
            "image_ref": "street/dusk.jpg",
            "album_id": "street",
            "tags": [" Street ", "STREET", "Black and White"],
            "captured_at": "2023-05-01T18:30:00Z"
        }"#;
        let photo: Photo = serde_json::from_str(json).unwrap();
        let tags: Vec<&str> = photo.tags.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["black and white", "street"]);
    }

    #[test]
    fn exposure_accessors_flatten_options() {
        let exposure = Exposure {
            aperture: Some(2.8),
            shutter_seconds: None,
            iso: Some(400),
        };
        assert!(!exposure.is_empty());
        assert!(Exposure::default().is_empty());
    }
}
