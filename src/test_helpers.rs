//! Shared test utilities for the gallery-sync test suite.
//!
//! Provides photo builders, a small fixture catalog, and extractors that
//! make assertions about filtered lists read as lists of ids.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let photos = tag_fixture();
//! let result = apply_filters(&photos, &state, EmptySelection::ShowAll);
//! assert_eq!(ids(&result), vec!["street-night"]);
//! ```

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeSet;
use std::rc::Rc;

use crate::catalog::Catalog;
use crate::naming::normalize_tags;
use crate::resolve::{ImageResolver, UrlTemplateResolver};
use crate::types::{Album, CropAnchor, Exposure, LightboxPhoto, Photo};

// =========================================================================
// Builders
// =========================================================================

/// Parse an RFC 3339 timestamp. Panics on malformed input.
pub fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap_or_else(|e| panic!("bad timestamp '{rfc3339}': {e}"))
        .with_timezone(&Utc)
}

/// A bare photo in the `street` album with no tags or exposure data.
pub fn photo(id: &str) -> Photo {
    Photo {
        id: id.to_string(),
        title: id.to_string(),
        image_ref: format!("{id}.jpg"),
        album_id: "street".to_string(),
        tags: BTreeSet::new(),
        camera: None,
        exposure: None,
        focal_length_mm: None,
        location: None,
        captured_at: at("2023-01-01T12:00:00Z"),
        sort_weight: 0,
        crop_anchor: CropAnchor::Middle,
        story: None,
    }
}

pub fn tagged(id: &str, album: &str, tags: &[&str], captured: &str) -> Photo {
    Photo {
        album_id: album.to_string(),
        tags: normalize_tags(tags),
        captured_at: at(captured),
        ..photo(id)
    }
}

/// The four-photo tag fixture: `{street,night}`, `{street}`, `{night}`,
/// `{landscape}`, captured on consecutive days.
pub fn tag_fixture() -> Vec<Photo> {
    vec![
        tagged("street-night", "street", &["street", "night"], "2023-01-01T12:00:00Z"),
        tagged("street-only", "street", &["street"], "2023-01-02T12:00:00Z"),
        tagged("night-only", "night", &["night"], "2023-01-03T12:00:00Z"),
        tagged("landscape", "landscapes", &["landscape"], "2023-01-04T12:00:00Z"),
    ]
}

/// `n` untagged photos `p00`, `p01`, ... in display order (newest first).
pub fn numbered_photos(n: usize) -> Vec<Photo> {
    let newest = at("2024-06-01T12:00:00Z");
    (0..n)
        .map(|i| Photo {
            captured_at: newest - Duration::hours(i as i64),
            ..photo(&format!("p{i:02}"))
        })
        .collect()
}

/// A catalog with richer metadata across three albums.
pub fn sample_catalog() -> Catalog {
    let albums = vec![
        Album {
            id: "street".to_string(),
            title: "Street".to_string(),
            description: None,
        },
        Album {
            id: "night".to_string(),
            title: "After Dark".to_string(),
            description: Some("Long exposures and neon.".to_string()),
        },
        Album {
            id: "landscapes".to_string(),
            title: "Landscapes".to_string(),
            description: None,
        },
    ];

    let photos = vec![
        Photo {
            camera: Some("Leica M6".to_string()),
            exposure: Some(Exposure {
                aperture: Some(2.0),
                shutter_seconds: Some(1.0 / 60.0),
                iso: Some(3200),
            }),
            focal_length_mm: Some(35.0),
            location: Some("Shinjuku, Tokyo".to_string()),
            ..tagged("street-night", "street", &["street", "night"], "2023-03-01T21:00:00Z")
        },
        Photo {
            camera: Some("Fujifilm X100V".to_string()),
            exposure: Some(Exposure {
                aperture: Some(5.6),
                shutter_seconds: Some(1.0 / 500.0),
                iso: Some(400),
            }),
            focal_length_mm: Some(23.0),
            ..tagged("street-only", "street", &["street"], "2023-03-05T10:00:00Z")
        },
        Photo {
            camera: Some("Leica M6".to_string()),
            exposure: Some(Exposure {
                aperture: Some(1.4),
                shutter_seconds: Some(0.5),
                iso: None,
            }),
            story: Some("Shot on **Portra 800**, pushed one stop.".to_string()),
            ..tagged("night-only", "night", &["night"], "2023-02-10T23:30:00Z")
        },
        Photo {
            camera: Some("Sony A7 IV".to_string()),
            exposure: Some(Exposure {
                aperture: Some(11.0),
                shutter_seconds: Some(1.0 / 125.0),
                iso: Some(100),
            }),
            focal_length_mm: Some(24.0),
            sort_weight: 5,
            crop_anchor: CropAnchor::Top,
            ..tagged("landscape", "landscapes", &["landscape"], "2022-08-20T06:15:00Z")
        },
        tagged("untagged", "landscapes", &[], "2021-06-01T09:00:00Z"),
    ];

    Catalog::new(albums, photos).unwrap_or_else(|e| panic!("fixture catalog invalid: {e}"))
}

pub fn test_resolver() -> Rc<dyn ImageResolver> {
    Rc::new(UrlTemplateResolver::new("/img/{ref}?w={width}"))
}

/// Minimal viewer entries with the given ids, in order.
pub fn lightbox_photos(ids: &[&str]) -> Vec<LightboxPhoto> {
    ids.iter()
        .map(|id| LightboxPhoto {
            id: id.to_string(),
            title: id.to_string(),
            url: format!("/img/{id}.jpg"),
            album_id: "street".to_string(),
            album_title: Some("Street".to_string()),
            body: None,
            camera: None,
            exposure: None,
            focal_length_mm: None,
            location: None,
            captured_at: at("2023-01-01T12:00:00Z"),
        })
        .collect()
}

// =========================================================================
// Extractors
// =========================================================================

/// Photo ids in list order.
pub fn ids(photos: &[Photo]) -> Vec<&str> {
    photos.iter().map(|p| p.id.as_str()).collect()
}

/// Viewer entry ids in list order.
pub fn lightbox_ids(photos: &[LightboxPhoto]) -> Vec<&str> {
    photos.iter().map(|p| p.id.as_str()).collect()
}
