//! Photo catalog loading.
//!
//! The catalog is the contract with the content collaborator: before a page
//! session starts, the collaborator hands over every photo record in scope
//! with EXIF and frontmatter already merged. This module reads that hand-off
//! and turns loose records into validated, immutable [`Photo`] values.
//!
//! ## Accepted Layouts
//!
//! A single JSON document:
//!
//! ```text
//! catalog.json
//! {
//!   "albums": [{ "id": "street", "title": "Street" }],
//!   "photos": [{ "id": "p1", "album_id": "street", ... }]
//! }
//! ```
//!
//! Or a directory of per-album documents, walked recursively:
//!
//! ```text
//! content/
//! ├── street.json                  # { "id", "title", "photos": [...] }
//! ├── travel/
//! │   └── japan.json
//! └── .drafts.json                 # hidden files are skipped
//! ```
//!
//! Photos inside an album document inherit the album's id unless they name
//! one themselves.
//!
//! ## Validation
//!
//! - Photo ids must be unique across the whole catalog
//! - Tags are normalized; blank tags are dropped
//! - Exposure values in any accepted spelling are parsed; unparseable ones
//!   become absent (see [`crate::metadata`])

use crate::metadata::{self, RawValue};
use crate::naming;
use crate::types::{Album, CropAnchor, Exposure, Photo};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Duplicate photo id: {0}")]
    DuplicateId(String),
    #[error("Photo {0} has no album id")]
    MissingAlbum(String),
}

/// A photo record as written by the content collaborator.
#[derive(Debug, Deserialize)]
struct PhotoRecord {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(alias = "image", alias = "src")]
    image_ref: String,
    #[serde(default)]
    album_id: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    camera: Option<String>,
    #[serde(default)]
    aperture: Option<RawValue>,
    #[serde(default, alias = "shutter")]
    shutter_speed: Option<RawValue>,
    #[serde(default)]
    iso: Option<RawValue>,
    #[serde(default, alias = "focal_length_mm")]
    focal_length: Option<RawValue>,
    #[serde(default)]
    location: Option<String>,
    captured_at: DateTime<Utc>,
    #[serde(default)]
    sort_weight: i32,
    #[serde(default)]
    crop_anchor: CropAnchor,
    #[serde(default, alias = "body")]
    story: Option<String>,
}

impl PhotoRecord {
    fn into_photo(self, default_album: Option<&str>) -> Result<Photo, CatalogError> {
        let album_id = metadata::resolve(&[self.album_id.as_deref(), default_album])
            .ok_or_else(|| CatalogError::MissingAlbum(self.id.clone()))?;

        let exposure = Exposure {
            aperture: self.aperture.as_ref().and_then(RawValue::aperture),
            shutter_seconds: self.shutter_speed.as_ref().and_then(RawValue::shutter_seconds),
            iso: self
                .iso
                .as_ref()
                .and_then(RawValue::iso)
                .map(|iso| iso.round() as u32),
        };

        Ok(Photo {
            title: metadata::resolve(&[self.title.as_deref()]).unwrap_or_else(|| self.id.clone()),
            id: self.id,
            image_ref: self.image_ref,
            album_id,
            tags: naming::normalize_tags(&self.tags),
            camera: metadata::resolve(&[self.camera.as_deref()]),
            exposure: (!exposure.is_empty()).then_some(exposure),
            focal_length_mm: self.focal_length.as_ref().and_then(RawValue::focal_length),
            location: metadata::resolve(&[self.location.as_deref()]),
            captured_at: self.captured_at,
            sort_weight: self.sort_weight,
            crop_anchor: self.crop_anchor,
            story: metadata::resolve(&[self.story.as_deref()]),
        })
    }
}

#[derive(Debug, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    albums: Vec<Album>,
    #[serde(default)]
    photos: Vec<PhotoRecord>,
}

#[derive(Debug, Deserialize)]
struct AlbumDocument {
    id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    photos: Vec<PhotoRecord>,
}

/// Immutable set of photos and albums for one page scope.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    albums: Vec<Album>,
    photos: Vec<Photo>,
}

impl Catalog {
    /// Build a catalog from already-constructed parts, rejecting duplicate
    /// photo ids. Tags are normalized on the way in.
    pub fn new(albums: Vec<Album>, mut photos: Vec<Photo>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for photo in &photos {
            if !seen.insert(photo.id.as_str()) {
                return Err(CatalogError::DuplicateId(photo.id.clone()));
            }
        }
        for photo in &mut photos {
            photo.tags = naming::normalize_tags(&photo.tags);
        }
        Ok(Self { albums, photos })
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn photo(&self, id: &str) -> Option<&Photo> {
        self.photos.iter().find(|p| p.id == id)
    }

    pub fn album_title(&self, album_id: &str) -> Option<&str> {
        self.albums
            .iter()
            .find(|a| a.id == album_id)
            .map(|a| a.title.as_str())
    }

    /// Album id → title lookup table.
    pub fn album_titles(&self) -> HashMap<String, String> {
        self.albums
            .iter()
            .map(|a| (a.id.clone(), a.title.clone()))
            .collect()
    }

    /// Every tag in the catalog with the number of photos carrying it.
    pub fn tag_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for tag in self.photos.iter().flat_map(|p| p.tags.iter()) {
            *counts.entry(tag.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Distinct camera names, for the advanced surface's camera checkboxes.
    /// Names differing only in case are one camera, labelled with the first
    /// spelling in catalog order. Sorted case-insensitively.
    pub fn camera_names(&self) -> Vec<String> {
        let mut names: BTreeMap<String, String> = BTreeMap::new();
        for camera in self.photos.iter().filter_map(|p| p.camera.as_deref()) {
            names
                .entry(camera.to_lowercase())
                .or_insert_with(|| camera.to_string());
        }
        names.into_values().collect()
    }

    /// Narrow the catalog to one album's page scope. The album list keeps
    /// only that album.
    pub fn scoped_to_album(&self, album_id: &str) -> Catalog {
        Catalog {
            albums: self
                .albums
                .iter()
                .filter(|a| a.id == album_id)
                .cloned()
                .collect(),
            photos: self
                .photos
                .iter()
                .filter(|p| p.album_id == album_id)
                .cloned()
                .collect(),
        }
    }
}

/// Load a catalog from a JSON file or a directory of per-album JSON files.
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    if path.is_dir() {
        load_catalog_dir(path)
    } else {
        load_catalog_file(path)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| CatalogError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn load_catalog_file(path: &Path) -> Result<Catalog, CatalogError> {
    let doc: CatalogDocument = read_json(path)?;
    let photos = doc
        .photos
        .into_iter()
        .map(|r| r.into_photo(None))
        .collect::<Result<Vec<_>, _>>()?;
    Catalog::new(doc.albums, photos)
}

fn load_catalog_dir(root: &Path) -> Result<Catalog, CatalogError> {
    let mut albums = Vec::new();
    let mut photos = Vec::new();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    for entry in walker {
        let entry = entry?;
        let path = entry.path();
        let is_json = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if !entry.file_type().is_file() || !is_json {
            continue;
        }

        let doc: AlbumDocument = match read_json(path) {
            Ok(doc) => doc,
            Err(CatalogError::Json { path, source }) if source.is_data() => {
                log::warn!("skipping {}: not an album document ({source})", path.display());
                continue;
            }
            Err(e) => return Err(e),
        };

        for record in doc.photos {
            photos.push(record.into_photo(Some(&doc.id))?);
        }
        albums.push(Album {
            id: doc.id,
            title: doc.title,
            description: doc.description,
        });
    }

    log::debug!(
        "loaded {} photos in {} albums from {}",
        photos.len(),
        albums.len(),
        root.display()
    );
    Catalog::new(albums, photos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{EmptySelection, FilterState, apply_filters};
    use tempfile::TempDir;

    const FILE_CATALOG: &str = r#"{
        "albums": [{ "id": "street", "title": "Street" }],
        "photos": [
            {
                "id": "p1",
                "title": "Crossing",
                "image_ref": "street/crossing.jpg",
                "album_id": "street",
                "tags": ["Street", " night ", "street"],
                "aperture": "f/2",
                "shutter_speed": "1/60",
                "iso": "ISO 3200",
                "focal_length": "35mm",
                "captured_at": "2023-03-01T21:00:00Z"
            },
            {
                "id": "p2",
                "image": "street/market.jpg",
                "album_id": "street",
                "iso": 200,
                "captured_at": "2023-03-02T10:00:00Z",
                "crop_anchor": "top"
            }
        ]
    }"#;

    #[test]
    fn loads_single_file_catalog() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");
        fs::write(&path, FILE_CATALOG).unwrap();

        let catalog = load_catalog(&path).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.album_title("street"), Some("Street"));

        let p1 = catalog.photo("p1").unwrap();
        let tags: Vec<&str> = p1.tags.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["night", "street"]);
        assert_eq!(p1.aperture(), Some(2.0));
        assert_eq!(p1.shutter_seconds(), Some(1.0 / 60.0));
        assert_eq!(p1.iso(), Some(3200));
        assert_eq!(p1.focal_length_mm, Some(35.0));
    }

    #[test]
    fn missing_title_falls_back_to_id() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");
        fs::write(&path, FILE_CATALOG).unwrap();

        let catalog = load_catalog(&path).unwrap();
        let p2 = catalog.photo("p2").unwrap();
        assert_eq!(p2.title, "p2");
        assert_eq!(p2.crop_anchor, CropAnchor::Top);
        assert_eq!(p2.aperture(), None);
        assert_eq!(p2.iso(), Some(200));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");
        fs::write(
            &path,
            r#"{ "photos": [
                { "id": "a", "image_ref": "x", "album_id": "s", "captured_at": "2023-01-01T00:00:00Z" },
                { "id": "a", "image_ref": "y", "album_id": "s", "captured_at": "2023-01-01T00:00:00Z" }
            ] }"#,
        )
        .unwrap();
        assert!(matches!(
            load_catalog(&path),
            Err(CatalogError::DuplicateId(id)) if id == "a"
        ));
    }

    #[test]
    fn photo_without_album_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");
        fs::write(
            &path,
            r#"{ "photos": [
                { "id": "a", "image_ref": "x", "captured_at": "2023-01-01T00:00:00Z" }
            ] }"#,
        )
        .unwrap();
        assert!(matches!(
            load_catalog(&path),
            Err(CatalogError::MissingAlbum(_))
        ));
    }

    #[test]
    fn loads_directory_of_album_documents() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("travel")).unwrap();
        fs::write(
            tmp.path().join("street.json"),
            r#"{ "id": "street", "title": "Street", "photos": [
                { "id": "s1", "image_ref": "s1.jpg", "captured_at": "2023-01-01T00:00:00Z" }
            ] }"#,
        )
        .unwrap();
        fs::write(
            tmp.path().join("travel/japan.json"),
            r#"{ "id": "japan", "title": "Japan", "photos": [
                { "id": "j1", "image_ref": "j1.jpg", "captured_at": "2023-01-01T00:00:00Z" }
            ] }"#,
        )
        .unwrap();
        fs::write(tmp.path().join(".drafts.json"), "not json at all").unwrap();
        fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

        let catalog = load_catalog(tmp.path()).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.photo("j1").unwrap().album_id, "japan");
        assert_eq!(catalog.album_title("street"), Some("Street"));
    }

    #[test]
    fn directory_skips_non_album_json() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("settings.json"), r#"{ "theme": "dark" }"#).unwrap();
        let catalog = load_catalog(tmp.path()).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn invalid_json_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.json");
        fs::write(&path, "{ nope").unwrap();
        assert!(matches!(
            load_catalog(&path),
            Err(CatalogError::Json { .. })
        ));
    }

    #[test]
    fn scoping_keeps_one_album() {
        let catalog = crate::test_helpers::sample_catalog();
        let scoped = catalog.scoped_to_album("street");
        assert!(scoped.photos().iter().all(|p| p.album_id == "street"));
        assert_eq!(scoped.albums().len(), 1);
        assert!(!scoped.is_empty());
    }

    #[test]
    fn new_normalizes_raw_tags() {
        let mut photo = crate::test_helpers::photo("raw");
        photo.tags = [" Street ", "STREET", "Night"]
            .into_iter()
            .map(String::from)
            .collect();
        let catalog = Catalog::new(Vec::new(), vec![photo]).unwrap();
        let state = FilterState::seeded("street");
        let matched = apply_filters(catalog.photos(), &state, EmptySelection::ShowNone);
        assert_eq!(matched.len(), 1);
        let tags: Vec<&str> = catalog.photos()[0].tags.iter().map(String::as_str).collect();
        assert_eq!(tags, vec!["night", "street"]);
    }

    #[test]
    fn camera_names_merge_case_variants() {
        let mut first = crate::test_helpers::photo("a");
        first.camera = Some("Leica M6".into());
        let mut second = crate::test_helpers::photo("b");
        second.camera = Some("LEICA M6".into());
        let mut third = crate::test_helpers::photo("c");
        third.camera = Some("Fujifilm X100V".into());
        let catalog = Catalog::new(Vec::new(), vec![first, second, third]).unwrap();
        assert_eq!(catalog.camera_names(), vec!["Fujifilm X100V", "Leica M6"]);
    }

    #[test]
    fn tag_counts_cover_every_photo() {
        let catalog = crate::test_helpers::sample_catalog();
        let counts = catalog.tag_counts();
        assert_eq!(counts.get("street"), Some(&2));
        assert_eq!(counts.get("night"), Some(&2));
        assert_eq!(counts.get("landscape"), Some(&1));
    }
}
