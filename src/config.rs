//! Gallery configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! serialized to a TOML table and the user's file is merged on top, so a
//! config file only needs the keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [grid]
//! batch_size = 20           # Cards revealed per batch
//! min_column_width = 280    # Pixels; columns = width / this
//! max_columns = 3           # Upper bound on columns
//! aspect_ratio = [4, 5]     # Card width:height
//! lookahead_px = 600        # Reveal when the sentinel is this close
//!
//! [lightbox]
//! wrap = false              # Wrap around at the ends
//! preload_radius = 1        # Neighbours preloaded on each side
//! swipe_threshold_px = 50   # Horizontal travel that counts as a swipe
//!
//! [filters]
//! album_empty = "show-all"      # Album page with nothing selected
//! all_photos_empty = "show-none" # All-photos page with nothing selected
//!
//! [images]
//! url_template = "/images/{ref}?w={width}"
//! thumbnail_width = 600
//! display_width = 2048
//! ```
//!
//! ## Partial Configuration
//!
//! ```toml
//! # Only reveal 12 cards at a time
//! [grid]
//! batch_size = 12
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::filter::EmptySelection;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration loaded from `config.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Progressive reveal and column layout.
    pub grid: GridConfig,
    /// Viewer navigation and preloading.
    pub lightbox: LightboxConfig,
    /// Per-surface empty-selection policy.
    pub filters: FiltersConfig,
    /// Image URL resolution.
    pub images: ImagesConfig,
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.batch_size == 0 {
            return Err(ConfigError::Validation(
                "grid.batch_size must be at least 1".into(),
            ));
        }
        if self.grid.min_column_width == 0 {
            return Err(ConfigError::Validation(
                "grid.min_column_width must be non-zero".into(),
            ));
        }
        if self.grid.max_columns == 0 {
            return Err(ConfigError::Validation(
                "grid.max_columns must be at least 1".into(),
            ));
        }
        if self.grid.aspect_ratio[0] == 0 || self.grid.aspect_ratio[1] == 0 {
            return Err(ConfigError::Validation(
                "grid.aspect_ratio values must be non-zero".into(),
            ));
        }
        let swipe = self.lightbox.swipe_threshold_px;
        if !swipe.is_finite() || swipe < 0.0 {
            return Err(ConfigError::Validation(
                "lightbox.swipe_threshold_px must be a finite, non-negative number".into(),
            ));
        }
        if !self.images.url_template.contains("{ref}") {
            return Err(ConfigError::Validation(
                "images.url_template must contain {ref}".into(),
            ));
        }
        Ok(())
    }
}

/// Grid layout and progressive reveal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Cards revealed initially and per sentinel trigger.
    pub batch_size: usize,
    /// Minimum column width in pixels.
    pub min_column_width: u32,
    /// Maximum number of columns.
    pub max_columns: u32,
    /// Card aspect ratio as `[width, height]`.
    pub aspect_ratio: [u32; 2],
    /// Distance below the viewport at which the sentinel triggers a reveal.
    pub lookahead_px: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            batch_size: 20,
            min_column_width: 280,
            max_columns: 3,
            aspect_ratio: [4, 5],
            lookahead_px: 600,
        }
    }
}

/// Viewer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LightboxConfig {
    /// Whether next/prev wrap around at the ends of the list.
    pub wrap: bool,
    /// Neighbours preloaded on each side of the current photo.
    pub preload_radius: usize,
    /// Minimum horizontal swipe travel in pixels.
    pub swipe_threshold_px: f64,
}

impl Default for LightboxConfig {
    fn default() -> Self {
        Self {
            wrap: false,
            preload_radius: 1,
            swipe_threshold_px: 50.0,
        }
    }
}

/// What each surface shows when nothing is selected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FiltersConfig {
    /// Album page simple toggle.
    pub album_empty: EmptySelection,
    /// All-photos advanced explorer.
    pub all_photos_empty: EmptySelection,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            album_empty: EmptySelection::ShowAll,
            all_photos_empty: EmptySelection::ShowNone,
        }
    }
}

/// Image URL settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// URL template with `{ref}` and `{width}` placeholders.
    pub url_template: String,
    /// Width requested for grid cards.
    pub thumbnail_width: u32,
    /// Width requested for the viewer.
    pub display_width: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            url_template: "/images/{ref}?w={width}".to_string(),
            thumbnail_width: 600,
            display_width: 2048,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(GalleryConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(dir: &Path) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match load_raw_config(dir)? {
        Some(overlay) => merge_toml(base, overlay),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Gallery Sync Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Grid: progressive reveal and column layout
# ---------------------------------------------------------------------------
[grid]
# Cards rendered initially, and added each time the end of the grid
# comes into view.
batch_size = 20

# Columns = container width / min_column_width, clamped to [1, max_columns].
min_column_width = 280
max_columns = 3

# Card aspect ratio as [width, height]. Each photo's crop_anchor decides
# which part of the image stays in frame.
aspect_ratio = [4, 5]

# How close (in pixels) the end-of-grid sentinel must get to the viewport
# before the next batch is revealed.
lookahead_px = 600

# ---------------------------------------------------------------------------
# Lightbox: full-screen viewer
# ---------------------------------------------------------------------------
[lightbox]
# Wrap from the last photo to the first (and back) when navigating.
wrap = false

# Neighbours preloaded on each side of the current photo.
preload_radius = 1

# Horizontal touch travel (pixels) that counts as a swipe.
swipe_threshold_px = 50.0

# ---------------------------------------------------------------------------
# Filters: what an empty selection shows
# ---------------------------------------------------------------------------
[filters]
# "show-all" or "show-none".
album_empty = "show-all"
all_photos_empty = "show-none"

# ---------------------------------------------------------------------------
# Images
# ---------------------------------------------------------------------------
[images]
# {ref} is the photo's image reference, {width} the requested width.
url_template = "/images/{ref}?w={width}"
thumbnail_width = 600
display_width = 2048
"##
}
