//! Run configuration.
//!
//! Handles loading, validating, and merging `index-sheets.toml`.
//! Configuration is layered: stock defaults are overridden by a config file,
//! which is in turn overridden by command-line flags.
//!
//! ## Config File Location
//!
//! The file is read from the archive root, or from the path given with
//! `--config`:
//!
//! ```text
//! archive/
//! ├── index-sheets.toml        # Optional (overrides stock defaults)
//! ├── 2023/
//! │   └── ...
//! └── 2024/
//!     └── ...
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [layout]
//! thumbnails_per_row = 10   # Grid columns
//! thumbnail_width = 150     # Thumbnail box width (px)
//! thumbnail_height = 150    # Thumbnail box height (px)
//! max_thumbnails = 200      # Per output image; larger months are paginated
//! margin = 20               # Spacing around each cell (px)
//! caption_height = 40       # Caption strip under each thumbnail (px)
//! footer_height = 40        # "Page N of M" band on multi-page months (px)
//!
//! [output]
//! format = "jpg"            # jpg, png or webp
//! quality = 90              # JPEG quality (1-100)
//! background = "#ffffff"    # Canvas and letterbox color
//! frame = "#000000"         # 1px border around each thumbnail box
//! # dir = "indexes"         # Flat output directory (default: year dirs)
//!
//! [caption]
//! # font = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"
//! font_size = 14.0
//! color = "#000000"
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [layout]
//! thumbnails_per_row = 6
//! ```
//!
//! Relative `dir` and `font` paths are resolved against the directory that
//! holds the config file. Unknown keys are rejected to catch typos early.
//! A layout where even one row of thumbnails would not fit in an index image
//! fails validation.

use crate::imaging::{GridLayout, MAX_CANVAS_PIXELS, MAX_CANVAS_SIDE};
use crate::types::{Color, OutputFormat, ThumbnailSpec};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the archive root.
pub const CONFIG_FILE_NAME: &str = "index-sheets.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Index configuration loaded from `index-sheets.toml`.
///
/// All fields have defaults. Config files need only specify the values they
/// want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndexConfig {
    /// Grid geometry and pagination.
    pub layout: LayoutConfig,
    /// Encoding, colors and destination of the index images.
    pub output: OutputConfig,
    /// Caption font and color.
    pub caption: CaptionConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    pub thumbnails_per_row: u32,
    pub thumbnail_width: u32,
    pub thumbnail_height: u32,
    pub max_thumbnails: usize,
    pub margin: u32,
    pub caption_height: u32,
    pub footer_height: u32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let spec = ThumbnailSpec::default();
        Self {
            thumbnails_per_row: spec.per_row,
            thumbnail_width: spec.width,
            thumbnail_height: spec.height,
            max_thumbnails: spec.max_per_page,
            margin: spec.margin,
            caption_height: spec.caption_height,
            footer_height: spec.footer_height,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub quality: u8,
    pub background: Color,
    pub frame: Color,
    /// Flat output directory. When absent, each index goes into its year directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        let spec = ThumbnailSpec::default();
        Self {
            format: spec.format,
            quality: spec.quality,
            background: spec.background,
            frame: spec.frame_color,
            dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CaptionConfig {
    /// TrueType/OpenType font file. When absent, a system font is searched for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<PathBuf>,
    pub font_size: f32,
    pub color: Color,
}

impl Default for CaptionConfig {
    fn default() -> Self {
        let spec = ThumbnailSpec::default();
        Self {
            font: None,
            font_size: spec.font_size,
            color: spec.caption_color,
        }
    }
}

/// Values given on the command line. `None` leaves the config value alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub thumbnails_per_row: Option<u32>,
    pub thumbnail_width: Option<u32>,
    pub thumbnail_height: Option<u32>,
    pub max_thumbnails: Option<usize>,
    pub format: Option<OutputFormat>,
    pub output_dir: Option<PathBuf>,
    pub font: Option<PathBuf>,
}

impl IndexConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("layout.thumbnails_per_row", self.layout.thumbnails_per_row),
            ("layout.thumbnail_width", self.layout.thumbnail_width),
            ("layout.thumbnail_height", self.layout.thumbnail_height),
        ];
        for (key, value) in positive {
            if value == 0 {
                return Err(ConfigError::Validation(format!("{key} must be at least 1")));
            }
        }
        if self.layout.max_thumbnails == 0 {
            return Err(ConfigError::Validation(
                "layout.max_thumbnails must be at least 1".into(),
            ));
        }
        if GridLayout::new(1, &self.thumbnail_spec(), true).is_none() {
            return Err(ConfigError::Validation(format!(
                "layout too large: one row of thumbnails must fit in {MAX_CANVAS_SIDE}px per side and {MAX_CANVAS_PIXELS} pixels"
            )));
        }
        if !(1..=100).contains(&self.output.quality) {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if !self.caption.font_size.is_finite() || self.caption.font_size <= 0.0 {
            return Err(ConfigError::Validation(
                "caption.font_size must be a positive number".into(),
            ));
        }
        Ok(())
    }

    /// Apply command-line values on top of the loaded config.
    pub fn apply(&mut self, overrides: Overrides) {
        let layout = &mut self.layout;
        if let Some(v) = overrides.thumbnails_per_row {
            layout.thumbnails_per_row = v;
        }
        if let Some(v) = overrides.thumbnail_width {
            layout.thumbnail_width = v;
        }
        if let Some(v) = overrides.thumbnail_height {
            layout.thumbnail_height = v;
        }
        if let Some(v) = overrides.max_thumbnails {
            layout.max_thumbnails = v;
        }
        if let Some(v) = overrides.format {
            self.output.format = v;
        }
        if overrides.output_dir.is_some() {
            self.output.dir = overrides.output_dir;
        }
        if overrides.font.is_some() {
            self.caption.font = overrides.font;
        }
    }

    /// The resolved, immutable settings for a run.
    pub fn thumbnail_spec(&self) -> ThumbnailSpec {
        ThumbnailSpec {
            width: self.layout.thumbnail_width,
            height: self.layout.thumbnail_height,
            per_row: self.layout.thumbnails_per_row,
            max_per_page: self.layout.max_thumbnails,
            output_dir: self.output.dir.clone(),
            margin: self.layout.margin,
            caption_height: self.layout.caption_height,
            footer_height: self.layout.footer_height,
            format: self.output.format,
            quality: self.output.quality,
            background: self.output.background,
            frame_color: self.output.frame,
            caption_color: self.caption.color,
            font_size: self.caption.font_size,
        }
    }

    /// Make relative `dir` and `font` paths relative to `base` instead of the
    /// working directory.
    fn resolve_paths(&mut self, base: &Path) {
        for path in [&mut self.output.dir, &mut self.caption.font]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(IndexConfig::default())?)
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

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<IndexConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: IndexConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the config for the archive at `root`.
///
/// An `explicit` path must exist. Otherwise `<root>/index-sheets.toml` is
/// used when present and stock defaults when not. User values are merged on
/// top of the stock defaults, unknown keys are rejected, and the result is
/// validated.
pub fn load_config(root: &Path, explicit: Option<&Path>) -> Result<IndexConfig, ConfigError> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Some(root.join(CONFIG_FILE_NAME)).filter(|p| p.is_file()),
    };

    let Some(path) = path else {
        debug!("No {CONFIG_FILE_NAME} in {}, using defaults", root.display());
        return resolve_config(stock_defaults_value()?, None);
    };

    debug!("Loading config from {}", path.display());
    let overlay = load_raw_config(&path)?;
    let mut config = resolve_config(stock_defaults_value()?, Some(overlay))?;
    if let Some(base) = path.parent() {
        config.resolve_paths(base);
    }
    Ok(config)
}

/// Returns a fully-commented stock `index-sheets.toml` with all keys and explanations.
///
/// Used by the `--gen-config` flag.
pub fn stock_config_toml() -> &'static str {
    r##"# Index Sheets Configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file at <archive root>/index-sheets.toml or pass it with --config.
# Command-line flags override values from this file.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Grid layout
# ---------------------------------------------------------------------------
[layout]
# Thumbnails per grid row.
thumbnails_per_row = 10

# Size of the box each thumbnail is fitted into, in pixels.
# Images keep their aspect ratio and are centered in the box.
thumbnail_width = 150
thumbnail_height = 150

# Maximum thumbnails per index image. Larger months are split into
# index_YYYY-MM_001, index_YYYY-MM_002, ...
max_thumbnails = 200

# Spacing around each grid cell, in pixels.
margin = 20

# Height of the file-name strip under each thumbnail, in pixels.
caption_height = 40

# Height of the "Page N of M" band on months with several pages.
footer_height = 40

# ---------------------------------------------------------------------------
# Output images
# ---------------------------------------------------------------------------
[output]
# Encoded format: "jpg", "png" or "webp".
format = "jpg"

# JPEG quality (1 = worst, 100 = best). Ignored for png and webp.
quality = 90

# Canvas and letterbox color.
background = "#ffffff"

# Color of the 1px border around each thumbnail box.
frame = "#000000"

# Write every index image into one directory instead of the year
# directories. Relative paths are resolved against this file's directory.
# dir = "indexes"

# ---------------------------------------------------------------------------
# Captions
# ---------------------------------------------------------------------------
[caption]
# TrueType/OpenType font for captions. When unset, common system fonts are
# tried; without any font, captions are left blank.
# font = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"

font_size = 14.0
color = "#000000"
"##
}
