//! Editor configuration.
//!
//! Every section deserializes with `#[serde(default)]`, so a partial JSON
//! document only overrides the keys it names. Loaded settings are sanitized
//! before use.

use crate::crop::CropRenderer;
use crate::geometry::Size;
use crate::mask::{InstanceSelection, INSTANCE_SELECTION};
use crate::raster::{FilterType, SolidColor};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Side length of the square crop viewport, in points.
pub const DEFAULT_VIEWPORT: f64 = 350.0;

/// Side length of the rendered crop, in pixels.
pub const DEFAULT_OUTPUT: u32 = 350;

/// Upper bound on the output side, in pixels.
pub const MAX_OUTPUT: u32 = 4096;

/// Upper bound on the render scale. A 350px crop at 16x is already a
/// 5600x5600 canvas.
pub const MAX_SUPERSAMPLE: u32 = 16;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Crop viewport and renderer parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropSettings {
    /// Viewport width in points.
    pub viewport_width: f64,
    /// Viewport height in points.
    pub viewport_height: f64,
    /// Output width in pixels.
    pub output_width: u32,
    /// Output height in pixels.
    pub output_height: u32,
    /// Supersampling factor used while rasterizing.
    pub supersample: u32,
    /// Filter used for the final downsample.
    pub filter: FilterType,
}

impl Default for CropSettings {
    fn default() -> Self {
        Self {
            viewport_width: DEFAULT_VIEWPORT,
            viewport_height: DEFAULT_VIEWPORT,
            output_width: DEFAULT_OUTPUT,
            output_height: DEFAULT_OUTPUT,
            supersample: CropRenderer::DEFAULT_SUPERSAMPLE,
            filter: FilterType::default(),
        }
    }
}

impl CropSettings {
    pub fn viewport(&self) -> Size {
        Size::new(self.viewport_width, self.viewport_height)
    }

    /// Clamp values into their supported ranges.
    pub fn sanitize(&mut self) {
        if !(self.viewport_width.is_finite() && self.viewport_width >= 1.0) {
            self.viewport_width = DEFAULT_VIEWPORT;
        }
        if !(self.viewport_height.is_finite() && self.viewport_height >= 1.0) {
            self.viewport_height = DEFAULT_VIEWPORT;
        }
        self.output_width = self.output_width.clamp(1, MAX_OUTPUT);
        self.output_height = self.output_height.clamp(1, MAX_OUTPUT);
        self.supersample = self.supersample.clamp(1, MAX_SUPERSAMPLE);
    }
}

/// Background-replacement filter parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StickerSettings {
    /// Color painted behind the subject.
    pub background: SolidColor,
    /// How multiple detected instances are combined.
    pub selection: InstanceSelection,
}

impl Default for StickerSettings {
    fn default() -> Self {
        Self {
            background: SolidColor::default(),
            selection: INSTANCE_SELECTION,
        }
    }
}

/// Persistent editor settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub crop: CropSettings,
    pub sticker: StickerSettings,
}

impl EditorConfig {
    /// Parse settings from a JSON document and sanitize them.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let mut config: EditorConfig = serde_json::from_str(json)?;
        config.sanitize();
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Write settings as pretty-printed JSON, overwriting any existing file.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let payload = self.to_json_string()?;
        fs::write(path, payload).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn sanitize(&mut self) {
        self.crop.sanitize();
    }
}
