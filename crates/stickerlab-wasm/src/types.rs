//! WASM-compatible wrapper types for image data and settings.
//!
//! # Memory Management
//!
//! Pixel data lives in WASM memory. `pixels()` copies it out to a JavaScript
//! `Uint8Array`, so keep rasters in WASM memory between calls where possible.

use stickerlab_core::encode::encode_png;
use stickerlab_core::{EditorConfig, Raster};
use wasm_bindgen::prelude::*;

/// An RGBA image for JavaScript.
#[wasm_bindgen]
pub struct JsRaster {
    inner: Raster,
}

#[wasm_bindgen]
impl JsRaster {
    /// Create a raster from RGBA pixel data (4 bytes per pixel, row-major order).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<JsRaster, JsValue> {
        let inner = Raster {
            width,
            height,
            pixels,
        };
        inner.validate().map_err(to_js_error)?;
        Ok(Self { inner })
    }

    /// Create an opaque raster from RGB pixel data (3 bytes per pixel).
    pub fn from_rgb(width: u32, height: u32, pixels: &[u8]) -> Result<JsRaster, JsValue> {
        Raster::from_rgb(width, height, pixels)
            .map(Self::from_raster)
            .map_err(to_js_error)
    }

    /// Get the image width in pixels
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Get the image height in pixels
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Get the number of bytes in the pixel buffer (width * height * 4)
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.byte_size()
    }

    /// Returns RGBA pixel data as Uint8Array. This copies the buffer.
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels.clone()
    }

    /// Encode as PNG, keeping transparency.
    pub fn to_png(&self) -> Result<Vec<u8>, JsValue> {
        encode_png(&self.inner).map_err(to_js_error)
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup automatically.
    pub fn free(self) {}
}

impl JsRaster {
    pub(crate) fn from_raster(inner: Raster) -> Self {
        Self { inner }
    }

    pub(crate) fn as_raster(&self) -> &Raster {
        &self.inner
    }
}

/// Read editor settings from a JS object; `undefined` or `null` give defaults.
pub(crate) fn config_from_js(value: JsValue) -> Result<EditorConfig, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(EditorConfig::default());
    }
    let mut config: EditorConfig = serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid settings: {e}")))?;
    config.sanitize();
    Ok(config)
}

pub(crate) fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}
