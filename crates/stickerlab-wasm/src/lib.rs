//! Stickerlab WASM - WebAssembly bindings for Stickerlab
//!
//! This crate exposes the stickerlab-core crop session and sticker filter to
//! JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `types` - RGBA raster wrapper and settings conversion
//! - `crop` - Gesture-driven circular crop session
//! - `sticker` - Background-replacement filter driven by a JS segmenter
//! - `console` - `log` backend that writes to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { JsCropSession, JsRaster, JsStickerFilter } from '@stickerlab/wasm';
//!
//! await init();
//!
//! const session = new JsCropSession(undefined);
//! session.load_image(new JsRaster(width, height, rgbaPixels));
//! session.drag_changed(12, -4);
//! session.drag_ended();
//! const cropped = session.confirm();
//!
//! const filter = new JsStickerFilter(segment, undefined);
//! const sticker = filter.toggle(cropped);
//! ```

use wasm_bindgen::prelude::*;

mod console;
mod crop;
mod sticker;
mod types;

pub use crop::JsCropSession;
pub use sticker::JsStickerFilter;
pub use types::JsRaster;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console::install();
}

/// Set the console log level ("error", "warn", "info", "debug", "trace" or "off").
#[wasm_bindgen]
pub fn set_log_level(level: &str) {
    log::set_max_level(console::parse_level(level));
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
