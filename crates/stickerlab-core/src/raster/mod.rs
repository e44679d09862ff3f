//! RGBA raster buffers shared by every stage of the editor.
//!
//! This module provides:
//! - The [`Raster`] buffer used for source photos, cropped images and stickers
//! - The [`SolidColor`] fill used as sticker background
//! - Resizing through the `image` crate's filters
//!
//! # Pixel Layout
//!
//! Pixels are stored as straight (non-premultiplied) RGBA8 in row-major order,
//! 4 bytes per pixel, origin at the top-left corner.

mod resize;
mod types;

pub use resize::resize;
pub use types::{FilterType, Raster, RasterError, SolidColor};
