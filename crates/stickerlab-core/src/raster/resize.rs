//! Raster resampling through the `image` crate's algorithms.

use super::{FilterType, Raster, RasterError};

/// Resize a raster to exact dimensions.
///
/// # Errors
///
/// Returns `RasterError::InvalidDimensions` for a zero target and
/// `RasterError::BufferMismatch` if the source buffer is malformed.
pub fn resize(
    image: &Raster,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<Raster, RasterError> {
    if width == 0 || height == 0 {
        return Err(RasterError::InvalidDimensions { width, height });
    }
    image.validate()?;

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgba = image
        .to_rgba_image()
        .ok_or(RasterError::BufferMismatch {
            expected: image.pixel_count() * Raster::CHANNELS,
            actual: image.byte_size(),
        })?;

    let resized = image::imageops::resize(&rgba, width, height, filter.to_image_filter());

    Ok(Raster::from_rgba_image(resized))
}
