//! Soft-matte compositing of a subject over a solid background.
//!
//! For each pixel with coverage `m`, foreground `fg` (straight alpha) and the
//! opaque background color `bg`:
//!
//! ```text
//! out_alpha = fg_alpha * m + (1 - m)
//! out_rgb   = (fg_rgb * fg_alpha * m + bg_rgb * (1 - m)) / out_alpha
//! ```
//!
//! The background fills the full extent, so wherever the subject is absent
//! the color shows through, including the transparent corners of a circular
//! crop.

use super::SubjectMask;
use crate::raster::{Raster, SolidColor};
use thiserror::Error;

/// Errors that can occur while compositing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompositeError {
    /// Mask and base image extents differ. No resampling is attempted.
    #[error(
        "Mask is {mask_width}x{mask_height} but image is {base_width}x{base_height}"
    )]
    DimensionMismatch {
        base_width: u32,
        base_height: u32,
        mask_width: u32,
        mask_height: u32,
    },

    /// A buffer does not match its declared extent.
    #[error("Invalid pixel data: {0}")]
    InvalidBuffer(String),
}

/// Blend `base` over a `color` fill, weighted by `mask`.
///
/// A zero mask yields a plain `color` fill; a full mask yields `base`.
///
/// # Errors
///
/// `CompositeError::DimensionMismatch` when the extents differ and
/// `CompositeError::InvalidBuffer` for malformed buffers.
pub fn composite(
    base: &Raster,
    mask: &SubjectMask,
    color: SolidColor,
) -> Result<Raster, CompositeError> {
    if base.extent() != mask.extent() {
        return Err(CompositeError::DimensionMismatch {
            base_width: base.width,
            base_height: base.height,
            mask_width: mask.width,
            mask_height: mask.height,
        });
    }
    base.validate()
        .map_err(|e| CompositeError::InvalidBuffer(e.to_string()))?;
    if !mask.is_well_formed() {
        return Err(CompositeError::InvalidBuffer(format!(
            "mask has {} values for {}x{}",
            mask.values.len(),
            mask.width,
            mask.height
        )));
    }

    let bg = color.to_rgba();
    let mut output = Vec::with_capacity(base.byte_size());

    for (fg, &m) in base.pixels.chunks_exact(4).zip(&mask.values) {
        match m {
            0 => output.extend_from_slice(&bg),
            255 => output.extend_from_slice(fg),
            _ => output.extend_from_slice(&blend(fg, bg, m as f32 / 255.0)),
        }
    }

    Ok(Raster::new(base.width, base.height, output))
}

#[inline]
fn blend(fg: &[u8], bg: [u8; 4], coverage: f32) -> [u8; 4] {
    let fg_alpha = fg[3] as f32 / 255.0;
    let inv = 1.0 - coverage;
    let out_alpha = fg_alpha * coverage + inv;

    let mut out = [0u8; 4];
    for c in 0..3 {
        let premul = fg[c] as f32 * fg_alpha * coverage + bg[c] as f32 * inv;
        out[c] = (premul / out_alpha).round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Horizontal gradient image with opaque alpha.
    fn gradient(width: u32, height: u32) -> Raster {
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = ((x * 255) / width.max(1)) as u8;
                pixels.extend_from_slice(&[v, 255 - v, (y % 256) as u8, 255]);
            }
        }
        Raster::new(width, height, pixels)
    }

    #[test]
    fn test_zero_mask_is_color_fill() {
        let base = gradient(32, 16);
        let mask = SubjectMask::filled(32, 16, 0);
        let out = composite(&base, &mask, SolidColor::PINK).unwrap();

        assert_eq!(out, Raster::filled(32, 16, SolidColor::PINK.to_rgba()));
    }

    #[test]
    fn test_full_mask_returns_base() {
        let base = gradient(32, 16);
        let mask = SubjectMask::filled(32, 16, 255);
        let out = composite(&base, &mask, SolidColor::PINK).unwrap();

        assert_eq!(out, base);
    }

    #[test]
    fn test_half_mask_blends() {
        let base = Raster::filled(1, 1, [0, 0, 0, 255]);
        let mask = SubjectMask::filled(1, 1, 128);
        let out = composite(&base, &mask, SolidColor::new(200, 100, 50)).unwrap();

        // ~50% of the background over black
        let px = out.pixel(0, 0);
        assert!((px[0] as i32 - 100).abs() <= 1, "{:?}", px);
        assert!((px[1] as i32 - 50).abs() <= 1, "{:?}", px);
        assert!((px[2] as i32 - 25).abs() <= 1, "{:?}", px);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_soft_matte_is_monotonic() {
        let base = Raster::filled(256, 1, [255, 255, 255, 255]);
        let values: Vec<u8> = (0..=255).collect();
        let mask = SubjectMask::new(256, 1, values);
        let out = composite(&base, &mask, SolidColor::new(0, 0, 0)).unwrap();

        let reds: Vec<u8> = out.pixels.chunks_exact(4).map(|p| p[0]).collect();
        assert!(reds.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(reds[0], 0);
        assert_eq!(reds[255], 255);
    }

    #[test]
    fn test_transparent_foreground_shows_background() {
        // Corner of a circular crop: fully transparent foreground
        let base = Raster::filled(2, 1, [10, 20, 30, 0]);
        let mask = SubjectMask::new(2, 1, vec![0, 128]);
        let out = composite(&base, &mask, SolidColor::new(255, 0, 0)).unwrap();

        assert_eq!(out.pixel(0, 0), [255, 0, 0, 255]);
        let partial = out.pixel(1, 0);
        assert_eq!(&partial[..3], &[255, 0, 0]);
        assert!((partial[3] as i32 - 127).abs() <= 1);
    }

    #[test]
    fn test_dimension_mismatch() {
        let base = Raster::filled(100, 100, [0, 0, 0, 255]);
        let mask = SubjectMask::filled(100, 99, 255);
        assert_eq!(
            composite(&base, &mask, SolidColor::PINK),
            Err(CompositeError::DimensionMismatch {
                base_width: 100,
                base_height: 100,
                mask_width: 100,
                mask_height: 99,
            })
        );
    }

    #[test]
    fn test_malformed_mask_buffer() {
        let base = Raster::filled(4, 4, [0, 0, 0, 255]);
        let mask = SubjectMask {
            width: 4,
            height: 4,
            values: vec![0; 5],
        };
        assert!(matches!(
            composite(&base, &mask, SolidColor::PINK),
            Err(CompositeError::InvalidBuffer(_))
        ));
    }

    #[test]
    fn test_error_display() {
        let err = CompositeError::DimensionMismatch {
            base_width: 100,
            base_height: 100,
            mask_width: 100,
            mask_height: 99,
        };
        assert_eq!(err.to_string(), "Mask is 100x99 but image is 100x100");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
