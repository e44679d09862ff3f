//! Final rasterization of the circular crop.
//!
//! # Algorithm
//!
//! The output spans the whole viewport. Each pixel of a supersampled canvas is
//! mapped to a viewport point, then through the inverse of the live transform
//! into source pixel space, and sampled bilinearly. Canvas pixels outside the
//! crop shape keep the sampled color but get zero alpha so the downsample does
//! not darken the rim. The canvas is then resized to the output size.
//!
//! # Crop Shape
//!
//! All four corner radii are half the output height, which is a full circle for
//! square output and a capsule otherwise.

use super::Transform;
use crate::config::CropSettings;
use crate::geometry::{fill_size, image_rect, Size};
use crate::raster::{resize, FilterType, Raster};
use image::{Rgba, RgbaImage};
use thiserror::Error;

/// Errors that can occur while rendering the crop.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RenderError {
    /// Render requested before an image was loaded.
    #[error("No image loaded")]
    NoImage,

    /// The render would be empty or produced an unusable raster.
    #[error("Degenerate crop render: {0}")]
    Degenerate(String),
}

/// Circular crop produced on confirm. Owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CroppedImage(Raster);

impl CroppedImage {
    /// Wrap an existing raster, e.g. one restored by the UI layer.
    pub fn from_raster(raster: Raster) -> Self {
        Self(raster)
    }

    pub fn raster(&self) -> &Raster {
        &self.0
    }

    pub fn into_raster(self) -> Raster {
        self.0
    }

    pub fn width(&self) -> u32 {
        self.0.width
    }

    pub fn height(&self) -> u32 {
        self.0.height
    }
}

/// Rasterizes the transformed image into a circular crop of fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRenderer {
    output_width: u32,
    output_height: u32,
    supersample: u32,
    filter: FilterType,
}

impl CropRenderer {
    /// Supersampling multiplier used for the confirm render.
    pub const DEFAULT_SUPERSAMPLE: u32 = 10;

    /// Largest side of the supersampled canvas. Supersampling is reduced to
    /// stay within it.
    pub const MAX_CANVAS_SIDE: u32 = 8192;

    pub fn new(output_width: u32, output_height: u32) -> Self {
        Self {
            output_width,
            output_height,
            supersample: Self::DEFAULT_SUPERSAMPLE,
            filter: FilterType::Bilinear,
        }
    }

    pub fn from_settings(settings: &CropSettings) -> Self {
        Self {
            output_width: settings.output_width,
            output_height: settings.output_height,
            supersample: settings.supersample,
            filter: settings.filter,
        }
    }

    pub fn with_supersample(mut self, supersample: u32) -> Self {
        self.supersample = supersample;
        self
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    pub fn output_size(&self) -> (u32, u32) {
        (self.output_width, self.output_height)
    }

    /// Supersampling factor actually used, after the canvas size limit.
    pub fn effective_supersample(&self) -> u32 {
        let longest = self.output_width.max(self.output_height).max(1);
        let limit = (Self::MAX_CANVAS_SIDE / longest).max(1);
        self.supersample.clamp(1, limit)
    }

    /// Render `image` as it appears in `viewport` under `transform`.
    ///
    /// # Errors
    ///
    /// `RenderError::NoImage` when `image` is `None`; `RenderError::Degenerate`
    /// for empty sources, zero or oversized outputs, degenerate viewports,
    /// non-finite transforms or a downsample that does not land on the output
    /// size.
    pub fn render(
        &self,
        image: Option<&Raster>,
        transform: Transform,
        viewport: Size,
    ) -> Result<CroppedImage, RenderError> {
        let image = image.ok_or(RenderError::NoImage)?;
        image
            .validate()
            .map_err(|e| RenderError::Degenerate(e.to_string()))?;
        if self.output_width == 0 || self.output_height == 0 {
            return Err(RenderError::Degenerate(format!(
                "output size {}x{}",
                self.output_width, self.output_height
            )));
        }
        if viewport.is_degenerate() {
            return Err(RenderError::Degenerate(format!(
                "viewport {}x{}",
                viewport.width, viewport.height
            )));
        }

        let longest = self.output_width.max(self.output_height);
        if longest > Self::MAX_CANVAS_SIDE {
            return Err(RenderError::Degenerate(format!(
                "output size {}x{} exceeds {}px",
                self.output_width,
                self.output_height,
                Self::MAX_CANVAS_SIDE
            )));
        }
        let supersample = self.effective_supersample();
        let (canvas_w, canvas_h) = (
            self.output_width * supersample,
            self.output_height * supersample,
        );

        if !(transform.scale.is_finite()
            && transform.offset.dx.is_finite()
            && transform.offset.dy.is_finite())
        {
            return Err(RenderError::Degenerate(format!(
                "transform scale {} offset ({}, {})",
                transform.scale, transform.offset.dx, transform.offset.dy
            )));
        }

        let natural = fill_size(
            Size::new(image.width as f64, image.height as f64),
            viewport,
        );
        let rect = image_rect(natural, viewport, transform.scale, transform.offset);
        let finite = rect.x.is_finite()
            && rect.y.is_finite()
            && rect.width.is_finite()
            && rect.height.is_finite();
        if !(finite && rect.width > 0.0 && rect.height > 0.0) {
            return Err(RenderError::Degenerate(format!(
                "image rect {}x{}",
                rect.width, rect.height
            )));
        }

        let points_per_px_x = viewport.width / canvas_w as f64;
        let points_per_px_y = viewport.height / canvas_h as f64;
        let src_per_point_x = image.width as f64 / rect.width;
        let src_per_point_y = image.height as f64 / rect.height;
        let shape = RoundedShape::circle_for(canvas_w as f64, canvas_h as f64);

        let mut canvas = RgbaImage::new(canvas_w, canvas_h);
        for (x, y, px) in canvas.enumerate_pixels_mut() {
            let cx = x as f64 + 0.5;
            let cy = y as f64 + 0.5;

            // Canvas pixel -> viewport point -> source pixel
            let u = (cx * points_per_px_x - rect.x) * src_per_point_x;
            let v = (cy * points_per_px_y - rect.y) * src_per_point_y;
            if u < 0.0 || v < 0.0 || u >= image.width as f64 || v >= image.height as f64 {
                continue;
            }

            let mut sample = sample_bilinear(image, u - 0.5, v - 0.5);
            if !shape.contains(cx, cy) {
                sample[3] = 0;
            }
            *px = Rgba(sample);
        }

        let supersampled = Raster::from_rgba_image(canvas);
        let output = resize(
            &supersampled,
            self.output_width,
            self.output_height,
            self.filter,
        )
        .map_err(|e| RenderError::Degenerate(e.to_string()))?;

        if output.extent() != (self.output_width, self.output_height) || output.is_empty() {
            return Err(RenderError::Degenerate(format!(
                "downsample produced {}x{}",
                output.width, output.height
            )));
        }

        Ok(CroppedImage(output))
    }
}

/// Rectangle with all four corners rounded by the same radius.
struct RoundedShape {
    half_w: f64,
    half_h: f64,
    radius: f64,
}

impl RoundedShape {
    fn circle_for(width: f64, height: f64) -> Self {
        Self {
            half_w: width / 2.0,
            half_h: height / 2.0,
            radius: (height / 2.0).min(width / 2.0),
        }
    }

    #[inline]
    fn contains(&self, x: f64, y: f64) -> bool {
        let qx = ((x - self.half_w).abs() - (self.half_w - self.radius)).max(0.0);
        let qy = ((y - self.half_h).abs() - (self.half_h - self.radius)).max(0.0);
        qx * qx + qy * qy <= self.radius * self.radius
    }
}

/// Sample a pixel using bilinear interpolation, clamping at the borders.
///
/// `x` and `y` are in pixel-center coordinates (0.0 is the center of the
/// first pixel).
fn sample_bilinear(image: &Raster, x: f64, y: f64) -> [u8; 4] {
    let max_x = (image.width - 1) as f64;
    let max_y = (image.height - 1) as f64;
    let x = x.clamp(0.0, max_x);
    let y = y.clamp(0.0, max_y);

    let x0 = x.floor() as u32;
    let y0 = y.floor() as u32;
    let x1 = (x0 + 1).min(image.width - 1);
    let y1 = (y0 + 1).min(image.height - 1);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let p00 = image.pixel(x0, y0);
    let p10 = image.pixel(x1, y0);
    let p01 = image.pixel(x0, y1);
    let p11 = image.pixel(x1, y1);

    let mut out = [0u8; 4];
    for c in 0..4 {
        let top = p00[c] as f64 * (1.0 - fx) + p10[c] as f64 * fx;
        let bottom = p01[c] as f64 * (1.0 - fx) + p11[c] as f64 * fx;
        out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
    }
    out
}
