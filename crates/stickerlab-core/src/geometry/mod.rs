//! Viewport geometry for the interactive crop.
//!
//! # Coordinate System
//!
//! - Units are viewport points (f64), origin at the viewport's top-left corner
//! - The viewport spans `(0, 0)` to `(width, height)`
//! - Positive offsets move the image right and down
//!
//! The displayed image starts at its aspect-fill size (covering the viewport on
//! both axes, centered). Scale is applied about the viewport center and the
//! offset then translates the result.

mod clamp;

pub use clamp::{clamp_offset, ClampOutcome, Edge, FeedbackEvent};

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Distance below which two edges count as touching.
pub const EDGE_EPSILON: f64 = 1e-9;

/// Width and height in viewport points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True if either side is zero, negative or not finite.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }
}

/// A translation in viewport points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset { dx: 0.0, dy: 0.0 };

    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

impl Sub for Offset {
    type Output = Offset;

    fn sub(self, rhs: Offset) -> Offset {
        Offset::new(self.dx - rhs.dx, self.dy - rhs.dy)
    }
}

/// Axis-aligned rectangle in viewport points.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin with the given size.
    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    #[inline]
    pub fn min_x(&self) -> f64 {
        self.x
    }

    #[inline]
    pub fn min_y(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn translated(&self, by: Offset) -> Rect {
        Rect::new(self.x + by.dx, self.y + by.dy, self.width, self.height)
    }

    /// True if `other` lies inside `self`, edges within [`EDGE_EPSILON`] included.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.min_x() <= other.min_x() + EDGE_EPSILON
            && self.min_y() <= other.min_y() + EDGE_EPSILON
            && self.max_x() + EDGE_EPSILON >= other.max_x()
            && self.max_y() + EDGE_EPSILON >= other.max_y()
    }
}

/// Size of an image scaled to cover `viewport` while keeping its aspect ratio.
///
/// A degenerate image size falls back to the viewport size.
pub fn fill_size(image: Size, viewport: Size) -> Size {
    if image.is_degenerate() {
        return viewport;
    }
    let factor = (viewport.width / image.width).max(viewport.height / image.height);
    Size::new(image.width * factor, image.height * factor)
}

/// On-screen rectangle of an image of `natural` size after scaling about the
/// viewport center and translating by `offset`.
pub fn image_rect(natural: Size, viewport: Size, scale: f64, offset: Offset) -> Rect {
    let width = natural.width * scale;
    let height = natural.height * scale;
    let center_x = viewport.width / 2.0 + offset.dx;
    let center_y = viewport.height / 2.0 + offset.dy;
    Rect::new(center_x - width / 2.0, center_y - height / 2.0, width, height)
}
