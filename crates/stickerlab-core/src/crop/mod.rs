//! Interactive circular crop: gesture state and final rasterization.
//!
//! # Flow
//!
//! 1. [`CropTransformState`] folds drag and pinch gestures into a [`Transform`]
//! 2. On gesture end the offset is clamped so the viewport stays covered
//! 3. On confirm, [`CropRenderer`] rasterizes the transformed image into a
//!    circular [`CroppedImage`] of fixed output size
//!
//! Overscroll is allowed while a gesture is active and only corrected on
//! release.

mod render;
mod state;

pub use render::{CropRenderer, CroppedImage, RenderError};
pub use state::{CropTransformState, GestureEvent, GesturePhase, Transform, MAX_SCALE, MIN_SCALE};
