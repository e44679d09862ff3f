//! Subject masks and soft-matte compositing.
//!
//! ## Pieces
//!
//! - [`SubjectMask`]: 8-bit coverage raster of the photographic subject
//! - [`SegmentationModel`]: the black-box model that produces instance masks
//! - [`composite`]: blends a foreground over a solid color through a mask
//!
//! ## Algorithm
//!
//! Mask values map linearly to coverage in [0, 1]. Compositing is a soft matte:
//! `output = lerp(background, foreground, coverage)` in premultiplied alpha, so
//! partial coverage blends instead of thresholding.

pub mod composite;
pub mod segment;
mod subject;

pub use composite::{composite, CompositeError};
pub use segment::{InstanceSelection, SegmentationError, SegmentationModel, INSTANCE_SELECTION};
pub use subject::SubjectMask;
