//! Stickerlab Core - circle crop and sticker engine
//!
//! This crate provides the core functionality behind the circle-sticker
//! editor: the interactive crop transform, the circular crop renderer, and the
//! background-replacement filter that composites the photographic subject
//! onto a solid color.
//!
//! The segmentation model itself is supplied by the host through
//! [`SegmentationModel`].

pub mod config;
pub mod crop;
pub mod encode;
pub mod geometry;
pub mod mask;
pub mod pipeline;
pub mod raster;
pub mod session;

pub use config::{ConfigError, CropSettings, EditorConfig, StickerSettings};
pub use crop::{
    CropRenderer, CropTransformState, CroppedImage, GestureEvent, GesturePhase, RenderError,
    Transform,
};
pub use encode::{encode_png, EncodeError};
pub use geometry::{clamp_offset, ClampOutcome, Edge, FeedbackEvent, Offset, Rect, Size};
pub use mask::{
    composite, CompositeError, InstanceSelection, SegmentationError, SegmentationModel,
    SubjectMask, INSTANCE_SELECTION,
};
pub use pipeline::{
    FilterError, FilterPipeline, FilterStage, FilterState, FilterToggle, RunTicket,
    StickerFilter, StickerImage,
};
pub use raster::{FilterType, Raster, SolidColor};
pub use session::{EditorSession, LoadedImage, SessionEvent};
