//! Background-replacement filter: segment the subject, composite it onto a
//! solid color, finalize the sticker.
//!
//! # Stages
//!
//! 1. **Extract**: run the [`SegmentationModel`] on the cropped image and pick
//!    the subject mask according to the [`InstanceSelection`] policy
//! 2. **Composite**: soft-matte the crop over the background color
//! 3. **Render**: validate the composited raster into a [`StickerImage`]
//!
//! [`FilterPipeline::run`] executes the stages synchronously. [`FilterWorker`]
//! runs them on a dedicated thread, and [`StickerFilter`] tracks the toggle
//! state on the interactive side, discarding results from superseded runs.

mod state;
mod worker;

pub use state::{FilterState, FilterToggle, RunTicket, StickerFilter};
pub use worker::{FilterJob, FilterWorker, WorkerError, WorkerMessage};

use crate::config::StickerSettings;
use crate::crop::CroppedImage;
use crate::mask::{
    composite, CompositeError, InstanceSelection, SegmentationModel, SubjectMask,
    INSTANCE_SELECTION,
};
use crate::raster::{Raster, SolidColor};
use log::debug;
use thiserror::Error;

/// Errors that abort a filter run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The model found no subject instance.
    #[error("No subject found in image")]
    NoSubjectFound,

    /// The model could not be invoked or failed while running.
    #[error("Subject extraction failed: {0}")]
    ExtractionFailed(String),

    /// The mask does not match the cropped image.
    #[error(
        "Mask is {mask_width}x{mask_height} but image is {base_width}x{base_height}"
    )]
    DimensionMismatch {
        base_width: u32,
        base_height: u32,
        mask_width: u32,
        mask_height: u32,
    },

    /// The composited raster could not be finalized.
    #[error("Failed to render sticker: {0}")]
    RenderFailed(String),
}

impl From<CompositeError> for FilterError {
    fn from(err: CompositeError) -> Self {
        match err {
            CompositeError::DimensionMismatch {
                base_width,
                base_height,
                mask_width,
                mask_height,
            } => FilterError::DimensionMismatch {
                base_width,
                base_height,
                mask_width,
                mask_height,
            },
            CompositeError::InvalidBuffer(msg) => FilterError::RenderFailed(msg),
        }
    }
}

/// Stage a run is entering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterStage {
    Extracting,
    Compositing,
}

/// Final composited sticker. Owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StickerImage(Raster);

impl StickerImage {
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

/// The three filter stages bound to a model and a background color.
#[derive(Debug, Clone)]
pub struct FilterPipeline<M> {
    model: M,
    background: SolidColor,
    selection: InstanceSelection,
}

impl<M: SegmentationModel> FilterPipeline<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            background: SolidColor::default(),
            selection: INSTANCE_SELECTION,
        }
    }

    pub fn from_settings(model: M, settings: &StickerSettings) -> Self {
        Self {
            model,
            background: settings.background,
            selection: settings.selection,
        }
    }

    pub fn with_background(mut self, background: SolidColor) -> Self {
        self.background = background;
        self
    }

    pub fn with_selection(mut self, selection: InstanceSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn background(&self) -> SolidColor {
        self.background
    }

    /// Run the model and select the subject mask.
    ///
    /// # Errors
    ///
    /// `FilterError::NoSubjectFound` for an empty instance list,
    /// `FilterError::ExtractionFailed` when the model reports an error.
    pub fn extract(&self, cropped: &CroppedImage) -> Result<SubjectMask, FilterError> {
        let instances = self
            .model
            .segment(cropped.raster())
            .map_err(|e| FilterError::ExtractionFailed(e.to_string()))?;
        debug!("Segmentation returned {} instance(s)", instances.len());

        self.selection
            .select(instances)
            .ok_or(FilterError::NoSubjectFound)
    }

    /// Soft-matte the crop over the background color.
    pub fn composite(
        &self,
        cropped: &CroppedImage,
        mask: &SubjectMask,
    ) -> Result<Raster, FilterError> {
        Ok(composite(cropped.raster(), mask, self.background)?)
    }

    /// Finalize a composited raster into a displayable sticker.
    ///
    /// # Errors
    ///
    /// `FilterError::RenderFailed` if the raster is empty or its buffer does
    /// not match its extent.
    pub fn render(raster: Raster) -> Result<StickerImage, FilterError> {
        raster
            .validate()
            .map_err(|e| FilterError::RenderFailed(e.to_string()))?;
        Ok(StickerImage(raster))
    }

    /// Run all stages, reporting each stage as it starts.
    pub fn run(
        &self,
        cropped: &CroppedImage,
        mut on_stage: impl FnMut(FilterStage),
    ) -> Result<StickerImage, FilterError> {
        on_stage(FilterStage::Extracting);
        let mask = self.extract(cropped)?;

        on_stage(FilterStage::Compositing);
        let raster = self.composite(cropped, &mask)?;

        Self::render(raster)
    }
}
