//! Interactive-side facade tying the crop engine to the sticker filter.
//!
//! An [`EditorSession`] owns the loaded image, one [`CropTransformState`], one
//! [`StickerFilter`] and the background [`FilterWorker`]. All methods are
//! cheap and never block on the model; filter progress is picked up with
//! [`EditorSession::poll`].
//!
//! Reset rules:
//! - loading an image resets the transform and the filter
//! - confirming a crop resets the filter, since any sticker belongs to the
//!   previous crop

use crate::config::EditorConfig;
use crate::crop::{CropRenderer, CropTransformState, CroppedImage, GestureEvent, RenderError};
use crate::geometry::{FeedbackEvent, Offset, Size};
use crate::mask::SegmentationModel;
use crate::pipeline::{
    FilterError, FilterJob, FilterPipeline, FilterState, FilterToggle, FilterWorker,
    StickerFilter, StickerImage, WorkerError, WorkerMessage,
};
use crate::raster::Raster;
use log::{debug, info};
use std::time::{Duration, Instant};

/// An image delivered by the image source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedImage {
    pub raster: Raster,
    /// When the image became available, in milliseconds on the caller's clock.
    pub available_at_ms: u64,
}

impl LoadedImage {
    pub fn new(raster: Raster, available_at_ms: u64) -> Self {
        Self {
            raster,
            available_at_ms,
        }
    }

    fn size(&self) -> Size {
        Size::new(self.raster.width as f64, self.raster.height as f64)
    }
}

/// Something the UI should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The filter moved to a new state (drives the loading indicator).
    StageChanged(FilterState),
    /// A run finished; the sticker replaces the crop on screen.
    StickerReady(StickerImage),
    /// A run failed; the plain crop stays on screen.
    FilterFailed(FilterError),
}

pub struct EditorSession {
    source: Option<LoadedImage>,
    crop: CropTransformState,
    renderer: CropRenderer,
    filter: StickerFilter,
    worker: FilterWorker,
}

impl EditorSession {
    /// Create a session and start its filter worker.
    pub fn new<M>(mut config: EditorConfig, model: M) -> Result<Self, WorkerError>
    where
        M: SegmentationModel + Send + 'static,
    {
        config.sanitize();
        let viewport = config.crop.viewport();
        let pipeline = FilterPipeline::from_settings(model, &config.sticker);

        Ok(Self {
            source: None,
            crop: CropTransformState::new(viewport, viewport),
            renderer: CropRenderer::from_settings(&config.crop),
            filter: StickerFilter::new(),
            worker: FilterWorker::spawn(pipeline)?,
        })
    }

    /// Replace the source image. Resets the crop transform and the filter.
    pub fn load_image(&mut self, image: LoadedImage) {
        info!(
            "Loaded {}x{} image (available at {} ms)",
            image.raster.width, image.raster.height, image.available_at_ms
        );
        self.crop.reset(image.size());
        self.filter.reset();
        self.source = Some(image);
    }

    pub fn source(&self) -> Option<&LoadedImage> {
        self.source.as_ref()
    }

    pub fn crop(&self) -> &CropTransformState {
        &self.crop
    }

    pub fn apply_gesture(&mut self, event: GestureEvent) -> Vec<FeedbackEvent> {
        self.crop.apply(event)
    }

    pub fn drag_changed(&mut self, translation: Offset) -> Vec<FeedbackEvent> {
        self.crop.on_drag_changed(translation)
    }

    pub fn drag_ended(&mut self) -> Vec<FeedbackEvent> {
        self.crop.on_drag_ended()
    }

    pub fn pinch_changed(&mut self, magnification: f64) -> Vec<FeedbackEvent> {
        self.crop.on_pinch_changed(magnification)
    }

    pub fn pinch_ended(&mut self) -> Vec<FeedbackEvent> {
        self.crop.on_pinch_ended()
    }

    /// Render the current crop. A successful render discards any sticker
    /// state tied to the previous crop.
    ///
    /// A gesture still in progress is ended first, so the render always uses
    /// a clamped transform.
    pub fn confirm_crop(&mut self) -> Result<CroppedImage, RenderError> {
        let snaps = self.crop.end_gesture();
        if !snaps.is_empty() {
            debug!("Settled active gesture before confirm ({} snaps)", snaps.len());
        }
        let cropped = self.renderer.render(
            self.source.as_ref().map(|s| &s.raster),
            self.crop.transform(),
            self.crop.viewport(),
        )?;
        info!(
            "Confirmed crop at scale {:.2} ({}x{})",
            self.crop.scale(),
            cropped.width(),
            cropped.height()
        );
        self.filter.reset();
        Ok(cropped)
    }

    /// Turn the sticker filter on or off for `cropped`.
    ///
    /// Turning on queues a run on the worker; the result arrives via
    /// [`poll`](Self::poll).
    pub fn toggle_filter(&mut self, cropped: &CroppedImage) -> Result<FilterToggle, WorkerError> {
        let toggle = self.filter.toggle();
        if let FilterToggle::Started(ticket) = toggle {
            let job = FilterJob {
                ticket,
                image: cropped.clone(),
            };
            if let Err(err) = self.worker.submit(job) {
                self.filter.reset();
                return Err(err);
            }
        }
        Ok(toggle)
    }

    pub fn filter_state(&self) -> FilterState {
        self.filter.state()
    }

    pub fn is_loading(&self) -> bool {
        self.filter.is_loading()
    }

    /// Drain worker progress without blocking.
    pub fn poll(&mut self) -> Vec<SessionEvent> {
        self.worker
            .drain()
            .into_iter()
            .filter_map(|msg| self.handle(msg))
            .collect()
    }

    /// Block up to `timeout` for the next event.
    pub fn wait_event(&mut self, timeout: Duration) -> Option<SessionEvent> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.checked_duration_since(Instant::now())?;
            let msg = self.worker.recv_timeout(remaining)?;
            if let Some(event) = self.handle(msg) {
                return Some(event);
            }
        }
    }

    fn handle(&mut self, msg: WorkerMessage) -> Option<SessionEvent> {
        match msg {
            WorkerMessage::Stage { ticket, stage } => self
                .filter
                .enter_stage(ticket, stage)
                .then(|| SessionEvent::StageChanged(self.filter.state())),
            WorkerMessage::Finished { ticket, result } => {
                let result = self.filter.finish(ticket, result)?;
                debug!("Filter now {:?}", self.filter.state());
                Some(match result {
                    Ok(sticker) => SessionEvent::StickerReady(sticker),
                    Err(err) => SessionEvent::FilterFailed(err),
                })
            }
        }
    }
}
