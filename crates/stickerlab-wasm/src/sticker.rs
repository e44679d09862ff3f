//! WASM bindings for the background-replacement sticker filter.
//!
//! The segmentation model is a JavaScript callback:
//!
//! ```typescript
//! type Segmenter = (pixels: Uint8Array, width: number, height: number) => Uint8Array[];
//! ```
//!
//! Each returned array is one instance mask with one coverage byte per pixel.
//! Runs are synchronous; the browser keeps them off the UI thread by driving
//! this module from a Web Worker.

use crate::types::{config_from_js, to_js_error, JsRaster};
use js_sys::{Array, Function, Uint8Array};
use stickerlab_core::{
    CroppedImage, FilterError, FilterPipeline, FilterState, FilterToggle, Raster,
    SegmentationError, SegmentationModel, StickerFilter, StickerImage, SubjectMask,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Segmentation model backed by a JS function.
struct JsSegmenter {
    callback: Function,
}

impl SegmentationModel for JsSegmenter {
    fn segment(&self, image: &Raster) -> Result<Vec<SubjectMask>, SegmentationError> {
        let pixels = Uint8Array::from(image.pixels.as_slice());
        let returned = self
            .callback
            .call3(
                &JsValue::NULL,
                &pixels,
                &JsValue::from(image.width),
                &JsValue::from(image.height),
            )
            .map_err(|e| SegmentationError(describe(&e)))?;

        let instances: Array = returned.dyn_into().map_err(|_| {
            SegmentationError("segmenter must return an array of Uint8Array".to_string())
        })?;

        let expected = image.pixel_count();
        instances
            .iter()
            .enumerate()
            .map(|(i, value)| {
                let mask: Uint8Array = value.dyn_into().map_err(|_| {
                    SegmentationError(format!("instance {i} is not a Uint8Array"))
                })?;
                let values = mask.to_vec();
                if values.len() != expected {
                    return Err(SegmentationError(format!(
                        "instance {i} has {} values, expected {expected}",
                        values.len()
                    )));
                }
                Ok(SubjectMask::new(image.width, image.height, values))
            })
            .collect()
    }
}

fn describe(err: &JsValue) -> String {
    err.as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| "segmenter threw".to_string())
}

/// Sticker filter toggle bound to a JS segmenter.
#[wasm_bindgen]
pub struct JsStickerFilter {
    filter: StickerFilter,
    pipeline: FilterPipeline<JsSegmenter>,
}

#[wasm_bindgen]
impl JsStickerFilter {
    /// Create a filter. `settings` follows the `EditorConfig` JSON shape;
    /// pass `undefined` for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(segmenter: Function, settings: JsValue) -> Result<JsStickerFilter, JsValue> {
        let config = config_from_js(settings)?;
        let model = JsSegmenter {
            callback: segmenter,
        };
        Ok(Self {
            filter: StickerFilter::new(),
            pipeline: FilterPipeline::from_settings(model, &config.sticker),
        })
    }

    /// Toggle the filter for `cropped`.
    ///
    /// Returns the sticker when the filter turns on, `undefined` when it turns
    /// off. Throws if the run fails; the filter is then off again.
    pub fn toggle(&mut self, cropped: &JsRaster) -> Result<Option<JsRaster>, JsValue> {
        let cropped = CroppedImage::from_raster(cropped.as_raster().clone());
        toggle_with(&mut self.filter, &self.pipeline, &cropped)
            .map(|sticker| sticker.map(|s| JsRaster::from_raster(s.into_raster())))
            .map_err(to_js_error)
    }

    /// Forget any sticker. Call when a new crop is confirmed.
    pub fn reset(&mut self) {
        self.filter.reset();
    }

    /// "no_filter", "extracting", "compositing" or "filtered".
    #[wasm_bindgen(getter)]
    pub fn state(&self) -> String {
        state_label(self.filter.state()).to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn is_filtered(&self) -> bool {
        self.filter.is_filtered()
    }
}

/// Run one toggle to completion on the current thread.
fn toggle_with<M: SegmentationModel>(
    filter: &mut StickerFilter,
    pipeline: &FilterPipeline<M>,
    cropped: &CroppedImage,
) -> Result<Option<StickerImage>, FilterError> {
    let FilterToggle::Started(ticket) = filter.toggle() else {
        return Ok(None);
    };

    let result = pipeline.run(cropped, |stage| {
        filter.enter_stage(ticket, stage);
    });
    match filter.finish(ticket, result) {
        Some(outcome) => outcome.map(Some),
        None => Ok(None),
    }
}

fn state_label(state: FilterState) -> &'static str {
    match state {
        FilterState::NoFilter => "no_filter",
        FilterState::Extracting => "extracting",
        FilterState::Compositing => "compositing",
        FilterState::Filtered => "filtered",
    }
}
