//! WASM bindings for the gesture-driven circular crop.
//!
//! The UI forwards raw gesture samples; the session folds them into a
//! transform, clamps on release and renders the crop on confirm.

use crate::types::{config_from_js, to_js_error, JsRaster};
use stickerlab_core::{
    CropRenderer, CropTransformState, Edge, EditorConfig, FeedbackEvent, GesturePhase, Offset,
    Raster, Size,
};
use wasm_bindgen::prelude::*;

/// Crop session for a single loaded image.
#[wasm_bindgen]
pub struct JsCropSession {
    state: CropTransformState,
    renderer: CropRenderer,
    source: Option<Raster>,
    last_snaps: Vec<Edge>,
}

#[wasm_bindgen]
impl JsCropSession {
    /// Create a session. `settings` follows the `EditorConfig` JSON shape;
    /// pass `undefined` for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(settings: JsValue) -> Result<JsCropSession, JsValue> {
        Ok(Self::with_config(&config_from_js(settings)?))
    }

    /// Load a new source image and reset the transform.
    pub fn load_image(&mut self, image: &JsRaster) {
        let raster = image.as_raster().clone();
        self.state
            .reset(Size::new(raster.width as f64, raster.height as f64));
        self.last_snaps.clear();
        self.source = Some(raster);
    }

    /// Drag update; `dx`/`dy` are the cumulative translation since the drag began.
    pub fn drag_changed(&mut self, dx: f64, dy: f64) {
        self.state.on_drag_changed(Offset::new(dx, dy));
    }

    /// Drag release. Returns the number of edges that snapped back.
    pub fn drag_ended(&mut self) -> u32 {
        let feedback = self.state.on_drag_ended();
        self.record(feedback)
    }

    /// Pinch update with the gesture's current magnification.
    pub fn pinch_changed(&mut self, magnification: f64) {
        self.state.on_pinch_changed(magnification);
    }

    /// Pinch release. Returns the number of edges that snapped back.
    pub fn pinch_ended(&mut self) -> u32 {
        let feedback = self.state.on_pinch_ended();
        self.record(feedback)
    }

    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f64 {
        self.state.scale()
    }

    #[wasm_bindgen(getter)]
    pub fn offset_x(&self) -> f64 {
        self.state.offset().dx
    }

    #[wasm_bindgen(getter)]
    pub fn offset_y(&self) -> f64 {
        self.state.offset().dy
    }

    /// Whether the rule-of-thirds grid should be shown.
    #[wasm_bindgen(getter)]
    pub fn grid_visible(&self) -> bool {
        self.state.grid_visible()
    }

    /// "idle", "dragging" or "scaling".
    #[wasm_bindgen(getter)]
    pub fn phase(&self) -> String {
        phase_label(self.state.phase()).to_string()
    }

    /// Edges corrected by the last gesture release, e.g. `["left", "top"]`.
    pub fn last_snaps(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.snap_labels()).map_err(to_js_error)
    }

    /// Current image rectangle as `{ x, y, width, height }` in viewport points.
    pub fn image_rect(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.state.image_rect()).map_err(to_js_error)
    }

    /// Render the circular crop, ending any gesture still in progress.
    pub fn confirm(&mut self) -> Result<JsRaster, JsValue> {
        let feedback = self.state.end_gesture();
        self.record(feedback);
        self.renderer
            .render(
                self.source.as_ref(),
                self.state.transform(),
                self.state.viewport(),
            )
            .map(|cropped| JsRaster::from_raster(cropped.into_raster()))
            .map_err(to_js_error)
    }
}

impl JsCropSession {
    pub(crate) fn with_config(config: &EditorConfig) -> Self {
        let viewport = config.crop.viewport();
        Self {
            state: CropTransformState::new(viewport, viewport),
            renderer: CropRenderer::from_settings(&config.crop),
            source: None,
            last_snaps: Vec::new(),
        }
    }

    fn record(&mut self, feedback: Vec<FeedbackEvent>) -> u32 {
        self.last_snaps = feedback
            .into_iter()
            .map(|FeedbackEvent::EdgeSnap(edge)| edge)
            .collect();
        self.last_snaps.len() as u32
    }

    fn snap_labels(&self) -> Vec<&'static str> {
        self.last_snaps.iter().map(|&edge| edge_label(edge)).collect()
    }
}

fn phase_label(phase: GesturePhase) -> &'static str {
    match phase {
        GesturePhase::Idle => "idle",
        GesturePhase::Dragging => "dragging",
        GesturePhase::Scaling => "scaling",
    }
}

fn edge_label(edge: Edge) -> &'static str {
    match edge {
        Edge::Left => "left",
        Edge::Top => "top",
        Edge::Right => "right",
        Edge::Bottom => "bottom",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> JsCropSession {
        let mut session = JsCropSession::with_config(&EditorConfig::default());
        session.load_image(&JsRaster::from_raster(Raster::filled(
            700,
            350,
            [0, 0, 0, 255],
        )));
        session
    }

    #[test]
    fn test_drag_within_bounds_does_not_snap() {
        let mut session = session();
        session.drag_changed(100.0, 0.0);
        assert!(session.grid_visible());
        assert_eq!(session.phase(), "dragging");

        assert_eq!(session.drag_ended(), 0);
        assert_eq!(session.offset_x(), 100.0);
        assert!(!session.grid_visible());
    }

    #[test]
    fn test_overscroll_snaps_back() {
        let mut session = session();
        session.drag_changed(0.0, 30.0);
        assert_eq!(session.drag_ended(), 1);
        assert_eq!(session.snap_labels(), vec!["top"]);
        assert_eq!(session.offset_y(), 0.0);
    }

    #[test]
    fn test_pinch_floors_scale() {
        let mut session = session();
        session.pinch_changed(-3.0);
        assert_eq!(session.phase(), "scaling");
        session.pinch_ended();
        assert_eq!(session.scale(), 1.0);
    }

    #[test]
    fn test_confirm_settles_drag() {
        let mut config = EditorConfig::default();
        config.crop.output_width = 35;
        config.crop.output_height = 35;
        config.crop.supersample = 1;
        let mut session = JsCropSession::with_config(&config);
        session.load_image(&JsRaster::from_raster(Raster::filled(70, 35, [0, 0, 0, 255])));

        session.drag_changed(0.0, 30.0);
        let cropped = session.confirm().ok().expect("render");

        assert_eq!(cropped.width(), 35);
        assert_eq!(session.phase(), "idle");
        assert_eq!(session.offset_y(), 0.0);
        assert_eq!(session.snap_labels(), vec!["top"]);
    }

    #[test]
    fn test_load_resets() {
        let mut session = session();
        session.pinch_changed(1.5);
        session.pinch_ended();
        session.drag_changed(0.0, 30.0);
        session.drag_ended();

        session.load_image(&JsRaster::from_raster(Raster::filled(10, 10, [0; 4])));
        assert_eq!(session.scale(), 1.0);
        assert_eq!((session.offset_x(), session.offset_y()), (0.0, 0.0));
        assert!(session.snap_labels().is_empty());
    }
}
