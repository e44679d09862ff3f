//! Gesture reducer for the crop viewport.

use crate::geometry::{
    clamp_offset, fill_size, image_rect, FeedbackEvent, Offset, Rect, Size,
};
use serde::{Deserialize, Serialize};

/// Minimum scale: the image never shrinks below its viewport-filling size.
pub const MIN_SCALE: f64 = 1.0;

/// Maximum scale. Keeps the scaled image size finite for any source aspect.
pub const MAX_SCALE: f64 = 1_000.0;

/// Scale and translation applied to the displayed image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Zoom factor relative to the aspect-fill size (always >= 1.0).
    pub scale: f64,
    /// Translation in viewport points.
    pub offset: Offset,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        scale: MIN_SCALE,
        offset: Offset::ZERO,
    };
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Which gesture currently owns the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GesturePhase {
    #[default]
    Idle,
    Dragging,
    Scaling,
}

/// A single gesture sample from the UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Drag moved; `translation` is cumulative since the drag started.
    DragChanged { translation: Offset },
    DragEnded,
    /// Pinch moved; `magnification` is the platform factor, 1.0 at pinch start.
    PinchChanged { magnification: f64 },
    PinchEnded,
}

/// Crop transform for one image in the viewport.
///
/// Gesture callbacks are reducer calls: [`reduce`](Self::reduce) takes the
/// state and an event and returns the next state plus any edge-snap feedback.
/// Drag and pinch are mutually exclusive; samples for the other gesture are
/// ignored until the active one ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropTransformState {
    viewport: Size,
    natural: Size,
    phase: GesturePhase,
    scale: f64,
    /// Scale carried over from previous pinches, added to the next magnification.
    scale_base: f64,
    offset: Offset,
    committed_offset: Offset,
}

impl CropTransformState {
    /// Fresh state for an image of `image_size` pixels in `viewport`.
    pub fn new(viewport: Size, image_size: Size) -> Self {
        Self {
            viewport,
            natural: fill_size(image_size, viewport),
            phase: GesturePhase::Idle,
            scale: MIN_SCALE,
            scale_base: 0.0,
            offset: Offset::ZERO,
            committed_offset: Offset::ZERO,
        }
    }

    /// Reset for a newly loaded image.
    pub fn reset(&mut self, image_size: Size) {
        *self = Self::new(self.viewport, image_size);
    }

    /// Apply one gesture event, returning the next state and any feedback.
    pub fn reduce(mut self, event: GestureEvent) -> (Self, Vec<FeedbackEvent>) {
        let feedback = match event {
            GestureEvent::DragChanged { translation } => {
                let moved = translation + self.committed_offset;
                if self.phase != GesturePhase::Scaling && moved.dx.is_finite() && moved.dy.is_finite()
                {
                    self.phase = GesturePhase::Dragging;
                    self.offset = moved;
                }
                Vec::new()
            }
            GestureEvent::DragEnded => {
                if self.phase == GesturePhase::Dragging {
                    self.settle()
                } else {
                    Vec::new()
                }
            }
            GestureEvent::PinchChanged { magnification } => {
                if self.phase != GesturePhase::Dragging {
                    self.phase = GesturePhase::Scaling;
                    self.scale = bound_scale(magnification + self.scale_base);
                }
                Vec::new()
            }
            GestureEvent::PinchEnded => {
                if self.phase == GesturePhase::Scaling {
                    if self.scale < MIN_SCALE {
                        self.scale = MIN_SCALE;
                        self.scale_base = 0.0;
                    } else {
                        self.scale_base = self.scale - MIN_SCALE;
                    }
                    self.settle()
                } else {
                    Vec::new()
                }
            }
        };
        (self, feedback)
    }

    /// In-place form of [`reduce`](Self::reduce).
    pub fn apply(&mut self, event: GestureEvent) -> Vec<FeedbackEvent> {
        let (next, feedback) = self.reduce(event);
        *self = next;
        feedback
    }

    pub fn on_drag_changed(&mut self, translation: Offset) -> Vec<FeedbackEvent> {
        self.apply(GestureEvent::DragChanged { translation })
    }

    pub fn on_drag_ended(&mut self) -> Vec<FeedbackEvent> {
        self.apply(GestureEvent::DragEnded)
    }

    pub fn on_pinch_changed(&mut self, magnification: f64) -> Vec<FeedbackEvent> {
        self.apply(GestureEvent::PinchChanged { magnification })
    }

    pub fn on_pinch_ended(&mut self) -> Vec<FeedbackEvent> {
        self.apply(GestureEvent::PinchEnded)
    }

    /// End whichever gesture is active. No-op when idle.
    pub fn end_gesture(&mut self) -> Vec<FeedbackEvent> {
        match self.phase {
            GesturePhase::Idle => Vec::new(),
            GesturePhase::Dragging => self.on_drag_ended(),
            GesturePhase::Scaling => self.on_pinch_ended(),
        }
    }

    /// Clamp the working offset, commit it and return to idle.
    fn settle(&mut self) -> Vec<FeedbackEvent> {
        let outcome = clamp_offset(self.image_rect(), self.viewport_rect(), self.offset);
        self.offset = outcome.offset;
        self.committed_offset = outcome.offset;
        self.phase = GesturePhase::Idle;
        outcome.feedback().collect()
    }

    pub fn phase(&self) -> GesturePhase {
        self.phase
    }

    /// Whether the rule-of-thirds grid should be drawn.
    pub fn grid_visible(&self) -> bool {
        self.phase != GesturePhase::Idle
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn offset(&self) -> Offset {
        self.offset
    }

    pub fn transform(&self) -> Transform {
        Transform {
            scale: self.scale,
            offset: self.offset,
        }
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn viewport_rect(&self) -> Rect {
        Rect::from_size(self.viewport)
    }

    /// Current on-screen rectangle of the image.
    pub fn image_rect(&self) -> Rect {
        image_rect(self.natural, self.viewport, self.scale, self.offset)
    }
}

/// Clamp into `MIN_SCALE..=MAX_SCALE`; NaN and infinities floor to `MIN_SCALE`.
#[inline]
fn bound_scale(scale: f64) -> f64 {
    if scale.is_finite() {
        scale.clamp(MIN_SCALE, MAX_SCALE)
    } else {
        MIN_SCALE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Edge;

    fn square_state() -> CropTransformState {
        CropTransformState::new(Size::new(350.0, 350.0), Size::new(1000.0, 1000.0))
    }

    #[test]
    fn test_initial_state() {
        let state = square_state();
        assert_eq!(state.phase(), GesturePhase::Idle);
        assert_eq!(state.transform(), Transform::IDENTITY);
        assert!(!state.grid_visible());
        assert_eq!(state.image_rect(), Rect::new(0.0, 0.0, 350.0, 350.0));
    }

    #[test]
    fn test_drag_translation_is_cumulative() {
        // 700x350 natural size: 175pt of horizontal slack on each side
        let mut state =
            CropTransformState::new(Size::new(350.0, 350.0), Size::new(2000.0, 1000.0));

        state.on_drag_changed(Offset::new(-10.0, 0.0));
        state.on_drag_changed(Offset::new(-40.0, 0.0));
        assert_eq!(state.offset(), Offset::new(-40.0, 0.0));
        assert!(state.grid_visible());

        assert!(state.on_drag_ended().is_empty());
        assert_eq!(state.phase(), GesturePhase::Idle);

        // Second drag starts from the committed offset
        state.on_drag_changed(Offset::new(-20.0, 0.0));
        assert_eq!(state.offset(), Offset::new(-60.0, 0.0));
    }

    #[test]
    fn test_drag_overscroll_allowed_until_release() {
        let mut state = square_state();
        state.on_drag_changed(Offset::new(50.0, 0.0));
        assert_eq!(state.offset(), Offset::new(50.0, 0.0));

        let feedback = state.on_drag_ended();
        assert_eq!(feedback, vec![FeedbackEvent::EdgeSnap(Edge::Left)]);
        assert_eq!(state.offset(), Offset::ZERO);
        assert!(state.image_rect().contains_rect(&state.viewport_rect()));
    }

    #[test]
    fn test_pinch_uses_scale_base() {
        let mut state = square_state();

        state.on_pinch_changed(1.5);
        assert_eq!(state.scale(), 1.5);
        state.on_pinch_ended();

        // Next pinch starts at magnification 1.0 and adds the 0.5 carried over
        state.on_pinch_changed(1.0);
        assert_eq!(state.scale(), 1.5);
        state.on_pinch_changed(1.25);
        assert_eq!(state.scale(), 1.75);
    }

    #[test]
    fn test_pinch_floors_at_one() {
        let mut state = square_state();
        state.on_pinch_changed(0.4);
        assert_eq!(state.scale(), MIN_SCALE);

        state.on_pinch_ended();
        assert_eq!(state.scale(), MIN_SCALE);

        state.on_pinch_changed(1.0);
        assert_eq!(state.scale(), MIN_SCALE);
    }

    #[test]
    fn test_pinch_nan_floors_at_one() {
        let mut state = square_state();
        state.on_pinch_changed(f64::NAN);
        state.on_pinch_ended();
        assert_eq!(state.scale(), MIN_SCALE);
    }

    #[test]
    fn test_pinch_infinite_floors_at_one() {
        let mut state = square_state();
        state.on_pinch_changed(f64::INFINITY);
        state.on_pinch_ended();
        assert_eq!(state.scale(), MIN_SCALE);
        assert!(state.image_rect().contains_rect(&state.viewport_rect()));

        // The scale base is not poisoned for later pinches
        state.on_pinch_changed(1.5);
        assert_eq!(state.scale(), 1.5);
    }

    #[test]
    fn test_huge_pinch_caps_scale() {
        let mut state = square_state();
        state.on_pinch_changed(1e308);
        state.on_pinch_ended();
        assert_eq!(state.scale(), MAX_SCALE);

        let rect = state.image_rect();
        assert!(rect.width.is_finite() && rect.height.is_finite());
        assert!(rect.contains_rect(&state.viewport_rect()));
    }

    #[test]
    fn test_non_finite_drag_is_ignored() {
        let mut state = square_state();
        state.on_drag_changed(Offset::new(f64::INFINITY, 0.0));
        state.on_drag_changed(Offset::new(0.0, f64::NAN));
        assert_eq!(state.offset(), Offset::ZERO);
        assert_eq!(state.phase(), GesturePhase::Idle);
    }

    #[test]
    fn test_zoom_out_reclamps_offset() {
        let mut state = square_state();

        state.on_pinch_changed(2.0);
        state.on_pinch_ended();

        // At 2x there is 175pt of slack on each side
        state.on_drag_changed(Offset::new(150.0, 150.0));
        assert!(state.on_drag_ended().is_empty());

        // Pinching back to 1x leaves gaps that are closed on release
        state.on_pinch_changed(0.0);
        let feedback = state.on_pinch_ended();
        assert_eq!(
            feedback,
            vec![
                FeedbackEvent::EdgeSnap(Edge::Left),
                FeedbackEvent::EdgeSnap(Edge::Top)
            ]
        );
        assert_eq!(state.offset(), Offset::ZERO);
        assert_eq!(state.scale(), MIN_SCALE);
    }

    #[test]
    fn test_gestures_are_mutually_exclusive() {
        let mut state = square_state();

        state.on_drag_changed(Offset::new(5.0, 5.0));
        state.on_pinch_changed(3.0);
        assert_eq!(state.scale(), MIN_SCALE, "pinch ignored while dragging");
        state.on_pinch_ended();
        assert_eq!(state.phase(), GesturePhase::Dragging);
        state.on_drag_ended();

        state.on_pinch_changed(2.0);
        state.on_drag_changed(Offset::new(80.0, 0.0));
        assert_eq!(state.offset(), Offset::ZERO, "drag ignored while scaling");
        state.on_drag_ended();
        assert_eq!(state.phase(), GesturePhase::Scaling);
    }

    #[test]
    fn test_end_without_start_is_ignored() {
        let mut state = square_state();
        assert!(state.on_drag_ended().is_empty());
        assert!(state.on_pinch_ended().is_empty());
        assert_eq!(state, square_state());
    }

    #[test]
    fn test_end_gesture_settles_active_gesture() {
        let mut state = square_state();
        assert!(state.end_gesture().is_empty());

        state.on_drag_changed(Offset::new(0.0, -40.0));
        assert_eq!(state.end_gesture(), vec![FeedbackEvent::EdgeSnap(Edge::Bottom)]);
        assert_eq!(state.phase(), GesturePhase::Idle);
        assert_eq!(state.offset(), Offset::ZERO);

        state.on_pinch_changed(0.2);
        assert!(state.end_gesture().is_empty());
        assert_eq!(state.phase(), GesturePhase::Idle);
        assert_eq!(state.scale(), MIN_SCALE);
    }

    #[test]
    fn test_reduce_is_pure() {
        let state = square_state();
        let (next, _) = state.reduce(GestureEvent::DragChanged {
            translation: Offset::new(3.0, 4.0),
        });
        assert_eq!(state.offset(), Offset::ZERO);
        assert_eq!(next.offset(), Offset::new(3.0, 4.0));
    }

    #[test]
    fn test_reset_for_new_image() {
        let mut state = square_state();
        state.on_pinch_changed(2.5);
        state.on_pinch_ended();
        state.on_drag_changed(Offset::new(-30.0, 10.0));
        state.on_drag_ended();

        state.reset(Size::new(640.0, 480.0));
        assert_eq!(state.transform(), Transform::IDENTITY);
        assert_eq!(state.phase(), GesturePhase::Idle);

        // Scale base was cleared too
        state.on_pinch_changed(1.0);
        assert_eq!(state.scale(), MIN_SCALE);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
