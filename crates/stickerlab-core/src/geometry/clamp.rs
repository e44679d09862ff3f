//! Edge clamping that keeps the viewport fully covered by the image.
//!
//! [`clamp_offset`] inspects the four edges of the image rectangle against the
//! viewport. Every edge that leaves a gap produces a correction to the offset
//! and a [`FeedbackEvent`] the UI can turn into a haptic tick.
//!
//! The four checks are independent and run against the rectangle as given, so a
//! corner overscroll corrects two edges in one call.

use super::{Offset, Rect, EDGE_EPSILON};

/// A viewport edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    Left,
    Top,
    Right,
    Bottom,
}

/// Notification emitted when the clamp snaps an edge back into place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackEvent {
    EdgeSnap(Edge),
}

/// Result of a clamp: the corrected offset and the edges that were corrected.
#[derive(Debug, Clone, PartialEq)]
pub struct ClampOutcome {
    pub offset: Offset,
    pub corrections: Vec<Edge>,
}

impl ClampOutcome {
    /// True when the input offset was already valid.
    pub fn is_noop(&self) -> bool {
        self.corrections.is_empty()
    }

    /// One feedback event per corrected edge.
    pub fn feedback(&self) -> impl Iterator<Item = FeedbackEvent> + '_ {
        self.corrections.iter().copied().map(FeedbackEvent::EdgeSnap)
    }
}

/// Compute the offset that closes any gap between `image` and `viewport`.
///
/// `image` must be the rectangle produced by `offset`; the returned offset
/// moves it by exactly the correction. When the image is smaller than the
/// viewport along an axis it is centered on that axis instead.
pub fn clamp_offset(image: Rect, viewport: Rect, offset: Offset) -> ClampOutcome {
    let mut corrections = Vec::new();

    let dx = clamp_axis(
        image.min_x(),
        image.max_x(),
        viewport.min_x(),
        viewport.max_x(),
        (Edge::Left, Edge::Right),
        &mut corrections,
    );
    let dy = clamp_axis(
        image.min_y(),
        image.max_y(),
        viewport.min_y(),
        viewport.max_y(),
        (Edge::Top, Edge::Bottom),
        &mut corrections,
    );

    ClampOutcome {
        offset: Offset::new(offset.dx + dx, offset.dy + dy),
        corrections,
    }
}

fn clamp_axis(
    image_min: f64,
    image_max: f64,
    view_min: f64,
    view_max: f64,
    (low_edge, high_edge): (Edge, Edge),
    corrections: &mut Vec<Edge>,
) -> f64 {
    // Narrower than the viewport: no placement covers it, so center instead
    if (image_max - image_min) + EDGE_EPSILON < view_max - view_min {
        let delta = ((view_min + view_max) - (image_min + image_max)) / 2.0;
        if delta.abs() <= EDGE_EPSILON {
            return 0.0;
        }
        corrections.push(low_edge);
        corrections.push(high_edge);
        return delta;
    }

    let low_gap = image_min - view_min;
    let high_gap = view_max - image_max;

    if low_gap > EDGE_EPSILON {
        corrections.push(low_edge);
        -low_gap
    } else if high_gap > EDGE_EPSILON {
        corrections.push(high_edge);
        high_gap
    } else {
        0.0
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Viewport sizes in points.
    fn viewport_strategy() -> impl Strategy<Value = Rect> {
        (50.0f64..=800.0, 50.0f64..=800.0).prop_map(|(w, h)| Rect::new(0.0, 0.0, w, h))
    }

    proptest! {
        /// Property: An image that covers the viewport keeps its offset.
        #[test]
        fn prop_covering_rect_unchanged(
            vp in viewport_strategy(),
            left_overhang in 0.0f64..=300.0,
            top_overhang in 0.0f64..=300.0,
            extra_w in 0.0f64..=300.0,
            extra_h in 0.0f64..=300.0,
            dx in -500.0f64..=500.0,
            dy in -500.0f64..=500.0,
        ) {
            let image = Rect::new(
                -left_overhang,
                -top_overhang,
                vp.width + left_overhang + extra_w,
                vp.height + top_overhang + extra_h,
            );
            let offset = Offset::new(dx, dy);
            let outcome = clamp_offset(image, vp, offset);

            prop_assert_eq!(outcome.offset, offset);
            prop_assert!(outcome.is_noop());
        }

        /// Property: A gap on one side moves only that axis and closes the gap.
        #[test]
        fn prop_single_gap_closes(
            vp in viewport_strategy(),
            gap in 0.5f64..=200.0,
            overhang in 0.0f64..=200.0,
            side in 0usize..4,
        ) {
            // Image larger than the viewport on both axes, shifted to open one gap
            let w = vp.width + gap + overhang;
            let h = vp.height + gap + overhang;
            let (x, y) = match side {
                0 => (gap, -overhang / 2.0 - gap / 2.0),            // left gap
                1 => (-overhang / 2.0 - gap / 2.0, gap),            // top gap
                2 => (vp.width - w - gap, -overhang / 2.0 - gap / 2.0), // right gap
                _ => (-overhang / 2.0 - gap / 2.0, vp.height - h - gap), // bottom gap
            };
            let image = Rect::new(x, y, w, h);
            let outcome = clamp_offset(image, vp, Offset::ZERO);
            let moved = image.translated(outcome.offset);

            prop_assert_eq!(outcome.corrections.len(), 1);
            match side {
                0 => {
                    prop_assert_eq!(outcome.offset.dy, 0.0);
                    prop_assert!((moved.min_x() - vp.min_x()).abs() < 1e-6);
                }
                1 => {
                    prop_assert_eq!(outcome.offset.dx, 0.0);
                    prop_assert!((moved.min_y() - vp.min_y()).abs() < 1e-6);
                }
                2 => {
                    prop_assert_eq!(outcome.offset.dy, 0.0);
                    prop_assert!((moved.max_x() - vp.max_x()).abs() < 1e-6);
                }
                _ => {
                    prop_assert_eq!(outcome.offset.dx, 0.0);
                    prop_assert!((moved.max_y() - vp.max_y()).abs() < 1e-6);
                }
            }
        }

        /// Property: Clamping the corrected rectangle is a no-op.
        #[test]
        fn prop_clamp_is_idempotent(
            vp in viewport_strategy(),
            x in -400.0f64..=400.0,
            y in -400.0f64..=400.0,
            w in 10.0f64..=1200.0,
            h in 10.0f64..=1200.0,
        ) {
            let image = Rect::new(x, y, w, h);
            let first = clamp_offset(image, vp, Offset::ZERO);
            let second = clamp_offset(image.translated(first.offset), vp, first.offset);

            prop_assert!(second.is_noop(), "second pass corrected {:?}", second.corrections);
            prop_assert_eq!(second.offset, first.offset);
        }

        /// Property: A corrected image at least as large as the viewport covers it.
        #[test]
        fn prop_corrected_rect_covers_viewport(
            vp in viewport_strategy(),
            x in -400.0f64..=400.0,
            y in -400.0f64..=400.0,
            extra_w in 0.0f64..=600.0,
            extra_h in 0.0f64..=600.0,
        ) {
            let image = Rect::new(x, y, vp.width + extra_w, vp.height + extra_h);
            let outcome = clamp_offset(image, vp, Offset::ZERO);

            prop_assert!(image.translated(outcome.offset).contains_rect(&vp));
        }
    }
}
