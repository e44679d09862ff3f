//! Single-channel subject coverage raster.

use crate::raster::RasterError;

/// Greyscale mask of the dominant subject, same extent as its source image.
///
/// A value of 0 is background and 255 is fully subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectMask {
    pub width: u32,
    pub height: u32,
    /// One byte per pixel, row-major.
    pub values: Vec<u8>,
}

impl SubjectMask {
    pub fn new(width: u32, height: u32, values: Vec<u8>) -> Self {
        debug_assert_eq!(
            values.len(),
            (width as usize) * (height as usize),
            "Mask buffer size mismatch"
        );
        Self {
            width,
            height,
            values,
        }
    }

    /// Mask with every pixel set to `value`.
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            values: vec![value; (width as usize) * (height as usize)],
        }
    }

    /// Build a mask from per-pixel confidences in [0, 1].
    ///
    /// Out-of-range and NaN confidences are clamped (NaN counts as 0).
    pub fn from_confidences(
        width: u32,
        height: u32,
        confidences: &[f32],
    ) -> Result<Self, RasterError> {
        let expected = (width as usize) * (height as usize);
        if confidences.len() != expected {
            return Err(RasterError::BufferMismatch {
                expected,
                actual: confidences.len(),
            });
        }
        let values = confidences
            .iter()
            .map(|&c| {
                let c = if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) };
                (c * 255.0).round() as u8
            })
            .collect();
        Ok(Self {
            width,
            height,
            values,
        })
    }

    #[inline]
    pub fn extent(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Coverage at pixel index `idx` as a value in [0, 1].
    #[inline]
    pub fn coverage(&self, idx: usize) -> f32 {
        self.values[idx] as f32 / 255.0
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.values.is_empty()
    }

    /// True if the buffer length matches the extent.
    pub fn is_well_formed(&self) -> bool {
        self.values.len() == (self.width as usize) * (self.height as usize)
    }

    /// Per-pixel maximum of two masks. `None` if the extents differ.
    pub fn union(&self, other: &SubjectMask) -> Option<SubjectMask> {
        if self.extent() != other.extent() || self.values.len() != other.values.len() {
            return None;
        }
        let values = self
            .values
            .iter()
            .zip(&other.values)
            .map(|(a, b)| (*a).max(*b))
            .collect();
        Some(SubjectMask {
            width: self.width,
            height: self.height,
            values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_confidences_maps_to_bytes() {
        let mask = SubjectMask::from_confidences(2, 2, &[0.0, 0.5, 1.0, 0.25]).unwrap();
        assert_eq!(mask.values, vec![0, 128, 255, 64]);
    }

    #[test]
    fn test_from_confidences_clamps() {
        let mask = SubjectMask::from_confidences(3, 1, &[-1.0, 2.0, f32::NAN]).unwrap();
        assert_eq!(mask.values, vec![0, 255, 0]);
    }

    #[test]
    fn test_from_confidences_length_mismatch() {
        assert_eq!(
            SubjectMask::from_confidences(2, 2, &[0.0; 3]),
            Err(RasterError::BufferMismatch {
                expected: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn test_coverage() {
        let mask = SubjectMask::new(2, 1, vec![0, 255]);
        assert_eq!(mask.coverage(0), 0.0);
        assert_eq!(mask.coverage(1), 1.0);
    }

    #[test]
    fn test_union_takes_max() {
        let a = SubjectMask::new(3, 1, vec![10, 200, 0]);
        let b = SubjectMask::new(3, 1, vec![50, 100, 0]);
        assert_eq!(a.union(&b).unwrap().values, vec![50, 200, 0]);
    }

    #[test]
    fn test_union_rejects_mismatch() {
        let a = SubjectMask::filled(3, 1, 0);
        let b = SubjectMask::filled(1, 3, 0);
        assert!(a.union(&b).is_none());
    }

    #[test]
    fn test_well_formed() {
        assert!(SubjectMask::filled(4, 4, 7).is_well_formed());
        let bad = SubjectMask {
            width: 4,
            height: 4,
            values: vec![0; 3],
        };
        assert!(!bad.is_well_formed());
    }
}
