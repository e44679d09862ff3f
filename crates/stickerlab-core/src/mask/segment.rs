//! Segmentation model seam.
//!
//! The subject model is an external collaborator. It receives the cropped
//! image and returns zero or more instance masks. Which instance becomes the
//! sticker subject is decided by [`InstanceSelection`].

use super::SubjectMask;
use crate::raster::Raster;
use log::warn;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Failure reported by a segmentation model.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Segmentation model error: {0}")]
pub struct SegmentationError(pub String);

/// A foreground-instance segmentation model.
pub trait SegmentationModel {
    /// Segment `image` into instance masks of the same extent.
    ///
    /// An empty list means no subject was found.
    fn segment(&self, image: &Raster) -> Result<Vec<SubjectMask>, SegmentationError>;
}

impl<M: SegmentationModel + ?Sized> SegmentationModel for Arc<M> {
    fn segment(&self, image: &Raster) -> Result<Vec<SubjectMask>, SegmentationError> {
        (**self).segment(image)
    }
}

impl<M: SegmentationModel + ?Sized> SegmentationModel for Box<M> {
    fn segment(&self, image: &Raster) -> Result<Vec<SubjectMask>, SegmentationError> {
        (**self).segment(image)
    }
}

/// How to reduce a list of instance masks to one subject mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceSelection {
    /// Use the first instance the model reports.
    #[default]
    First,
    /// Per-pixel maximum over all instances with the first instance's extent.
    Union,
}

/// Selection policy used by default.
pub const INSTANCE_SELECTION: InstanceSelection = InstanceSelection::First;

impl InstanceSelection {
    /// Pick the subject mask, or `None` if there are no instances.
    pub fn select(self, instances: Vec<SubjectMask>) -> Option<SubjectMask> {
        let mut instances = instances.into_iter();
        let first = instances.next()?;
        match self {
            InstanceSelection::First => Some(first),
            InstanceSelection::Union => Some(instances.fold(first, |acc, next| {
                acc.union(&next).unwrap_or_else(|| {
                    warn!(
                        "Skipping {}x{} instance mask in union with {}x{}",
                        next.width, next.height, acc.width, acc.height
                    );
                    acc
                })
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedModel(Vec<SubjectMask>);

    impl SegmentationModel for FixedModel {
        fn segment(&self, _image: &Raster) -> Result<Vec<SubjectMask>, SegmentationError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_default_policy_is_first() {
        assert_eq!(InstanceSelection::default(), INSTANCE_SELECTION);
        assert_eq!(INSTANCE_SELECTION, InstanceSelection::First);
    }

    #[test]
    fn test_select_empty() {
        assert!(InstanceSelection::First.select(vec![]).is_none());
        assert!(InstanceSelection::Union.select(vec![]).is_none());
    }

    #[test]
    fn test_select_first() {
        let a = SubjectMask::new(2, 1, vec![255, 0]);
        let b = SubjectMask::new(2, 1, vec![0, 255]);
        assert_eq!(InstanceSelection::First.select(vec![a.clone(), b]), Some(a));
    }

    #[test]
    fn test_select_union() {
        let a = SubjectMask::new(2, 1, vec![255, 0]);
        let b = SubjectMask::new(2, 1, vec![0, 200]);
        let odd = SubjectMask::filled(1, 1, 255);
        let union = InstanceSelection::Union.select(vec![a, odd, b]).unwrap();
        assert_eq!(union.values, vec![255, 200]);
    }

    #[test]
    fn test_shared_model_delegates() {
        let model: Arc<dyn SegmentationModel> =
            Arc::new(FixedModel(vec![SubjectMask::filled(1, 1, 9)]));
        let image = Raster::filled(1, 1, [0, 0, 0, 255]);
        assert_eq!(model.segment(&image).unwrap().len(), 1);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&InstanceSelection::Union).unwrap();
        assert_eq!(json, "\"union\"");
    }
}
