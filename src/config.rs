//! NMS configuration.

use std::fmt;
use std::str::FromStr;

use crate::util::{NmsError, NmsResult};

/// Score adjustment applied to candidates overlapping a kept box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SoftNmsMethod {
    /// Hard NMS: overlapping candidates are discarded.
    #[default]
    None,
    /// Scores above the IoU threshold are scaled by `1 - IoU`.
    Linear,
    /// All scores are scaled by `exp(-IoU^2 / sigma)`.
    Gaussian,
}

impl SoftNmsMethod {
    /// Returns the configuration name of the method.
    pub fn as_str(&self) -> &'static str {
        match self {
            SoftNmsMethod::None => "none",
            SoftNmsMethod::Linear => "linear",
            SoftNmsMethod::Gaussian => "gaussian",
        }
    }
}

impl FromStr for SoftNmsMethod {
    type Err = NmsError;

    fn from_str(name: &str) -> NmsResult<Self> {
        match name {
            "none" => Ok(SoftNmsMethod::None),
            "linear" => Ok(SoftNmsMethod::Linear),
            "gaussian" => Ok(SoftNmsMethod::Gaussian),
            _ => Err(NmsError::InvalidConfig(
                "soft_nms_method must be one of none, linear, gaussian",
            )),
        }
    }
}

impl fmt::Display for SoftNmsMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a batched NMS call.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NmsConfig {
    /// Minimum score for a RoI to become a candidate.
    pub min_score: f32,
    /// Maximum IoU between kept boxes of the same class (hard and linear modes).
    pub max_iou: f32,
    /// Maximum detections per image over all classes; 0 means unbounded.
    pub max_objects: usize,
    /// Maximum detections per class; 0 derives it from `max_objects`.
    pub max_objects_per_class: usize,
    /// Score adjustment policy.
    pub soft_nms_method: SoftNmsMethod,
    /// Gaussian soft-NMS spread.
    pub soft_nms_sigma: f32,
    /// Minimum score for a re-scored candidate to stay in the pool.
    pub soft_nms_min_score: f32,
    /// Process images in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for NmsConfig {
    fn default() -> Self {
        Self {
            min_score: 0.05,
            max_iou: 0.3,
            max_objects: 100,
            max_objects_per_class: 0,
            soft_nms_method: SoftNmsMethod::None,
            soft_nms_sigma: 0.5,
            soft_nms_min_score: 0.0,
            parallel: false,
        }
    }
}

impl NmsConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> NmsResult<()> {
        if !self.min_score.is_finite() {
            return Err(NmsError::InvalidConfig("min_score must be finite"));
        }
        if !self.max_iou.is_finite() || self.max_iou < 0.0 {
            return Err(NmsError::InvalidConfig(
                "max_iou must be finite and non-negative",
            ));
        }
        if !self.soft_nms_min_score.is_finite() {
            return Err(NmsError::InvalidConfig("soft_nms_min_score must be finite"));
        }
        if self.soft_nms_method == SoftNmsMethod::Gaussian
            && (!self.soft_nms_sigma.is_finite() || self.soft_nms_sigma <= 0.0)
        {
            return Err(NmsError::InvalidConfig(
                "soft_nms_sigma must be finite and > 0 for gaussian soft-NMS",
            ));
        }
        Ok(())
    }

    /// Keep-list cap for one class in an image with `num_rois` RoIs.
    pub(crate) fn class_cap(&self, num_rois: usize) -> usize {
        if self.max_objects_per_class > 0 {
            self.max_objects_per_class
        } else if self.max_objects > 0 {
            self.max_objects
        } else {
            num_rois
        }
    }
}
