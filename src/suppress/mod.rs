//! Suppression policies applied to candidates overlapping a kept box.
//!
//! `Suppression` is resolved once from an `NmsConfig`; the selector is then
//! monomorphised over the matching `SuppressionPolicy`, so the inner
//! comparison loop does not branch on the configured mode.

use crate::config::{NmsConfig, SoftNmsMethod};
use crate::geometry::Overlap;

/// Outcome of comparing a candidate with the box just kept.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Adjustment {
    /// Remove the candidate from the pool.
    Drop,
    /// Keep the candidate with its current score.
    Keep,
    /// Keep the candidate with a new score.
    Rescore(f32),
}

/// A pure score adjustment rule.
pub trait SuppressionPolicy {
    /// Decides what happens to a candidate with `score` given its overlap
    /// with the kept box.
    fn adjust(&self, score: f32, overlap: Overlap) -> Adjustment;

    /// Minimum score a candidate needs to stay in the pool, if any.
    fn min_score(&self) -> Option<f32>;
}

/// Hard NMS: drop candidates whose IoU exceeds the threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hard {
    pub max_iou: f32,
}

impl SuppressionPolicy for Hard {
    #[inline]
    fn adjust(&self, _score: f32, overlap: Overlap) -> Adjustment {
        if overlap.exceeds(self.max_iou) {
            Adjustment::Drop
        } else {
            Adjustment::Keep
        }
    }

    #[inline]
    fn min_score(&self) -> Option<f32> {
        None
    }
}

/// Linear soft-NMS: scale scores above the threshold by `1 - IoU`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Linear {
    pub max_iou: f32,
    pub min_score: f32,
}

impl SuppressionPolicy for Linear {
    #[inline]
    fn adjust(&self, score: f32, overlap: Overlap) -> Adjustment {
        if overlap.exceeds(self.max_iou) {
            Adjustment::Rescore(score * (1.0 - overlap.iou()))
        } else {
            Adjustment::Keep
        }
    }

    #[inline]
    fn min_score(&self) -> Option<f32> {
        Some(self.min_score)
    }
}

/// Gaussian soft-NMS: scale every score by `exp(-IoU^2 / sigma)`.
///
/// Unlike `Linear`, the decay applies below the IoU threshold as well.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gaussian {
    pub sigma: f32,
    pub min_score: f32,
}

impl SuppressionPolicy for Gaussian {
    #[inline]
    fn adjust(&self, score: f32, overlap: Overlap) -> Adjustment {
        let iou = overlap.iou();
        if iou == 0.0 {
            return Adjustment::Keep;
        }
        Adjustment::Rescore(score * (-(iou * iou) / self.sigma).exp())
    }

    #[inline]
    fn min_score(&self) -> Option<f32> {
        Some(self.min_score)
    }
}

/// Suppression mode resolved from a configuration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Suppression {
    Hard(Hard),
    Linear(Linear),
    Gaussian(Gaussian),
}

impl Suppression {
    /// Resolves the policy configured in `cfg`.
    pub fn from_config(cfg: &NmsConfig) -> Self {
        match cfg.soft_nms_method {
            SoftNmsMethod::None => Suppression::Hard(Hard {
                max_iou: cfg.max_iou,
            }),
            SoftNmsMethod::Linear => Suppression::Linear(Linear {
                max_iou: cfg.max_iou,
                min_score: cfg.soft_nms_min_score,
            }),
            SoftNmsMethod::Gaussian => Suppression::Gaussian(Gaussian {
                sigma: cfg.soft_nms_sigma,
                min_score: cfg.soft_nms_min_score,
            }),
        }
    }

    /// Returns true if the policy rewrites scores.
    pub fn is_soft(&self) -> bool {
        !matches!(self, Suppression::Hard(_))
    }
}
