//! Batched, class-aware NMS over per-image RoI ranges.
//!
//! `RoiNms` validates a configuration once and then runs the selector for
//! every non-background class of every image, applies the global per-image
//! cap and concatenates the detections in image, class, emission order.

use std::ops::Range;

use crate::candidate::nms::class_nms;
use crate::candidate::topk::{cap_keep_set, KeepSet};
use crate::config::NmsConfig;
use crate::geometry::BoxCoord;
use crate::quant::{FloatScores, QuantParams, ScoreCodec};
use crate::suppress::Suppression;
use crate::tensor::{BoxTable, ScoreTable};
use crate::trace::{trace_event, trace_span};
use crate::util::{NmsError, NmsResult};

mod output;

pub use output::{Detection, NmsOutput};

/// Detections of a single image before concatenation.
struct ImageDetections<T> {
    scores: Vec<f32>,
    boxes: Vec<T>,
    classes: Vec<i32>,
}

/// Validated NMS engine.
#[derive(Clone, Debug)]
pub struct RoiNms {
    cfg: NmsConfig,
    suppression: Suppression,
}

impl RoiNms {
    /// Creates an engine after validating `cfg`.
    pub fn new(cfg: NmsConfig) -> NmsResult<Self> {
        cfg.validate()?;
        let suppression = Suppression::from_config(&cfg);
        Ok(Self { cfg, suppression })
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &NmsConfig {
        &self.cfg
    }

    /// Returns the resolved suppression policy.
    pub fn suppression(&self) -> Suppression {
        self.suppression
    }

    /// Runs NMS over a batch.
    ///
    /// `batch_splits[b]` is the number of RoIs of image `b`; the RoIs of an
    /// image are contiguous rows of both tables. All shape checks run before
    /// any selection work.
    pub fn run<C: ScoreCodec, T: BoxCoord>(
        &self,
        batch_splits: &[i32],
        scores: ScoreTable<'_, C>,
        boxes: BoxTable<'_, T>,
    ) -> NmsResult<NmsOutput<T>> {
        let ranges = check_inputs(batch_splits, &scores, &boxes)?;
        let _span = trace_span!(
            "roi_nms",
            images = ranges.len(),
            rois = scores.num_rois(),
            classes = scores.num_classes()
        )
        .entered();

        #[cfg(feature = "rayon")]
        {
            if self.cfg.parallel {
                return self.run_par(ranges, scores, boxes);
            }
        }

        let per_image = ranges
            .into_iter()
            .enumerate()
            .map(|(image, rois)| self.nms_image(image, rois, scores, boxes))
            .collect();
        self.concat(per_image)
    }

    #[cfg(feature = "rayon")]
    fn run_par<C: ScoreCodec, T: BoxCoord>(
        &self,
        ranges: Vec<Range<usize>>,
        scores: ScoreTable<'_, C>,
        boxes: BoxTable<'_, T>,
    ) -> NmsResult<NmsOutput<T>> {
        use rayon::prelude::*;

        let per_image = ranges
            .into_par_iter()
            .enumerate()
            .map(|(image, rois)| self.nms_image(image, rois, scores, boxes))
            .collect();
        self.concat(per_image)
    }

    fn nms_image<C: ScoreCodec, T: BoxCoord>(
        &self,
        image: usize,
        rois: Range<usize>,
        scores: ScoreTable<'_, C>,
        boxes: BoxTable<'_, T>,
    ) -> ImageDetections<T> {
        let _span = trace_span!("nms_image", image = image, rois = rois.len()).entered();

        let num_classes = scores.num_classes();
        let codec = scores.codec();
        let cap = self.cfg.class_cap(rois.len());
        let mut keeps = KeepSet::new(num_classes);
        if !rois.is_empty() {
            for class in 1..num_classes {
                let mut column = scores.column(class, rois.clone());
                let class_boxes = boxes.class_boxes(class, rois.clone());
                let keep = class_nms(
                    &mut column,
                    &class_boxes,
                    codec,
                    self.suppression,
                    self.cfg.min_score,
                    cap,
                );
                trace_event!("class_keep", image = image, class = class, count = keep.len());
                keeps.set(class, keep);
            }
        }

        let before = keeps.len();
        if cap_keep_set::<C>(&mut keeps, self.cfg.max_objects) {
            trace_event!("global_cap", image = image, before = before, after = keeps.len());
        }

        let count = keeps.len();
        let mut out = ImageDetections {
            scores: Vec::with_capacity(count),
            boxes: Vec::with_capacity(count * 4),
            classes: Vec::with_capacity(count),
        };
        for (class, kept) in keeps.iter() {
            out.scores.push(codec.decode(kept.raw));
            out.boxes
                .extend_from_slice(boxes.cell(rois.start + kept.roi, class));
            out.classes.push(class as i32);
        }
        out
    }

    fn concat<T: BoxCoord>(&self, per_image: Vec<ImageDetections<T>>) -> NmsResult<NmsOutput<T>> {
        let total: usize = per_image.iter().map(|d| d.scores.len()).sum();
        let mut out = NmsOutput {
            batch_splits: Vec::with_capacity(per_image.len()),
            scores: Vec::with_capacity(total),
            boxes: Vec::with_capacity(total * 4),
            classes: Vec::with_capacity(total),
        };
        for det in per_image {
            out.batch_splits.push(split_count(det.scores.len())?);
            out.scores.extend(det.scores);
            out.boxes.extend(det.boxes);
            out.classes.extend(det.classes);
        }
        trace_event!("nms_done", detections = out.scores.len());
        Ok(out)
    }
}

/// Runs NMS over affine-quantized scores and fixed-point (1/8 pixel) boxes.
pub fn run_quantized_nms(
    batch_splits: &[i32],
    scores: ScoreTable<'_, QuantParams>,
    boxes: BoxTable<'_, u16>,
    cfg: &NmsConfig,
) -> NmsResult<NmsOutput<u16>> {
    RoiNms::new(cfg.clone())?.run(batch_splits, scores, boxes)
}

/// Runs NMS over float scores and pixel boxes.
pub fn run_float_nms(
    batch_splits: &[i32],
    scores: ScoreTable<'_, FloatScores>,
    boxes: BoxTable<'_, f32>,
    cfg: &NmsConfig,
) -> NmsResult<NmsOutput<f32>> {
    RoiNms::new(cfg.clone())?.run(batch_splits, scores, boxes)
}

/// Converts a per-image detection count to an output batch split.
fn split_count(count: usize) -> NmsResult<i32> {
    i32::try_from(count).map_err(|_| NmsError::ShapeMismatch {
        what: "per-image detection count",
        expected: i32::MAX as usize,
        got: count,
    })
}

/// Checks table agreement and turns batch splits into RoI ranges.
fn check_inputs<C: ScoreCodec, T: BoxCoord>(
    batch_splits: &[i32],
    scores: &ScoreTable<'_, C>,
    boxes: &BoxTable<'_, T>,
) -> NmsResult<Vec<Range<usize>>> {
    if boxes.num_rois() != scores.num_rois() {
        return Err(NmsError::ShapeMismatch {
            what: "box table rois",
            expected: scores.num_rois(),
            got: boxes.num_rois(),
        });
    }
    if boxes.num_classes() != scores.num_classes() {
        return Err(NmsError::ShapeMismatch {
            what: "box table classes",
            expected: scores.num_classes(),
            got: boxes.num_classes(),
        });
    }

    let mut ranges = Vec::with_capacity(batch_splits.len());
    let mut start = 0usize;
    for (index, &value) in batch_splits.iter().enumerate() {
        let count =
            usize::try_from(value).map_err(|_| NmsError::NegativeBatchSplit { index, value })?;
        let end = start.saturating_add(count);
        ranges.push(start..end);
        start = end;
    }
    if start != scores.num_rois() {
        return Err(NmsError::ShapeMismatch {
            what: "sum of batch splits",
            expected: scores.num_rois(),
            got: start,
        });
    }
    Ok(ranges)
}
