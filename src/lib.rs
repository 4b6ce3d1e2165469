//! roinms is a batched, class-aware non-maximum suppression engine for
//! object-detection post-processing.
//!
//! Given per-RoI class scores and per-class boxes for a batch of images, it
//! keeps a bounded, non-overlapping, high-confidence subset of boxes per
//! class, optionally re-scoring neighbours instead of discarding them
//! (linear or Gaussian soft-NMS), and caps the detections per image across
//! all classes. Scores can be affine-quantized uint8 with 1/8-pixel
//! fixed-point boxes, or plain `f32`.
//!
//! Images can be processed in parallel via the `rayon` feature.

pub mod batch;
mod candidate;
pub mod config;
pub mod geometry;
pub mod lowlevel;
pub mod quant;
pub mod suppress;
pub mod tensor;
mod trace;
pub mod util;

pub use batch::{run_float_nms, run_quantized_nms, Detection, NmsOutput, RoiNms};
pub use config::{NmsConfig, SoftNmsMethod};
pub use geometry::{Aabb, BoxCoord};
pub use quant::{FloatScores, QuantParams, ScoreCodec};
pub use tensor::{BoxTable, ScoreTable};
pub use util::{NmsError, NmsResult};
