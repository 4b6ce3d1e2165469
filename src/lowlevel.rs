//! Low-level building blocks for custom post-processing pipelines.
//!
//! These expose the per-class selector, the global cap and the suppression
//! policies directly. Most users should prefer `RoiNms` or the
//! `run_*_nms` functions.

pub use crate::candidate::nms::{class_nms, greedy_nms, Kept};
pub use crate::candidate::topk::{cap_keep_set, KeepSet};
pub use crate::geometry::{iou, Overlap, BOX_FIXED_POINT_SCALE};
pub use crate::quant::{dequantize, quantize};
pub use crate::suppress::{Adjustment, Gaussian, Hard, Linear, Suppression, SuppressionPolicy};
