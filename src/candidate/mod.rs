//! Candidate selection and pruning.
//!
//! Includes the per-class greedy selector and the per-image global cap.

pub(crate) mod nms;
pub(crate) mod topk;
