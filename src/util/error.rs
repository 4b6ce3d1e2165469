//! Error types for roinms.

use thiserror::Error;

/// Result alias for roinms operations.
pub type NmsResult<T> = std::result::Result<T, NmsError>;

/// Errors that can occur when validating or running NMS.
///
/// Every variant is fatal: inputs are checked before any selection work
/// starts, so a returned error never comes with partial output.
#[derive(Debug, Error, PartialEq)]
pub enum NmsError {
    /// Two input dimensions or a buffer length disagree.
    #[error("shape mismatch for {what}: expected {expected}, got {got}")]
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
    /// A batch split holds a negative RoI count.
    #[error("batch split {index} is negative ({value})")]
    NegativeBatchSplit { index: usize, value: i32 },
    /// The NMS configuration is invalid.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    /// The affine quantization parameters cannot represent scores.
    #[error("invalid quantization (scale={scale}, zero_point={zero_point})")]
    InvalidQuantization { scale: f32, zero_point: i32 },
    /// An index is out of bounds for a container.
    #[error("index out of bounds: {context} index {index} (len {len})")]
    IndexOutOfBounds {
        index: usize,
        len: usize,
        context: &'static str,
    },
}
