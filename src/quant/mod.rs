//! Score codecs: affine uint8 quantization and the float identity codec.
//!
//! The selector only ever sees `f32` scores. Raw values are decoded on read
//! and re-encoded when soft-NMS rewrites a score, so the adjusted column
//! keeps the same storage type as the input table.

use std::cmp::Ordering;

use crate::util::{NmsError, NmsResult};

/// Converts between stored raw scores and real-valued scores.
pub trait ScoreCodec: Copy + Send + Sync {
    /// Storage type of a single score.
    type Raw: Copy + PartialEq + Send + Sync + std::fmt::Debug;

    /// Returns the real value of `raw`.
    fn decode(&self, raw: Self::Raw) -> f32;

    /// Encodes a real value into storage.
    fn encode(&self, value: f32) -> Self::Raw;

    /// Orders raw scores from highest to lowest.
    fn rank_desc(a: &Self::Raw, b: &Self::Raw) -> Ordering;
}

/// Dequantizes an affine uint8 value: `(raw - zero_point) * scale`.
#[inline]
pub fn dequantize(raw: u8, scale: f32, zero_point: i32) -> f32 {
    (raw as i32 - zero_point) as f32 * scale
}

/// Quantizes a real value to uint8, rounding half to even and clamping to
/// `[0, 255]`.
///
/// Rounding is the same on every call, so re-quantizing a dequantized value
/// returns the original byte and a rescore moves it by at most one step more
/// than the real-valued change.
#[inline]
pub fn quantize(value: f32, scale: f32, zero_point: i32) -> u8 {
    let steps = (value / scale).round_ties_even();
    if steps.is_nan() {
        return zero_point.clamp(0, 255) as u8;
    }
    let q = (zero_point as f32 + steps).clamp(0.0, 255.0);
    q as u8
}

/// Shared scale and zero-point of a quantized score table.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuantParams {
    scale: f32,
    zero_point: i32,
}

impl QuantParams {
    /// Creates quantization parameters.
    ///
    /// `scale` must be finite and positive and `zero_point` must be a
    /// representable uint8 value.
    pub fn new(scale: f32, zero_point: i32) -> NmsResult<Self> {
        if !scale.is_finite() || scale <= 0.0 || !(0..=255).contains(&zero_point) {
            return Err(NmsError::InvalidQuantization { scale, zero_point });
        }
        Ok(Self { scale, zero_point })
    }

    /// Returns the quantization step.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Returns the raw value that decodes to zero.
    pub fn zero_point(&self) -> i32 {
        self.zero_point
    }
}

impl ScoreCodec for QuantParams {
    type Raw = u8;

    #[inline]
    fn decode(&self, raw: u8) -> f32 {
        dequantize(raw, self.scale, self.zero_point)
    }

    #[inline]
    fn encode(&self, value: f32) -> u8 {
        quantize(value, self.scale, self.zero_point)
    }

    #[inline]
    fn rank_desc(a: &u8, b: &u8) -> Ordering {
        b.cmp(a)
    }
}

/// Identity codec for tables that already hold `f32` scores.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FloatScores;

impl ScoreCodec for FloatScores {
    type Raw = f32;

    #[inline]
    fn decode(&self, raw: f32) -> f32 {
        raw
    }

    #[inline]
    fn encode(&self, value: f32) -> f32 {
        value
    }

    #[inline]
    fn rank_desc(a: &f32, b: &f32) -> Ordering {
        b.total_cmp(a)
    }
}
