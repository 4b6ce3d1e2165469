//! Row-major views over flat score and box buffers.
//!
//! `ScoreTable` is a borrowed `(num_rois x num_classes)` grid and `BoxTable`
//! a borrowed `(num_rois x num_classes x 4)` grid, both laid out exactly as
//! an upstream tensor producer writes them. Buffer lengths are checked once
//! at construction so per-element accessors can index directly.

use std::ops::Range;

use crate::geometry::{Aabb, BoxCoord};
use crate::quant::{FloatScores, QuantParams, ScoreCodec};
use crate::util::{NmsError, NmsResult};

/// Borrowed score grid with the codec that interprets its raw values.
pub struct ScoreTable<'a, C: ScoreCodec> {
    data: &'a [C::Raw],
    num_rois: usize,
    num_classes: usize,
    codec: C,
}

impl<C: ScoreCodec> Clone for ScoreTable<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ScoreCodec> Copy for ScoreTable<'_, C> {}

impl<'a> ScoreTable<'a, QuantParams> {
    /// Creates a view over affine-quantized uint8 scores.
    pub fn quantized(
        data: &'a [u8],
        num_rois: usize,
        num_classes: usize,
        scale: f32,
        zero_point: i32,
    ) -> NmsResult<Self> {
        let codec = QuantParams::new(scale, zero_point)?;
        Self::new(data, num_rois, num_classes, codec)
    }
}

impl<'a> ScoreTable<'a, FloatScores> {
    /// Creates a view over real-valued scores.
    pub fn float(data: &'a [f32], num_rois: usize, num_classes: usize) -> NmsResult<Self> {
        Self::new(data, num_rois, num_classes, FloatScores)
    }
}

impl<'a, C: ScoreCodec> ScoreTable<'a, C> {
    /// Creates a view; `data.len()` must equal `num_rois * num_classes`.
    pub fn new(
        data: &'a [C::Raw],
        num_rois: usize,
        num_classes: usize,
        codec: C,
    ) -> NmsResult<Self> {
        let expected = grid_len(num_rois, num_classes, 1, "score table size")?;
        if data.len() != expected {
            return Err(NmsError::ShapeMismatch {
                what: "score buffer length",
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            num_rois,
            num_classes,
            codec,
        })
    }

    pub fn num_rois(&self) -> usize {
        self.num_rois
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn codec(&self) -> C {
        self.codec
    }

    /// Returns the backing slice.
    pub fn as_slice(&self) -> &'a [C::Raw] {
        self.data
    }

    /// Returns the raw score of `(roi, class)` if it is within bounds.
    pub fn get(&self, roi: usize, class: usize) -> Option<C::Raw> {
        if roi >= self.num_rois || class >= self.num_classes {
            return None;
        }
        self.data.get(roi * self.num_classes + class).copied()
    }

    /// Returns the class scores of one RoI.
    pub fn row(&self, roi: usize) -> Option<&'a [C::Raw]> {
        if roi >= self.num_rois {
            return None;
        }
        let start = roi * self.num_classes;
        self.data.get(start..start + self.num_classes)
    }

    /// Copies one class column for a contiguous RoI range.
    ///
    /// Element `i` of the result is the score of RoI `rois.start + i`.
    pub(crate) fn column(&self, class: usize, rois: Range<usize>) -> Vec<C::Raw> {
        debug_assert!(class < self.num_classes && rois.end <= self.num_rois);
        rois.map(|roi| self.data[roi * self.num_classes + class])
            .collect()
    }
}

/// Borrowed per-class box grid.
pub struct BoxTable<'a, T: BoxCoord> {
    data: &'a [T],
    num_rois: usize,
    num_classes: usize,
}

impl<T: BoxCoord> Clone for BoxTable<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: BoxCoord> Copy for BoxTable<'_, T> {}

impl<'a, T: BoxCoord> BoxTable<'a, T> {
    /// Creates a view; `data.len()` must equal `num_rois * num_classes * 4`.
    pub fn new(data: &'a [T], num_rois: usize, num_classes: usize) -> NmsResult<Self> {
        let expected = grid_len(num_rois, num_classes, 4, "box table size")?;
        if data.len() != expected {
            return Err(NmsError::ShapeMismatch {
                what: "box buffer length",
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            num_rois,
            num_classes,
        })
    }

    pub fn num_rois(&self) -> usize {
        self.num_rois
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Returns the backing slice.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the stored `(x1, y1, x2, y2)` of `(roi, class)`.
    pub fn coords(&self, roi: usize, class: usize) -> Option<[T; 4]> {
        if roi >= self.num_rois || class >= self.num_classes {
            return None;
        }
        let start = (roi * self.num_classes + class) * 4;
        let c = self.data.get(start..start + 4)?;
        Some([c[0], c[1], c[2], c[3]])
    }

    /// Returns the box of `(roi, class)` in pixels.
    pub fn aabb(&self, roi: usize, class: usize) -> Option<Aabb> {
        self.coords(roi, class).map(Aabb::from_coords)
    }

    /// Stored coordinates of an in-bounds `(roi, class)` cell.
    #[inline]
    pub(crate) fn cell(&self, roi: usize, class: usize) -> &'a [T] {
        let start = (roi * self.num_classes + class) * 4;
        &self.data[start..start + 4]
    }

    /// Decodes one class's boxes for a contiguous RoI range.
    pub(crate) fn class_boxes(&self, class: usize, rois: Range<usize>) -> Vec<Aabb> {
        debug_assert!(class < self.num_classes && rois.end <= self.num_rois);
        rois.map(|roi| {
            let c = self.cell(roi, class);
            Aabb::from_coords([c[0], c[1], c[2], c[3]])
        })
        .collect()
    }
}

fn grid_len(
    num_rois: usize,
    num_classes: usize,
    per_cell: usize,
    what: &'static str,
) -> NmsResult<usize> {
    num_rois
        .checked_mul(num_classes)
        .and_then(|v| v.checked_mul(per_cell))
        .ok_or(NmsError::ShapeMismatch {
            what,
            expected: usize::MAX,
            got: num_rois,
        })
}
