//! Flat NMS outputs.

use crate::geometry::BoxCoord;
use crate::util::{NmsError, NmsResult};

/// One kept box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Detection<T> {
    /// Score at the moment the box was kept (dequantized).
    pub score: f32,
    /// Stored `(x1, y1, x2, y2)` copied from the input box table.
    pub bbox: [T; 4],
    /// Class index, never 0.
    pub class: i32,
}

/// Concatenated detections of a batch.
///
/// Detections are ordered by image, then ascending class, then the order in
/// which the selector kept them. `boxes` holds four coordinates per
/// detection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NmsOutput<T> {
    /// Number of detections per image.
    pub batch_splits: Vec<i32>,
    pub scores: Vec<f32>,
    pub boxes: Vec<T>,
    pub classes: Vec<i32>,
}

impl<T: BoxCoord> NmsOutput<T> {
    /// Total number of detections.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Number of images in the batch.
    pub fn num_images(&self) -> usize {
        self.batch_splits.len()
    }

    /// Returns detection `index`.
    pub fn get(&self, index: usize) -> Option<Detection<T>> {
        let score = *self.scores.get(index)?;
        let class = *self.classes.get(index)?;
        let c = self.boxes.get(index * 4..index * 4 + 4)?;
        Some(Detection {
            score,
            bbox: [c[0], c[1], c[2], c[3]],
            class,
        })
    }

    /// Iterates over all detections in output order.
    pub fn detections(&self) -> impl Iterator<Item = Detection<T>> + '_ {
        (0..self.len()).filter_map(move |index| self.get(index))
    }

    /// Returns the detections of image `image`.
    pub fn image(&self, image: usize) -> NmsResult<Vec<Detection<T>>> {
        let count = *self
            .batch_splits
            .get(image)
            .ok_or(NmsError::IndexOutOfBounds {
                index: image,
                len: self.batch_splits.len(),
                context: "image",
            })?;
        let start: usize = self.batch_splits[..image]
            .iter()
            .map(|&n| n.max(0) as usize)
            .sum();
        let end = start + count.max(0) as usize;
        Ok((start..end).filter_map(|index| self.get(index)).collect())
    }
}
