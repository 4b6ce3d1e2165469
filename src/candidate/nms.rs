//! Greedy per-class non-maximum suppression.

use crate::geometry::Aabb;
use crate::quant::ScoreCodec;
use crate::suppress::{Adjustment, Suppression, SuppressionPolicy};

/// A selected RoI with its score frozen at the moment it was kept.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Kept<R> {
    /// RoI index within the image.
    pub roi: usize,
    /// Raw score at emission.
    pub raw: R,
}

/// Runs greedy NMS over one class column with the resolved policy.
///
/// `scores` is the class's owned score buffer; soft-NMS writes re-encoded
/// scores back into it. `boxes[i]` is the box of RoI `i`.
pub fn class_nms<C: ScoreCodec>(
    scores: &mut [C::Raw],
    boxes: &[Aabb],
    codec: C,
    suppression: Suppression,
    min_score: f32,
    cap: usize,
) -> Vec<Kept<C::Raw>> {
    match suppression {
        Suppression::Hard(policy) => greedy_nms(scores, boxes, codec, &policy, min_score, cap),
        Suppression::Linear(policy) => greedy_nms(scores, boxes, codec, &policy, min_score, cap),
        Suppression::Gaussian(policy) => {
            greedy_nms(scores, boxes, codec, &policy, min_score, cap)
        }
    }
}

/// Greedy NMS for a single policy.
///
/// Candidates are RoIs scoring at least `min_score`. Each round keeps the
/// highest current score (the lowest RoI index wins ties), then applies
/// `policy` to every remaining candidate against the kept box. Stops when
/// the pool is empty or `cap` RoIs are kept.
pub fn greedy_nms<C: ScoreCodec, P: SuppressionPolicy>(
    scores: &mut [C::Raw],
    boxes: &[Aabb],
    codec: C,
    policy: &P,
    min_score: f32,
    cap: usize,
) -> Vec<Kept<C::Raw>> {
    debug_assert_eq!(scores.len(), boxes.len());

    let mut pool = Vec::new();
    let mut best_pos = 0usize;
    let mut best_score = f32::NEG_INFINITY;
    for (roi, &raw) in scores.iter().enumerate() {
        let score = codec.decode(raw);
        if score >= min_score {
            if score > best_score {
                best_score = score;
                best_pos = pool.len();
            }
            pool.push(roi);
        }
    }

    let floor = policy.min_score();
    let mut keep = Vec::new();
    let mut next = Vec::with_capacity(pool.len());
    while !pool.is_empty() && keep.len() < cap {
        let chosen = best_pos;
        let p = pool[chosen];
        keep.push(Kept {
            roi: p,
            raw: scores[p],
        });
        let kept_box = boxes[p];

        best_pos = 0;
        best_score = f32::NEG_INFINITY;
        next.clear();
        // Removal keeps pool order, so candidates stay in ascending RoI order.
        for (pos, &idx) in pool.iter().enumerate() {
            if pos == chosen {
                continue;
            }
            let current = codec.decode(scores[idx]);
            let overlap = kept_box.overlap(&boxes[idx]);
            // The floor sees the real rescored value; ranking sees the stored one.
            let (unrounded, score) = match policy.adjust(current, overlap) {
                Adjustment::Drop => continue,
                Adjustment::Keep => (current, current),
                Adjustment::Rescore(value) => {
                    scores[idx] = codec.encode(value);
                    (value, codec.decode(scores[idx]))
                }
            };
            if floor.is_some_and(|floor| unrounded < floor) {
                continue;
            }
            if score > best_score {
                best_score = score;
                best_pos = next.len();
            }
            next.push(idx);
        }
        std::mem::swap(&mut pool, &mut next);
    }

    keep
}
