//! Per-image keep sets and the global top-K cap across classes.

use crate::candidate::nms::Kept;
use crate::quant::ScoreCodec;

/// Keep lists of one image, indexed by class.
///
/// Class 0 is background and never receives entries.
#[derive(Clone, Debug, PartialEq)]
pub struct KeepSet<R> {
    classes: Vec<Vec<Kept<R>>>,
}

impl<R: Copy> KeepSet<R> {
    /// Creates an empty keep set for `num_classes` classes.
    pub fn new(num_classes: usize) -> Self {
        Self {
            classes: vec![Vec::new(); num_classes],
        }
    }

    /// Replaces the keep list of `class`.
    pub fn set(&mut self, class: usize, keep: Vec<Kept<R>>) {
        debug_assert!(class > 0, "background class cannot be kept");
        self.classes[class] = keep;
    }

    /// Returns the keep list of `class` in emission order.
    pub fn class(&self, class: usize) -> &[Kept<R>] {
        self.classes.get(class).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }

    /// Total kept RoIs over all classes.
    pub fn len(&self) -> usize {
        self.classes.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.iter().all(Vec::is_empty)
    }

    /// Iterates `(class, kept)` in ascending class, then emission order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Kept<R>)> + '_ {
        self.classes
            .iter()
            .enumerate()
            .flat_map(|(class, keep)| keep.iter().map(move |kept| (class, kept)))
    }
}

/// Limits the keep set to the `max_objects` highest raw scores over all
/// classes. Returns true if entries were removed.
///
/// Ranking is a stable sort on raw scores, so equal scores keep their class
/// then emission order. Surviving entries stay in emission order within
/// their class. `max_objects == 0` means unbounded.
pub fn cap_keep_set<C: ScoreCodec>(keeps: &mut KeepSet<C::Raw>, max_objects: usize) -> bool {
    let total = keeps.len();
    if max_objects == 0 || total <= max_objects {
        return false;
    }

    let mut ranked: Vec<(usize, usize, C::Raw)> = Vec::with_capacity(total);
    for (class, keep) in keeps.classes.iter().enumerate() {
        for (pos, kept) in keep.iter().enumerate() {
            ranked.push((class, pos, kept.raw));
        }
    }
    ranked.sort_by(|a, b| C::rank_desc(&a.2, &b.2));
    ranked.truncate(max_objects);

    let mut retained: Vec<Vec<bool>> = keeps
        .classes
        .iter()
        .map(|keep| vec![false; keep.len()])
        .collect();
    for &(class, pos, _) in &ranked {
        retained[class][pos] = true;
    }
    for (keep, flags) in keeps.classes.iter_mut().zip(retained) {
        let mut flags = flags.into_iter();
        keep.retain(|_| flags.next().unwrap_or(false));
    }

    true
}
