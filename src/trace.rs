//! Optional tracing hooks for the batch runner.
//!
//! With the `tracing` feature, `RoiNms::run` opens a `roi_nms` span (image,
//! RoI and class counts) and each image gets a nested `nms_image` span.
//! Inside them the runner emits `class_keep` per class, `global_cap` when
//! the per-image cap trims detections and `nms_done` with the total count.
//! Without the feature every hook compiles away.

/// Opens an info-level `roi_nms` or `nms_image` span.
///
/// Without the `tracing` feature this yields a `NoopSpan`, so call sites can
/// always write `let _span = trace_span!(...).entered();`.
#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        tracing::info_span!($name $(, $($field)*)?)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        $crate::trace::NoopSpan
    };
}

/// Emits an info-level selection event (`class_keep`, `global_cap`,
/// `nms_done`) with key/value fields.
///
/// Without the `tracing` feature the field values are still evaluated, then
/// discarded.
#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::info!(name: $name, $($key = $value),+)
    };
    ($name:expr) => {
        tracing::info!(name: $name)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($($value,)+);
    };
    ($name:expr) => {};
}

pub(crate) use trace_event;
pub(crate) use trace_span;

/// Span guard stand-in used when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Returns self, mirroring `Span::entered()`.
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
