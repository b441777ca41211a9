//! Tracing hooks for the sort engine (feature: `tracing`).
//!
//! Keep this light: with the feature off every hook is an empty function.

use fjsort_core::Span;

#[cfg(feature = "tracing")]
pub fn direct_sort(len: usize) {
    tracing::trace!(len, "sorting on the calling thread");
}

#[cfg(not(feature = "tracing"))]
pub fn direct_sort(_len: usize) {}

#[cfg(feature = "tracing")]
pub fn forked(len: usize, partitions: usize) {
    tracing::debug!(len, partitions, "fork-join sort started");
}

#[cfg(not(feature = "tracing"))]
pub fn forked(_len: usize, _partitions: usize) {}

#[cfg(feature = "tracing")]
pub fn joined(len: usize, ok: bool) {
    tracing::debug!(len, ok, "fork-join sort finished");
}

#[cfg(not(feature = "tracing"))]
pub fn joined(_len: usize, _ok: bool) {}

#[cfg(feature = "tracing")]
pub fn merged(left: Span, right: Span) {
    tracing::trace!(%left, %right, "merged adjacent spans");
}

#[cfg(not(feature = "tracing"))]
pub fn merged(_left: Span, _right: Span) {}
