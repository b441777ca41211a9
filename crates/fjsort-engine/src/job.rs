//! Lifetime-erased access to the caller's slice and comparator.
//!
//! Executor jobs and future continuations must be `'static`, while the slice
//! and comparator are borrowed from the caller of `sort`. `SliceJob` lives on
//! the sorting thread's stack; `ErasedJob` is a `Copy` handle to it that
//! names neither `T` nor the comparator type, so it is `'static`.
//!
//! The erased handle never leaves this module on its own. [`with_job`] hands
//! out [`JobHandle`]s, each holding a drain ticket, and does not return (or
//! finish unwinding) until every handle is gone. What remains for callers:
//! - calls that can run concurrently touch disjoint spans (leaf spans are
//!   disjoint, and a merge only runs after both of its inputs resolved).
#![allow(unsafe_code)]

use std::cmp::Ordering;
use std::fmt::Display;
use std::marker::PhantomData;

use fjsort_core::{contract, LeafSort, SortError, Span};

use crate::drain::{InFlight, Ticket};
use crate::leaf::sort_leaf;
use crate::merge::merge_in_place;

struct SliceJob<'a, T, F, E> {
    base: *mut T,
    len: usize,
    cmp: &'a F,
    leaf: LeafSort,
    _slice: PhantomData<&'a mut [T]>,
    _err: PhantomData<fn() -> E>,
}

impl<'a, T, F, E> SliceJob<'a, T, F, E>
where
    T: Send,
    F: Fn(&T, &T) -> Result<Ordering, E> + Sync,
    E: Display,
{
    fn new(v: &'a mut [T], cmp: &'a F, leaf: LeafSort) -> Self {
        Self {
            base: v.as_mut_ptr(),
            len: v.len(),
            cmp,
            leaf,
            _slice: PhantomData,
            _err: PhantomData,
        }
    }

    /// # Safety
    /// No other live reference may overlap `span` while the result is alive.
    unsafe fn span_mut(&self, span: Span) -> &mut [T] {
        if span.end > self.len {
            contract::violated("span runs past the end of the slice");
        }
        // SAFETY: in bounds (checked above); exclusivity is the caller's contract.
        unsafe { std::slice::from_raw_parts_mut(self.base.add(span.begin), span.len()) }
    }

    fn sort_span(&self, span: Span) -> Result<(), SortError> {
        // SAFETY: leaf spans are disjoint and each is sorted by exactly one task.
        let v = unsafe { self.span_mut(span) };
        sort_leaf(v, self.cmp, self.leaf)
    }

    fn merge_spans(&self, left: Span, right: Span) -> Result<Span, SortError> {
        let whole = left.union(right);
        // SAFETY: both halves resolved before this merge was invoked, and no
        // other merge covers any part of `whole`.
        let v = unsafe { self.span_mut(whole) };
        merge_in_place(v, left.len(), self.cmp)
            .map_err(|e| SortError::Comparator(e.to_string()))?;
        Ok(whole)
    }

    /// Type- and lifetime-erased handle to this job.
    ///
    /// # Safety
    /// Every copy of the returned handle must be dropped before `self` is, and
    /// concurrent calls through it must name disjoint spans.
    unsafe fn erase(&self) -> ErasedJob {
        ErasedJob {
            ctx: self as *const Self as *const (),
            sort: sort_thunk::<T, F, E>,
            merge: merge_thunk::<T, F, E>,
        }
    }
}

unsafe fn sort_thunk<T, F, E>(ctx: *const (), span: Span) -> Result<(), SortError>
where
    T: Send,
    F: Fn(&T, &T) -> Result<Ordering, E> + Sync,
    E: Display,
{
    // SAFETY: `ctx` came from `SliceJob::erase` with these type parameters and
    // the job is still alive.
    let job = unsafe { &*(ctx as *const SliceJob<'_, T, F, E>) };
    job.sort_span(span)
}

unsafe fn merge_thunk<T, F, E>(ctx: *const (), left: Span, right: Span) -> Result<Span, SortError>
where
    T: Send,
    F: Fn(&T, &T) -> Result<Ordering, E> + Sync,
    E: Display,
{
    // SAFETY: as for `sort_thunk`.
    let job = unsafe { &*(ctx as *const SliceJob<'_, T, F, E>) };
    job.merge_spans(left, right)
}

#[derive(Clone, Copy)]
struct ErasedJob {
    ctx: *const (),
    sort: unsafe fn(*const (), Span) -> Result<(), SortError>,
    merge: unsafe fn(*const (), Span, Span) -> Result<Span, SortError>,
}

// SAFETY: only built by `SliceJob::erase`, which requires `T: Send` (elements
// are mutated from other threads) and `F: Sync` (the comparator is shared).
unsafe impl Send for ErasedJob {}
unsafe impl Sync for ErasedJob {}

/// Run `body` with access to a `'static` view of `v` and `cmp`.
///
/// Returns only once every [`JobHandle`] created through the scope has been
/// dropped, on normal return and on unwind alike. Leaking a handle therefore
/// blocks here forever rather than leaving a dangling pointer behind.
pub(crate) fn with_job<T, F, E, R>(
    v: &mut [T],
    cmp: &F,
    leaf: LeafSort,
    body: impl FnOnce(&JobScope) -> R,
) -> R
where
    T: Send,
    F: Fn(&T, &T) -> Result<Ordering, E> + Sync,
    E: Display,
{
    let job = SliceJob::new(v, cmp, leaf);
    let tracker = InFlight::new();
    // SAFETY: the only copy of `erased` lives in `scope`, and handles are only
    // minted together with a ticket from `tracker`. `_drain` is declared after
    // `job`, so it is dropped first and waits for every ticket.
    let scope = JobScope {
        erased: unsafe { job.erase() },
        tracker,
    };
    let _drain = scope.tracker.drain_on_drop();
    body(&scope)
}

/// Source of [`JobHandle`]s for the duration of [`with_job`].
pub(crate) struct JobScope {
    erased: ErasedJob,
    tracker: InFlight,
}

impl JobScope {
    pub(crate) fn handle(&self) -> JobHandle {
        JobHandle {
            job: self.erased,
            _ticket: self.tracker.ticket(),
        }
    }
}

/// A `'static`, `Send` handle to the scoped job. Keeps [`with_job`] from
/// returning while it exists.
pub(crate) struct JobHandle {
    job: ErasedJob,
    _ticket: Ticket,
}

impl JobHandle {
    /// Sort one leaf span. Concurrent callers must use disjoint spans.
    pub(crate) fn sort_span(&self, span: Span) -> Result<(), SortError> {
        // SAFETY: the job outlives this handle (ticket), and spans are disjoint
        // per the caller contract.
        unsafe { (self.job.sort)(self.job.ctx, span) }
    }

    /// Merge two adjacent, already sorted spans. Neither may be in use by any
    /// other call.
    pub(crate) fn merge_spans(&self, left: Span, right: Span) -> Result<Span, SortError> {
        // SAFETY: as for `sort_span`.
        unsafe { (self.job.merge)(self.job.ctx, left, right) }
    }
}
