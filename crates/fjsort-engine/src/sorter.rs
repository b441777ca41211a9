//! The fork-join sort driver.

use std::cmp::Ordering;
use std::convert::Infallible;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use fjsort_core::{Result, SortConfig, SortError, Span, TaskFailure};
use fjsort_exec::{submit, Executor};
use fjsort_future::Promise;

use crate::job::{with_job, JobHandle};
use crate::leaf::sort_leaf;
use crate::metrics;
use crate::partition::partition_range;
use crate::reduce::reduce_futures;

/// Parallel in-place sort over an executor.
///
/// Limitations:
/// - `sort*` blocks the calling thread until the whole slice is sorted; do not
///   call it from inside a task of the same executor if that executor could
///   run out of threads while this one waits.
/// - There is no cancellation. A comparator that never returns stalls the
///   sort forever.
#[derive(Debug)]
pub struct ForkJoinSort<X> {
    executor: X,
    config: SortConfig,
}

impl<X: Executor> ForkJoinSort<X> {
    /// Default config: one partition per available hardware thread.
    pub fn new(executor: X) -> Self {
        Self::with_config(executor, SortConfig::default())
    }

    pub fn with_config(executor: X, config: SortConfig) -> Self {
        Self { executor, config }
    }

    pub fn config(&self) -> &SortConfig {
        &self.config
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }

    pub fn sort<T>(&self, v: &mut [T]) -> Result<()>
    where
        T: Ord + Send,
    {
        self.sort_by(v, T::cmp)
    }

    pub fn sort_by<T, F>(&self, v: &mut [T], cmp: F) -> Result<()>
    where
        T: Send,
        F: Fn(&T, &T) -> Ordering + Sync,
    {
        self.try_sort_by(v, |a, b| Ok::<_, Infallible>(cmp(a, b)))
    }

    /// Sort with a comparator that may fail.
    ///
    /// On `Err(SortError::Comparator(..))` the slice holds a permutation of
    /// its input, partially sorted. A panic in any task is re-raised here once
    /// every outstanding task has finished.
    pub fn try_sort_by<T, F, E>(&self, v: &mut [T], cmp: F) -> Result<()>
    where
        T: Send,
        F: Fn(&T, &T) -> std::result::Result<Ordering, E> + Sync,
        E: Display,
    {
        let spans = partition_range(v.len(), self.config.resolved_partitions());
        if spans.len() <= 1 {
            metrics::direct_sort(v.len());
            return sort_leaf(v, &cmp, self.config.leaf_sort);
        }

        let len = v.len();
        metrics::forked(len, spans.len());
        let outcome = self.fork_join(v, &cmp, &spans);
        metrics::joined(len, outcome.is_ok());

        match outcome {
            Err(SortError::Panicked(msg)) => panic!("fork-join sort task panicked: {msg}"),
            other => other,
        }
    }

    fn fork_join<T, F, E>(&self, v: &mut [T], cmp: &F, spans: &[Span]) -> Result<()>
    where
        T: Send,
        F: Fn(&T, &T) -> std::result::Result<Ordering, E> + Sync,
        E: Display,
    {
        // Leaf spans are disjoint, and `reduce_futures` only merges a pair
        // after both of its futures resolved.
        with_job(v, cmp, self.config.leaf_sort, |scope| {
            let leaves: Vec<Arc<Promise<Span, SortError>>> = spans
                .iter()
                .map(|&span| {
                    let handle = scope.handle();
                    submit(&self.executor, move || handle.sort_span(span).map(|()| span))
                })
                .collect();

            let step = MergeStep {
                job: scope.handle(),
            };
            let Some(root) = reduce_futures(leaves, move |l, r| step.apply(l, r)) else {
                return Ok(());
            };
            root.get().map(|_| ())
        })
    }
}

// The merge operation shared by every internal node of the reduction tree.
// Its handle lives as long as any pending continuation can still call it.
struct MergeStep {
    job: JobHandle,
}

impl MergeStep {
    fn apply(&self, left: Span, right: Span) -> Result<Span> {
        // Merges run inside continuations, where an escaping panic would leave
        // the parent future unresolved forever. Capture it as an error instead.
        let merged = panic::catch_unwind(AssertUnwindSafe(|| self.job.merge_spans(left, right)))
            .unwrap_or_else(|payload| Err(TaskFailure::from_panic(payload.as_ref()).into()));
        if merged.is_ok() {
            metrics::merged(left, right);
            #[cfg(test)]
            tests::MERGES.with(|m| m.borrow_mut().push((left, right)));
        }
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fjsort_core::LeafSort;
    use fjsort_exec::{InlineExecutor, ThreadPerTask};
    use std::cell::RefCell;

    thread_local! {
        // Spans merged on this thread, in order. With `InlineExecutor` that is
        // every merge of a sort.
        pub(super) static MERGES: RefCell<Vec<(Span, Span)>> = const { RefCell::new(Vec::new()) };
    }

    fn merges_of(f: impl FnOnce()) -> Vec<(Span, Span)> {
        MERGES.with(|m| m.borrow_mut().clear());
        f();
        MERGES.with(|m| m.take())
    }

    fn inline(partitions: usize) -> ForkJoinSort<InlineExecutor> {
        ForkJoinSort::with_config(InlineExecutor, SortConfig::default().with_partitions(partitions))
    }

    #[test]
    fn sorts_inline_for_every_partition_count() {
        let input = vec![9, 4, 7, 1, 8, 2, 6, 3, 5, 0, 4, 4];
        for parts in 1..=input.len() + 2 {
            let mut v = input.clone();
            inline(parts).sort(&mut v).unwrap();
            let mut expected = input.clone();
            expected.sort();
            assert_eq!(v, expected, "partitions = {parts}");
        }
    }

    #[test]
    fn sort_by_descending() {
        let mut v: Vec<i32> = (0..100).collect();
        inline(7).sort_by(&mut v, |a, b| b.cmp(a)).unwrap();
        assert_eq!(v, (0..100).rev().collect::<Vec<_>>());
    }

    #[test]
    fn borrowed_comparator_state_is_fine() {
        let weights = vec![3, 1, 2];
        let mut v = vec![0usize, 1, 2, 0, 1, 2];
        let sorter = ForkJoinSort::with_config(
            ThreadPerTask::default(),
            SortConfig::default().with_partitions(3).with_leaf_sort(LeafSort::Stable),
        );
        sorter
            .sort_by(&mut v, |a, b| weights[*a].cmp(&weights[*b]))
            .unwrap();
        assert_eq!(v, vec![1, 1, 2, 2, 0, 0]);
    }

    #[test]
    fn singleton_partitions_take_four_merges() {
        let mut v = vec![5, 3, 1, 4, 2];
        let merges = merges_of(|| inline(5).sort(&mut v).unwrap());
        assert_eq!(v, vec![1, 2, 3, 4, 5]);
        let s = Span::new;
        assert_eq!(
            merges,
            vec![
                (s(0, 1), s(1, 2)),
                (s(2, 3), s(3, 4)),
                (s(0, 2), s(2, 4)),
                (s(0, 4), s(4, 5)),
            ]
        );
    }

    #[test]
    fn odd_tail_is_carried_to_the_last_merge() {
        let mut v = vec![7, 1, 6, 2, 5, 3, 4];
        let merges = merges_of(|| inline(3).sort(&mut v).unwrap());
        assert_eq!(v, vec![1, 2, 3, 4, 5, 6, 7]);
        // Spans 3,3,1: the single-element tail skips the first pass.
        assert_eq!(
            merges,
            vec![
                (Span::new(0, 3), Span::new(3, 6)),
                (Span::new(0, 6), Span::new(6, 7)),
            ]
        );
    }

    #[test]
    fn direct_sort_merges_nothing() {
        let mut v = vec![5, 3, 1, 4, 2];
        assert!(merges_of(|| inline(1).sort(&mut v).unwrap()).is_empty());
        assert_eq!(v, vec![1, 2, 3, 4, 5]);
    }
}
