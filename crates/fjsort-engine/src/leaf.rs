//! Sequential sort of one span.

use std::cmp::Ordering;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};

use fjsort_core::{LeafSort, SortError};

// Unwind payload used to bail out of `slice::sort_by` when the comparator
// reports an error. Never escapes `sort_leaf`.
struct ComparatorAbort;

/// Sort `v` in place with a fallible comparator.
///
/// The first comparator error stops the sort and is returned as
/// `SortError::Comparator`; `v` is then still a permutation of its input.
/// Genuine panics from the comparator keep unwinding.
pub fn sort_leaf<T, F, E>(v: &mut [T], cmp: &F, kind: LeafSort) -> Result<(), SortError>
where
    F: Fn(&T, &T) -> Result<Ordering, E>,
    E: Display,
{
    let mut failure: Option<String> = None;
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut by = |a: &T, b: &T| match cmp(a, b) {
            Ok(ord) => ord,
            Err(e) => {
                failure = Some(e.to_string());
                // resume_unwind skips the panic hook: nothing is printed.
                panic::resume_unwind(Box::new(ComparatorAbort))
            }
        };
        match kind {
            LeafSort::Stable => v.sort_by(&mut by),
            LeafSort::Unstable => v.sort_unstable_by(&mut by),
        }
    }));

    match outcome {
        Ok(()) => Ok(()),
        Err(payload) => match failure {
            Some(msg) if payload.is::<ComparatorAbort>() => Err(SortError::Comparator(msg)),
            _ => panic::resume_unwind(payload),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn ord(a: &i32, b: &i32) -> Result<Ordering, Infallible> {
        Ok(a.cmp(b))
    }

    #[test]
    fn sorts_with_both_kinds() {
        for kind in [LeafSort::Stable, LeafSort::Unstable] {
            let mut v = vec![5, 3, 1, 4, 2];
            sort_leaf(&mut v, &ord, kind).unwrap();
            assert_eq!(v, vec![1, 2, 3, 4, 5]);
        }
    }

    #[test]
    fn stable_kind_keeps_input_order_of_equals() {
        let mut v = vec![(2, 0), (1, 1), (2, 2), (1, 3)];
        let by_key = |a: &(i32, i32), b: &(i32, i32)| Ok::<_, Infallible>(a.0.cmp(&b.0));
        sort_leaf(&mut v, &by_key, LeafSort::Stable).unwrap();
        assert_eq!(v, vec![(1, 1), (1, 3), (2, 0), (2, 2)]);
    }

    #[test]
    fn comparator_error_is_returned() {
        let mut v = vec![9, 8, 7, 6, 5, 4, 3, 2, 1, 0];
        let picky = |a: &i32, b: &i32| {
            if *a == 3 || *b == 3 {
                Err(format!("cannot compare {a} with {b}"))
            } else {
                Ok(a.cmp(b))
            }
        };
        let err = sort_leaf(&mut v, &picky, LeafSort::Stable).unwrap_err();
        assert!(matches!(err, SortError::Comparator(ref m) if m.starts_with("cannot compare")));

        let mut seen = v.clone();
        seen.sort();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }

    #[test]
    #[should_panic(expected = "real panic")]
    fn comparator_panic_keeps_unwinding() {
        let mut v = vec![2, 1];
        let bad = |_: &i32, _: &i32| -> Result<Ordering, Infallible> { panic!("real panic") };
        let _ = sort_leaf(&mut v, &bad, LeafSort::Unstable);
    }
}
