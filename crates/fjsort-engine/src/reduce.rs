//! Pairwise reduction of an ordered sequence of futures.
//!
//! Each pass walks the sequence left to right in disjoint pairs and replaces
//! every pair with one future; an odd trailing future passes through as-is.
//! Passes repeat until one future is left. The result is an implicit balanced
//! binary tree whose nodes are nothing but continuation chains.

use std::sync::Arc;

use fjsort_future::Promise;

/// Fold `futures` into one future of `op` applied across neighbours.
///
/// Order matters, completion order does not: `op(left, right)` always gets
/// the values of positional neighbours. Returns `None` for an empty input.
/// Never blocks.
pub fn reduce_futures<T, E, F>(futures: Vec<Arc<Promise<T, E>>>, op: F) -> Option<Arc<Promise<T, E>>>
where
    T: Send + 'static,
    E: Send + 'static,
    F: Fn(T, T) -> Result<T, E> + Send + Sync + 'static,
{
    let op = Arc::new(op);
    let mut level = futures;
    while level.len() > 1 {
        level = reduce_level(level, &op);
    }
    level.pop()
}

fn reduce_level<T, E, F>(level: Vec<Arc<Promise<T, E>>>, op: &Arc<F>) -> Vec<Arc<Promise<T, E>>>
where
    T: Send + 'static,
    E: Send + 'static,
    F: Fn(T, T) -> Result<T, E> + Send + Sync + 'static,
{
    let mut next = Vec::with_capacity(level.len().div_ceil(2));
    let mut it = level.into_iter();
    while let Some(left) = it.next() {
        match it.next() {
            Some(right) => next.push(combine(&left, right, Arc::clone(op))),
            None => next.push(left),
        }
    }
    next
}

// left.then(|l| right.then(|r| op(l, r))), flattened.
fn combine<T, E, F>(left: &Promise<T, E>, right: Arc<Promise<T, E>>, op: Arc<F>) -> Arc<Promise<T, E>>
where
    T: Send + 'static,
    E: Send + 'static,
    F: Fn(T, T) -> Result<T, E> + Send + Sync + 'static,
{
    left.set_continuation(move |l| Ok(right.set_continuation(move |r| op(l, r))))
        .flatten()
}
