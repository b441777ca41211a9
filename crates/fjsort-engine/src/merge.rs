//! In-place merge of two adjacent sorted runs.
//!
//! Rotation based: no allocation and no `Clone`/`Default` bound on elements.
//! Elements only ever move through `rotate_left`/`swap`, so if the comparator
//! fails part way the slice is still a permutation of its input. Stable: an
//! element from the left run never moves behind an equal one from the right.

use std::cmp::Ordering;

/// Merge `v[..mid]` and `v[mid..]`, each already sorted under `cmp`.
///
/// Cost for `n = v.len()`: one comparison when the runs are already in
/// order; otherwise O(n log n) comparisons at most and O(n log n) element
/// moves, against O(n) for a buffered merge. The top-level merges of a large
/// sort therefore dominate its run time. No extra memory is used.
pub fn merge_in_place<T, F, E>(v: &mut [T], mid: usize, cmp: &F) -> Result<(), E>
where
    F: Fn(&T, &T) -> Result<Ordering, E>,
{
    if mid == 0 || mid >= v.len() {
        return Ok(());
    }
    // Runs already in order: one comparison, no moves.
    if cmp(&v[mid - 1], &v[mid])? != Ordering::Greater {
        return Ok(());
    }
    merge_without_buffer(v, mid, cmp)
}

fn merge_without_buffer<T, F, E>(v: &mut [T], mid: usize, cmp: &F) -> Result<(), E>
where
    F: Fn(&T, &T) -> Result<Ordering, E>,
{
    let len1 = mid;
    let len2 = v.len() - mid;
    if len1 == 0 || len2 == 0 {
        return Ok(());
    }
    if len1 + len2 == 2 {
        if cmp(&v[1], &v[0])? == Ordering::Less {
            v.swap(0, 1);
        }
        return Ok(());
    }

    // Split the longer run in half and find where its pivot lands in the
    // other run, then rotate the two middle pieces past each other.
    let (cut1, cut2) = if len1 > len2 {
        let cut1 = len1 / 2;
        (cut1, mid + lower_bound(&v[mid..], &v[cut1], cmp)?)
    } else {
        let cut2 = mid + len2 / 2;
        (upper_bound(&v[..mid], &v[cut2], cmp)?, cut2)
    };

    v[cut1..cut2].rotate_left(mid - cut1);
    let new_mid = cut1 + (cut2 - mid);

    let (lo, hi) = v.split_at_mut(new_mid);
    merge_without_buffer(lo, cut1, cmp)?;
    merge_without_buffer(hi, mid - cut1, cmp)
}

// First index whose element is not less than `pivot`.
fn lower_bound<T, F, E>(run: &[T], pivot: &T, cmp: &F) -> Result<usize, E>
where
    F: Fn(&T, &T) -> Result<Ordering, E>,
{
    let (mut lo, mut hi) = (0, run.len());
    while lo < hi {
        let m = lo + (hi - lo) / 2;
        if cmp(&run[m], pivot)? == Ordering::Less {
            lo = m + 1;
        } else {
            hi = m;
        }
    }
    Ok(lo)
}

// First index whose element is greater than `pivot`.
fn upper_bound<T, F, E>(run: &[T], pivot: &T, cmp: &F) -> Result<usize, E>
where
    F: Fn(&T, &T) -> Result<Ordering, E>,
{
    let (mut lo, mut hi) = (0, run.len());
    while lo < hi {
        let m = lo + (hi - lo) / 2;
        if cmp(pivot, &run[m])? == Ordering::Less {
            hi = m;
        } else {
            lo = m + 1;
        }
    }
    Ok(lo)
}
