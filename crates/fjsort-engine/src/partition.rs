//! Range partitioning.

use fjsort_core::Span;

/// Split `0..len` into at most `parts` contiguous spans that exactly cover it.
///
/// Every span gets `ceil(len / parts)` elements except the last, which takes
/// whatever is left (7 over 3 gives 3, 3, 1). Rounding up can leave fewer
/// spans than asked for (6 over 4 gives 2, 2, 2). `parts` is clamped to
/// `1..=len`, so no span is ever empty; an empty range yields no spans.
pub fn partition_range(len: usize, parts: usize) -> Vec<Span> {
    if len == 0 {
        return Vec::new();
    }
    let chunk = len.div_ceil(parts.clamp(1, len));
    (0..len)
        .step_by(chunk)
        .map(|begin| Span::new(begin, (begin + chunk).min(len)))
        .collect()
}
