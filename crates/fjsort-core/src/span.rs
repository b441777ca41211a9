//! Positional range handles.
//!
//! A `Span` names a contiguous window `[begin, end)` of a slice that someone
//! else owns. It never borrows the elements, so it can travel freely between
//! tasks and through futures.

use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::contract;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub begin: usize,
    pub end: usize,
}

impl Span {
    /// Panics (contract violation) if `begin > end`.
    #[track_caller]
    pub fn new(begin: usize, end: usize) -> Self {
        if begin > end {
            contract::violated("span begin is past its end");
        }
        Self { begin, end }
    }

    pub const fn len(self) -> usize {
        self.end - self.begin
    }

    pub const fn is_empty(self) -> bool {
        self.begin == self.end
    }

    pub fn range(self) -> Range<usize> {
        self.begin..self.end
    }

    /// True iff `self` ends exactly where `right` begins.
    pub const fn is_adjacent_to(self, right: Span) -> bool {
        self.end == right.begin
    }

    /// Span covering `self` followed by `right`.
    ///
    /// Merging non-adjacent spans would silently interleave unrelated data,
    /// so this is a contract violation rather than an error value.
    #[track_caller]
    pub fn union(self, right: Span) -> Span {
        if !self.is_adjacent_to(right) {
            contract::violated(&format!("cannot join non-adjacent spans {self} and {right}"));
        }
        Span {
            begin: self.begin,
            end: right.end,
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.begin, self.end)
    }
}
