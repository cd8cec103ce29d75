//! Character-offset ranges.
//!
//! ## Learning: Range Types
//!
//! Rust's standard library has `Range<T>` (exclusive end) and
//! `RangeInclusive<T>` (inclusive end). Selections and tag regions use
//! exclusive ranges because:
//! - Empty selections (start == end) are natural
//! - Easier arithmetic (length = end - start)
//! - Consistent with slice semantics

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A selected span of the buffer, in character offsets.
///
/// The start is always before or equal to the end (normalized).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl Selection {
    /// Creates a new selection.
    ///
    /// Automatically normalizes so start <= end.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// Creates a zero-width selection at an offset.
    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Returns true if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the number of selected characters.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if an offset is within this selection.
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start && offset < self.end
    }

    /// Returns the selection as a half-open range.
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Returns true if this selection overlaps with another.
    pub fn overlaps(&self, other: &Selection) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns the intersection of two selections.
    pub fn intersect(&self, other: &Selection) -> Option<Selection> {
        if !self.overlaps(other) {
            return None;
        }

        Some(Selection {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }
}

impl From<Range<usize>> for Selection {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_normalization() {
        let sel = Selection::new(9, 3);
        assert_eq!(sel.start, 3);
        assert_eq!(sel.end, 9);
        assert_eq!(sel.len(), 6);
    }

    #[test]
    fn test_selection_contains() {
        let sel = Selection::new(2, 5);
        assert!(sel.contains(2));
        assert!(sel.contains(4));
        assert!(!sel.contains(5)); // End is exclusive
    }

    #[test]
    fn test_selection_intersect() {
        let a = Selection::new(0, 10);
        let b = Selection::new(5, 15);
        assert_eq!(a.intersect(&b), Some(Selection::new(5, 10)));
        assert_eq!(a.intersect(&Selection::new(10, 12)), None);
    }

    #[test]
    fn test_caret_is_empty() {
        assert!(Selection::caret(4).is_empty());
        assert_eq!(Selection::caret(4).range(), 4..4);
    }
}
