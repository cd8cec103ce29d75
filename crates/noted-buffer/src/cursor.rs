//! Caret and line/column position types.
//!
//! ## Learning: Newtype Pattern
//!
//! `Position` is a struct that wraps line/column coordinates.
//! This is better than using `(usize, usize)` because:
//! - Type safety: Can't accidentally swap line and column
//! - Named fields: Self-documenting code

use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::Selection;

/// A position in the text buffer (line and column).
///
/// Both line and column are 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Line number (0-indexed)
    pub line: usize,
    /// Column number (0-indexed, in characters not bytes)
    pub column: usize,
}

impl Position {
    /// Creates a new position.
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Position at the start of the document.
    pub const ZERO: Position = Position { line: 0, column: 0 };

    /// Returns true if this position is at the start of its line.
    pub fn is_line_start(&self) -> bool {
        self.column == 0
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        match self.line.cmp(&other.line) {
            std::cmp::Ordering::Equal => self.column.cmp(&other.column),
            other => other,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Display as 1-indexed for user-facing output
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

/// The insertion point, with an optional selection anchor.
///
/// When `anchor` is set, the characters between the anchor and
/// `offset` are selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Caret {
    /// Current character offset
    pub offset: usize,

    /// Selection anchor (if selecting text)
    pub anchor: Option<usize>,
}

impl Caret {
    /// Creates a caret at an offset with nothing selected.
    pub fn new(offset: usize) -> Self {
        Self {
            offset,
            anchor: None,
        }
    }

    /// Moves the caret to a new offset, clearing selection.
    pub fn move_to(&mut self, offset: usize) {
        self.offset = offset;
        self.anchor = None;
    }

    /// Moves the caret, extending selection from the current offset.
    pub fn select_to(&mut self, offset: usize) {
        if self.anchor.is_none() {
            self.anchor = Some(self.offset);
        }
        self.offset = offset;
    }

    /// Clears any selection, keeping the caret where it is.
    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// Returns the selected span, if it is not empty.
    pub fn selection(&self) -> Option<Selection> {
        self.anchor
            .map(|anchor| Selection::new(anchor, self.offset))
            .filter(|sel| !sel.is_empty())
    }

    /// Follows an insertion of `len` characters at `at`.
    ///
    /// Offsets at or after the insertion point move forward.
    pub fn shift_for_insert(&mut self, at: usize, len: usize) {
        let shift = |offset: usize| if offset >= at { offset + len } else { offset };
        self.offset = shift(self.offset);
        self.anchor = self.anchor.map(shift);
    }

    /// Follows a deletion of `range`.
    ///
    /// Offsets inside the deleted span collapse onto its start.
    pub fn shift_for_delete(&mut self, range: &Range<usize>) {
        let shift = |offset: usize| {
            if offset <= range.start {
                offset
            } else if offset >= range.end {
                offset - range.len()
            } else {
                range.start
            }
        };
        self.offset = shift(self.offset);
        self.anchor = self.anchor.map(shift);
    }
}
