//! Typing attributes and line justification.
//!
//! ## Learning: `BTreeSet` for Small Ordered Sets
//!
//! The active typing tags are a handful of enum values. A `BTreeSet`
//! keeps them deduplicated and iterates in a stable order, so the marks
//! attached to an insertion come out the same way every time.

use std::collections::BTreeSet;
use std::ops::Range;

use noted_buffer::{BufferResult, Mark, Tag, TagBuffer};

/// Formatting that newly typed text picks up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatState {
    typing: BTreeSet<Tag>,
    justification: Option<Tag>,
}

impl FormatState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips a typing tag and returns whether it is now active.
    ///
    /// Turning on a grouped tag turns its siblings off.
    pub fn toggle_typing(&mut self, tag: Tag) -> bool {
        if self.typing.remove(&tag) {
            return false;
        }
        for sibling in tag.siblings() {
            self.typing.remove(&sibling);
        }
        self.typing.insert(tag);
        true
    }

    pub fn is_typing(&self, tag: Tag) -> bool {
        self.typing.contains(&tag)
    }

    pub fn typing_tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.typing.iter().copied()
    }

    pub fn justification(&self) -> Option<Tag> {
        self.justification
    }

    pub fn latch_justification(&mut self, tag: Option<Tag>) {
        self.justification = tag;
    }

    /// Forgets every active attribute.
    pub fn clear(&mut self) {
        self.typing.clear();
        self.justification = None;
    }

    /// Marks for `len` characters about to be inserted at `offset`.
    ///
    /// Typing tags cover the whole run when `include_typing` is set.
    /// A latched justification covers the first character when the run
    /// starts a line.
    pub fn marks_for(
        &self,
        buffer: &TagBuffer,
        offset: usize,
        len: usize,
        include_typing: bool,
    ) -> BufferResult<Vec<Mark>> {
        if len == 0 {
            return Ok(Vec::new());
        }

        let mut marks = Vec::new();
        if include_typing {
            marks.extend(self.typing.iter().map(|&tag| Mark::new(tag, 0..len)));
        }
        if let Some(tag) = self.justification {
            if buffer.offset_to_position(offset)?.is_line_start() {
                marks.push(Mark::new(tag, 0..1));
            }
        }
        Ok(marks)
    }
}

/// The range that carries line attributes for the line containing `offset`.
///
/// It is the first character of the line, or empty when the line holds
/// at most one character.
pub fn anchor_range(buffer: &TagBuffer, offset: usize) -> BufferResult<Range<usize>> {
    let line = buffer.line_of(offset)?;
    let start = buffer.line_start(line)?;
    if buffer.line_len(line)? <= 1 {
        Ok(start..start)
    } else {
        Ok(start..start + 1)
    }
}
