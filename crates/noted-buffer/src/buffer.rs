//! Core rich-text buffer implementation using a rope.
//!
//! ## Why Rope?
//!
//! Traditional text editors use gap buffers or arrays, but ropes excel at:
//! - **Large notes**: O(log n) insertions/deletions vs O(n) for arrays
//! - **Offset math**: char <-> line conversions without rescanning
//!
//! ## Learning: Events Are Values
//!
//! Every successful mutation returns a [`Mutation`] describing what
//! changed. The owner of the buffer hands that value to whoever needs
//! to observe it (history, list formatting) in a fixed order, instead
//! of the buffer holding callbacks into its observers.

use ropey::Rope;
use std::ops::Range;

use crate::history::Mark;
use crate::regions::{TagRegion, TagRegions};
use crate::{BufferError, BufferResult, Position, Tag};

/// A change to the character sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// `text` now starts at `offset`
    Inserted { offset: usize, text: String },
    /// `text` used to occupy `start..end`
    Deleted {
        start: usize,
        end: usize,
        text: String,
        /// Tags that covered the first deleted character
        tags_at_start: Vec<Tag>,
        /// Formatting of the removed text, relative to `start`
        regions: Vec<Mark>,
    },
}

impl Mutation {
    /// Number of characters inserted or removed.
    pub fn len(&self) -> usize {
        match self {
            Mutation::Inserted { text, .. } => text.chars().count(),
            Mutation::Deleted { start, end, .. } => end - start,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The inserted or removed text.
    pub fn text(&self) -> &str {
        match self {
            Mutation::Inserted { text, .. } | Mutation::Deleted { text, .. } => text,
        }
    }
}

/// A character sequence with formatting regions.
///
/// Offsets count Unicode scalar values, never bytes.
#[derive(Debug, Clone, Default)]
pub struct TagBuffer {
    /// The rope holding our text content
    rope: Rope,

    /// Formatting attached to the text
    regions: TagRegions,
}

impl TagBuffer {
    /// Creates a new empty buffer.
    ///
    /// # Example
    /// ```
    /// use noted_buffer::TagBuffer;
    ///
    /// let buffer = TagBuffer::new();
    /// assert!(buffer.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a buffer from text and regions, validating every region.
    pub fn from_parts(text: &str, regions: &[TagRegion]) -> BufferResult<Self> {
        let mut buffer = Self::from(text);
        for region in regions {
            buffer.check_range(&region.range())?;
            buffer.regions.apply(region.tag, region.range());
        }
        Ok(buffer)
    }

    // ==================== Text Access ====================

    /// Returns the entire text content.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Returns the text in a character range.
    pub fn slice(&self, range: Range<usize>) -> BufferResult<String> {
        self.check_range(&range)?;
        Ok(self.rope.slice(range).to_string())
    }

    /// Returns the character at an offset.
    pub fn char_at(&self, offset: usize) -> Option<char> {
        (offset < self.len_chars()).then(|| self.rope.char(offset))
    }

    // ==================== Measurements ====================

    /// Returns true if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Returns the number of characters in the buffer.
    #[inline]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Returns the number of lines in the buffer.
    ///
    /// An empty buffer has 1 line. A buffer ending with `\n` counts
    /// the empty line after it.
    #[inline]
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// Returns the line containing `offset`.
    pub fn line_of(&self, offset: usize) -> BufferResult<usize> {
        self.check_offset(offset)?;
        Ok(self.rope.char_to_line(offset))
    }

    /// Returns the offset of the first character of a line.
    pub fn line_start(&self, line_idx: usize) -> BufferResult<usize> {
        self.check_line(line_idx)?;
        Ok(self.rope.line_to_char(line_idx))
    }

    /// Returns the length of a line in characters, including its line break.
    pub fn line_len(&self, line_idx: usize) -> BufferResult<usize> {
        self.check_line(line_idx)?;
        Ok(self.rope.line(line_idx).len_chars())
    }

    /// Returns a line's text without its trailing line break.
    pub fn line_content(&self, line_idx: usize) -> BufferResult<String> {
        self.check_line(line_idx)?;
        let line = self.rope.line(line_idx).to_string();
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }

    // ==================== Mutations ====================

    /// Inserts text at a character offset.
    ///
    /// # Learning: `&mut self`
    ///
    /// This method requires exclusive (mutable) access to the buffer.
    /// Rust's borrow checker ensures no other code can read or write
    /// the buffer while this method executes.
    pub fn insert(&mut self, offset: usize, text: &str) -> BufferResult<Mutation> {
        self.check_offset(offset)?;

        self.rope.insert(offset, text);
        self.regions.shift_for_insert(offset, text.chars().count());

        Ok(Mutation::Inserted {
            offset,
            text: text.to_string(),
        })
    }

    /// Deletes text in a character range.
    ///
    /// The returned mutation carries the removed text, the tags that
    /// covered its first character and every region inside the range.
    pub fn delete(&mut self, range: Range<usize>) -> BufferResult<Mutation> {
        self.check_range(&range)?;

        let text = self.rope.slice(range.clone()).to_string();
        let tags_at_start = if range.is_empty() {
            Vec::new()
        } else {
            self.regions.tags_at(range.start)
        };
        let regions = self
            .regions
            .within(&range)
            .into_iter()
            .map(|region| Mark::new(region.tag, region.start - range.start..region.end - range.start))
            .collect();

        self.rope.remove(range.clone());
        self.regions.shift_for_delete(&range);

        Ok(Mutation::Deleted {
            start: range.start,
            end: range.end,
            text,
            tags_at_start,
            regions,
        })
    }

    /// Applies a tag over a range.
    ///
    /// Returns the sub-ranges that gained the tag.
    pub fn apply_tag(&mut self, tag: Tag, range: Range<usize>) -> BufferResult<Vec<Range<usize>>> {
        self.check_range(&range)?;
        Ok(self.regions.apply(tag, range))
    }

    /// Removes a tag from a range.
    ///
    /// Returns the sub-ranges that lost the tag.
    pub fn remove_tag(&mut self, tag: Tag, range: Range<usize>) -> BufferResult<Vec<Range<usize>>> {
        self.check_range(&range)?;
        Ok(self.regions.remove(tag, range))
    }

    /// Applies the marks of text inserted at `offset`.
    ///
    /// A grouped tag first strips its siblings from the marked range,
    /// since inserted text may have joined a sibling's region.
    pub fn apply_marks(&mut self, offset: usize, marks: &[Mark]) -> BufferResult<()> {
        for mark in marks {
            self.check_range(&mark.at(offset))?;
        }
        for mark in marks {
            let range = mark.at(offset);
            for sibling in mark.tag.siblings() {
                self.regions.remove(sibling, range.clone());
            }
            self.regions.apply(mark.tag, range);
        }
        Ok(())
    }

    /// Replaces all formatting inside `range` with `marks`.
    ///
    /// Marks are relative to `range.start`.
    pub fn restore_marks(&mut self, range: Range<usize>, marks: &[Mark]) -> BufferResult<()> {
        self.check_range(&range)?;
        for mark in marks {
            let marked = mark.at(range.start);
            if marked.start < range.start || marked.end > range.end {
                return Err(BufferError::OutOfRange {
                    start: marked.start,
                    end: marked.end,
                    len: self.len_chars(),
                });
            }
        }

        self.regions.clear(&range);
        for mark in marks {
            self.regions.apply(mark.tag, mark.at(range.start));
        }
        Ok(())
    }

    // ==================== Formatting Queries ====================

    /// Returns the tags covering the character at `offset`.
    pub fn tags_at(&self, offset: usize) -> Vec<Tag> {
        self.regions.tags_at(offset)
    }

    /// Returns true if `tag` covers all of a non-empty range.
    pub fn has_tag(&self, tag: Tag, range: Range<usize>) -> bool {
        self.regions.covers(tag, &range)
    }

    /// Returns every tag region, ordered by tag then start.
    pub fn regions(&self) -> Vec<TagRegion> {
        self.regions.regions()
    }

    // ==================== Position Conversion ====================

    /// Converts a Position (line, column) to a character offset.
    ///
    /// # Learning: Bounds Checking
    ///
    /// We validate input before operations to maintain invariants.
    /// This prevents panics and provides meaningful error messages.
    pub fn position_to_offset(&self, pos: Position) -> BufferResult<usize> {
        let line_start = self.line_start(pos.line)?;
        let line_len = self.rope.line(pos.line).len_chars();

        // Allow column to be at end of line (for insertion)
        if pos.column > line_len {
            return Err(BufferError::OutOfRange {
                start: line_start + pos.column,
                end: line_start + pos.column,
                len: self.len_chars(),
            });
        }

        Ok(line_start + pos.column)
    }

    /// Converts a character offset to a Position (line, column).
    pub fn offset_to_position(&self, offset: usize) -> BufferResult<Position> {
        let line = self.line_of(offset)?;
        let column = offset - self.rope.line_to_char(line);
        Ok(Position { line, column })
    }

    // ==================== Validation ====================

    /// Fails unless `offset` lies within `[0, len]`.
    pub fn check_offset(&self, offset: usize) -> BufferResult<()> {
        self.check_range(&(offset..offset))
    }

    /// Fails unless `start <= end` and both lie within `[0, len]`.
    pub fn check_range(&self, range: &Range<usize>) -> BufferResult<()> {
        let len = self.len_chars();
        if range.start > range.end || range.end > len {
            return Err(BufferError::OutOfRange {
                start: range.start,
                end: range.end,
                len,
            });
        }
        Ok(())
    }

    fn check_line(&self, line_idx: usize) -> BufferResult<()> {
        if line_idx >= self.len_lines() {
            return Err(BufferError::LineOutOfRange {
                line: line_idx,
                lines: self.len_lines(),
            });
        }
        Ok(())
    }
}

impl From<&str> for TagBuffer {
    fn from(s: &str) -> Self {
        Self {
            rope: Rope::from_str(s),
            regions: TagRegions::new(),
        }
    }
}

impl From<String> for TagBuffer {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl PartialEq for TagBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.rope == other.rope && self.regions == other.regions
    }
}

impl Eq for TagBuffer {}
