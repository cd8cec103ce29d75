//! # Noted Buffer
//!
//! Rich-text buffer for the Noted editor: a rope of characters with
//! formatting tags laid over ranges of it, plus the undo/redo history
//! that records how it changed.
//!
//! ## Key Concepts for Learning Rust
//!
//! ### Ownership & Borrowing
//! - `TagBuffer` owns the rope and the tag regions
//! - Queries take `&self`, mutations take `&mut self`
//! - Mutations hand back a [`Mutation`] value instead of calling observers
//!
//! ### Memory Safety
//! - Offsets are validated before every mutation
//! - A failed call leaves the buffer exactly as it was

mod buffer;
pub mod codec;
mod cursor;
mod history;
mod regions;
mod selection;
mod tag;

pub use buffer::{Mutation, TagBuffer};
pub use cursor::{Caret, Position};
pub use history::{
    Action, DeleteAction, History, InsertAction, Mark, TagAction, UndoStep, is_word_break, merge,
};
pub use regions::{TagRegion, TagRegions};
pub use selection::Selection;
pub use tag::{ExclusionGroup, Tag};

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("Range {start}..{end} is out of bounds for a buffer of {len} characters")]
    OutOfRange { start: usize, end: usize, len: usize },

    #[error("Line {line} is out of bounds ({lines} lines)")]
    LineOutOfRange { line: usize, lines: usize },

    #[error("Unknown tag: {0}")]
    UnknownTag(String),

    #[error("Unsupported document format version {0}")]
    UnsupportedFormat(u32),

    #[error("Codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_creation() {
        let buffer = TagBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.len_chars(), 0);
        assert!(buffer.regions().is_empty());
    }

    #[test]
    fn test_buffer_from_string() {
        let buffer = TagBuffer::from("Hello, World!");
        assert_eq!(buffer.len_chars(), 13);
        assert_eq!(buffer.text(), "Hello, World!");
    }

    #[test]
    fn test_insert_and_delete() {
        let mut buffer = TagBuffer::new();
        buffer.insert(0, "Hello").unwrap();
        assert_eq!(buffer.text(), "Hello");

        buffer.insert(5, ", World!").unwrap();
        assert_eq!(buffer.text(), "Hello, World!");

        let removed = buffer.delete(5..7).unwrap();
        assert_eq!(removed.text(), ", ");
        assert_eq!(buffer.text(), "HelloWorld!");
    }

    #[test]
    fn test_tags_follow_edits() {
        let mut buffer = TagBuffer::from("plain bold");
        buffer.apply_tag(Tag::Bold, 6..10).unwrap();
        buffer.insert(0, ">> ").unwrap();
        assert!(buffer.has_tag(Tag::Bold, 9..13));
        buffer.delete(0..3).unwrap();
        assert_eq!(buffer.regions(), vec![TagRegion::new(Tag::Bold, 6..10)]);
    }

    #[test]
    fn test_error_messages() {
        let err = BufferError::OutOfRange {
            start: 3,
            end: 9,
            len: 4,
        };
        assert_eq!(
            err.to_string(),
            "Range 3..9 is out of bounds for a buffer of 4 characters"
        );
    }
}
