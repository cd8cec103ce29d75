//! Automatic list continuation and indentation.
//!
//! While list mode is on, the formatter watches live edits and answers
//! with follow-up edits for the editor to perform:
//!
//! - a line break gets the current indentation and a marker after it
//! - a tab typed right after a fresh marker re-indents the item one
//!   level deeper
//! - deleting an indent unit from the prefix steps one level out and
//!   puts the marker back
//!
//! The formatter never mutates the buffer itself. The editor applies
//! the returned [`ListEdit`]s inside the same undo step as the edit that
//! caused them, and never shows the formatter an undo/redo replay.

use noted_buffer::{BufferResult, TagBuffer};
use std::ops::Range;

use crate::config::EditorConfig;

/// An edit requested by the formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEdit {
    Insert { offset: usize, text: String },
    Delete { range: Range<usize> },
}

/// List mode state for one open document.
#[derive(Debug, Clone)]
pub struct ListFormatter {
    active: bool,
    /// Nesting depth of the current item, never below 1
    indent_level: usize,
    /// Where to put the marker back once a pending delete completes
    pending_marker: Option<usize>,
    indent: String,
    marker: String,
}

impl ListFormatter {
    pub fn new(indent: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            active: false,
            indent_level: 1,
            pending_marker: None,
            indent: indent.into(),
            marker: marker.into(),
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        let mut formatter = Self::new(config.indent.as_str(), config.list_marker.as_str());
        formatter.active = config.start_in_list_mode;
        formatter
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn indent_level(&self) -> usize {
        self.indent_level
    }

    /// Switches list mode; leaving it resets the nesting depth.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active {
            self.indent_level = 1;
            self.pending_marker = None;
        }
    }

    /// Turns list mode off and forgets all state.
    pub fn reset(&mut self) {
        self.set_active(false);
    }

    /// Indentation and marker for an item at the current level.
    pub fn template(&self) -> String {
        format!("{}{}", self.indent.repeat(self.indent_level), self.marker)
    }

    /// Reacts to `text` having been inserted at `offset`.
    pub fn on_inserted(
        &mut self,
        buffer: &TagBuffer,
        offset: usize,
        text: &str,
    ) -> BufferResult<Vec<ListEdit>> {
        if !self.active {
            return Ok(Vec::new());
        }

        match text {
            "\n" => Ok(vec![ListEdit::Insert {
                offset: offset + 1,
                text: self.template(),
            }]),
            "\t" => self.reindent(buffer, offset),
            _ => Ok(Vec::new()),
        }
    }

    /// A tab typed right after a fresh marker moves the item one level in.
    fn reindent(&mut self, buffer: &TagBuffer, tab_offset: usize) -> BufferResult<Vec<ListEdit>> {
        let line = buffer.line_of(tab_offset)?;
        let line_start = buffer.line_start(line)?;
        let template = self.template();

        let expected = format!("{template}\t");
        if buffer.line_content(line)? != expected
            || tab_offset != line_start + template.chars().count()
        {
            return Ok(Vec::new());
        }

        self.indent_level += 1;
        tracing::debug!(level = self.indent_level, "list item indented");
        Ok(vec![
            ListEdit::Delete {
                range: tab_offset..tab_offset + 1,
            },
            ListEdit::Insert {
                offset: line_start,
                text: self.indent.clone(),
            },
        ])
    }

    /// Inspects a deletion before it happens.
    ///
    /// Removing one indent unit from within the prefix of a nested item
    /// steps out one level; the marker is restored by [`after_delete`].
    ///
    /// [`after_delete`]: ListFormatter::after_delete
    pub fn before_delete(&mut self, buffer: &TagBuffer, range: Range<usize>) -> BufferResult<()> {
        if !self.active || self.indent_level <= 1 {
            return Ok(());
        }
        if buffer.slice(range.clone())? != self.indent {
            return Ok(());
        }

        let column = buffer.offset_to_position(range.start)?.column;
        if column <= self.indent_level {
            self.indent_level -= 1;
            self.pending_marker = Some(range.start);
            tracing::debug!(level = self.indent_level, "list item outdented");
        }
        Ok(())
    }

    /// Completes a deletion inspected by [`before_delete`].
    ///
    /// [`before_delete`]: ListFormatter::before_delete
    pub fn after_delete(&mut self) -> Option<ListEdit> {
        self.pending_marker.take().map(|offset| ListEdit::Insert {
            offset,
            text: self.marker.clone(),
        })
    }
}

impl Default for ListFormatter {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}
