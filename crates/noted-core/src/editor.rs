//! Editing session for one open note.
//!
//! ## Learning: The Facade Pattern
//!
//! `RichEditor` acts as a facade over the buffer, the undo engine, the
//! list formatter and the typing attributes. External code only talks
//! to `RichEditor`; the components never talk to each other.
//!
//! ## Mutation Dispatch
//!
//! Every buffer mutation made on behalf of a user operation goes through
//! `insert_live` or `delete_live`, which hand the resulting
//! [`Mutation`](noted_buffer::Mutation) to the undo engine first and to the list
//! formatter second. Follow-up edits requested by the formatter go back
//! through the same path, inside the same undo step. Undo and redo write
//! to the buffer directly, so the formatter never sees a replay.

use std::ops::Range;

use noted_buffer::{codec, Action, Caret, Selection, Tag, TagAction, TagBuffer};

use crate::config::{Config, EditorConfig};
use crate::event::{EditorEvent, EventBus};
use crate::format::{anchor_range, FormatState};
use crate::list::{ListEdit, ListFormatter};
use crate::undo::{EditMode, UndoEngine};
use crate::{CoreError, CoreResult};

/// Who asked for a buffer mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// The user, directly; typing attributes and list rules apply
    User,
    /// The list formatter or another compensating edit
    Formatter,
}

/// A rich-text editing session.
///
/// ## Thread Safety
///
/// `RichEditor` is owned by a single thread. Outside observers follow
/// it through [`RichEditor::subscribe`].
pub struct RichEditor {
    /// Text and formatting
    buffer: TagBuffer,

    /// Undo/redo recording and replay
    engine: UndoEngine,

    /// Automatic list continuation
    list: ListFormatter,

    /// Typing attributes and latched justification
    format: FormatState,

    /// Insertion point and selection
    caret: Caret,

    /// Event bus for outside observers
    events: EventBus,

    /// Unsaved changes
    modified: bool,
}

impl RichEditor {
    /// Creates an empty editor with default settings.
    pub fn new() -> Self {
        Self::with_config(&Config::default().editor)
    }

    /// Creates an empty editor with custom settings.
    pub fn with_config(config: &EditorConfig) -> Self {
        Self {
            buffer: TagBuffer::new(),
            engine: UndoEngine::new(config.undo_limit),
            list: ListFormatter::from_config(config),
            format: FormatState::new(),
            caret: Caret::default(),
            events: EventBus::new(),
            modified: false,
        }
    }

    /// Creates an editor holding a serialized document.
    pub fn from_blob(blob: &[u8], config: &EditorConfig) -> CoreResult<Self> {
        let mut editor = Self::with_config(config);
        editor.buffer = codec::deserialize(blob)?;
        Ok(editor)
    }

    // ==================== Queries ====================

    /// Returns the whole plain text.
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Returns the plain text between two offsets.
    ///
    /// A missing `start` means the beginning, a missing `end` the end.
    pub fn text_range(&self, start: Option<usize>, end: Option<usize>) -> CoreResult<String> {
        let start = start.unwrap_or(0);
        let end = end.unwrap_or_else(|| self.buffer.len_chars());
        Ok(self.buffer.slice(start..end)?)
    }

    pub fn len_chars(&self) -> usize {
        self.buffer.len_chars()
    }

    /// Returns the underlying buffer.
    pub fn buffer(&self) -> &TagBuffer {
        &self.buffer
    }

    /// Returns the caret offset.
    pub fn caret(&self) -> usize {
        self.caret.offset
    }

    /// Moves the caret, dropping any selection.
    pub fn set_caret(&mut self, offset: usize) -> CoreResult<()> {
        self.buffer.check_offset(offset)?;
        self.caret.move_to(offset);
        Ok(())
    }

    /// Selects from `anchor` to `offset`; the caret ends at `offset`.
    pub fn select(&mut self, anchor: usize, offset: usize) -> CoreResult<()> {
        self.buffer.check_offset(anchor)?;
        self.buffer.check_offset(offset)?;
        self.caret.move_to(anchor);
        self.caret.select_to(offset);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.caret.clear_selection();
    }

    /// Returns the selection, if anything is selected.
    pub fn selection(&self) -> Option<Selection> {
        self.caret.selection()
    }

    // ==================== Text Editing ====================

    /// Inserts text at an offset as one undo step.
    pub fn insert(&mut self, offset: usize, text: &str) -> CoreResult<()> {
        self.step(|editor| editor.insert_live(offset, text, Origin::User))
    }

    /// Deletes a range as one undo step.
    pub fn delete(&mut self, start: usize, end: usize) -> CoreResult<()> {
        self.step(|editor| editor.delete_live(start..end, Origin::User))
    }

    /// Types one character at the caret, replacing the selection.
    pub fn type_char(&mut self, c: char) -> CoreResult<()> {
        let mut utf8 = [0; 4];
        self.type_text(c.encode_utf8(&mut utf8))
    }

    /// Types a run of text at the caret, replacing the selection.
    pub fn type_text(&mut self, text: &str) -> CoreResult<()> {
        self.step(|editor| {
            if let Some(selection) = editor.caret.selection() {
                editor.caret.clear_selection();
                editor.delete_live(selection.range(), Origin::User)?;
            }
            let offset = editor.caret.offset;
            editor.insert_live(offset, text, Origin::User)
        })
    }

    /// Deletes the selection or the character before the caret.
    pub fn backspace(&mut self) -> CoreResult<()> {
        let range = match self.take_selection() {
            Some(selection) => selection.range(),
            None if self.caret.offset > 0 => self.caret.offset - 1..self.caret.offset,
            None => return Ok(()),
        };
        self.step(|editor| editor.delete_live(range, Origin::User))
    }

    /// Deletes the selection or the character after the caret.
    pub fn delete_forward(&mut self) -> CoreResult<()> {
        let range = match self.take_selection() {
            Some(selection) => selection.range(),
            None if self.caret.offset < self.buffer.len_chars() => {
                self.caret.offset..self.caret.offset + 1
            }
            None => return Ok(()),
        };
        self.step(|editor| editor.delete_live(range, Origin::User))
    }

    // ==================== Formatting ====================

    /// Applies a tag over the selection.
    ///
    /// Does nothing when nothing is selected.
    pub fn apply_tag(&mut self, tag: Tag) -> CoreResult<()> {
        match self.caret.selection() {
            Some(selection) => self.apply_tag_range(tag, selection.range()),
            None => Ok(()),
        }
    }

    /// Applies a tag over a range, clearing its siblings from the range.
    ///
    /// The sibling removals and the apply form one undo step.
    pub fn apply_tag_range(&mut self, tag: Tag, range: Range<usize>) -> CoreResult<()> {
        self.buffer.check_range(&range)?;
        self.step(|editor| {
            for sibling in tag.siblings() {
                for removed in editor.buffer.remove_tag(sibling, range.clone())? {
                    editor
                        .engine
                        .record(Action::RemoveTag(TagAction::new(sibling, removed)));
                }
            }
            for added in editor.buffer.apply_tag(tag, range.clone())? {
                editor
                    .engine
                    .record(Action::ApplyTag(TagAction::new(tag, added)));
            }
            Ok(())
        })
    }

    /// Removes a tag from the selection.
    pub fn remove_tag(&mut self, tag: Tag) -> CoreResult<()> {
        match self.caret.selection() {
            Some(selection) => self.remove_tag_range(tag, selection.range()),
            None => Ok(()),
        }
    }

    /// Removes a tag from a range as one undo step.
    pub fn remove_tag_range(&mut self, tag: Tag, range: Range<usize>) -> CoreResult<()> {
        self.buffer.check_range(&range)?;
        self.step(|editor| {
            for removed in editor.buffer.remove_tag(tag, range.clone())? {
                editor
                    .engine
                    .record(Action::RemoveTag(TagAction::new(tag, removed)));
            }
            Ok(())
        })
    }

    /// Flips a typing attribute, as a toolbar button would.
    ///
    /// With a selection the tag is also applied to it (now active) or
    /// removed from it (now inactive). Justification tags are not
    /// toggled but latched, see [`RichEditor::apply_justification`].
    /// Returns whether the tag is active afterwards.
    pub fn toggle_tag(&mut self, tag: Tag) -> CoreResult<bool> {
        if tag.is_justification() {
            self.apply_justification(tag)?;
            return Ok(true);
        }

        let active = self.format.toggle_typing(tag);
        match (self.caret.selection(), active) {
            (Some(selection), true) => self.apply_tag_range(tag, selection.range())?,
            (Some(selection), false) => self.remove_tag_range(tag, selection.range())?,
            (None, _) => {}
        }
        Ok(active)
    }

    /// Returns whether newly typed text gets `tag`.
    pub fn is_typing(&self, tag: Tag) -> bool {
        self.format.is_typing(tag)
    }

    /// Aligns the caret's line and latches the alignment for new lines.
    pub fn apply_justification(&mut self, tag: Tag) -> CoreResult<()> {
        if !tag.is_justification() {
            return Err(CoreError::InvalidOperation(format!(
                "{tag} is not a justification"
            )));
        }

        let anchor = anchor_range(&self.buffer, self.caret.offset)?;
        self.apply_tag_range(tag, anchor)?;
        self.format.latch_justification(Some(tag));
        self.events.emit(EditorEvent::JustificationLatched(Some(tag)));
        Ok(())
    }

    /// Returns the latched justification.
    pub fn justification(&self) -> Option<Tag> {
        self.format.justification()
    }

    // ==================== Lists ====================

    /// Switches list mode.
    ///
    /// Turning it on starts an item on a new line at the caret, as one
    /// undo step. Turning it off resets the nesting depth.
    pub fn set_list_mode(&mut self, active: bool) -> CoreResult<()> {
        if active == self.list.is_active() {
            return Ok(());
        }

        let level = self.list.indent_level();
        self.list.set_active(active);
        if active {
            let template = self.list.template();
            self.step(|editor| {
                let offset = editor.caret.offset;
                editor.insert_live(offset, "\n", Origin::Formatter)?;
                editor.insert_live(offset + 1, &template, Origin::Formatter)
            })?;
        }

        self.events.emit(EditorEvent::ListModeChanged(active));
        self.notify_indent(level);
        Ok(())
    }

    /// Flips list mode and returns the new state.
    pub fn toggle_list_mode(&mut self) -> CoreResult<bool> {
        let active = !self.list.is_active();
        self.set_list_mode(active)?;
        Ok(active)
    }

    pub fn is_list_active(&self) -> bool {
        self.list.is_active()
    }

    /// Returns the list nesting depth.
    pub fn indent_level(&self) -> usize {
        self.list.indent_level()
    }

    // ==================== History ====================

    /// Undoes the last step. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> CoreResult<bool> {
        let Some(replayed) = self.engine.undo(&mut self.buffer)? else {
            return Ok(false);
        };
        self.after_replay(replayed.caret);
        self.events.emit(EditorEvent::Undone);
        Ok(true)
    }

    /// Redoes the last undone step. Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> CoreResult<bool> {
        let Some(replayed) = self.engine.redo(&mut self.buffer)? else {
            return Ok(false);
        };
        self.after_replay(replayed.caret);
        self.events.emit(EditorEvent::Redone);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        self.engine.history().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.engine.history().can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.engine.history().undo_count()
    }

    pub fn redo_depth(&self) -> usize {
        self.engine.history().redo_count()
    }

    /// Returns what the undo engine is doing.
    pub fn mode(&self) -> EditMode {
        self.engine.mode()
    }

    // ==================== Persistence ====================

    /// Serializes the document.
    pub fn serialize(&self) -> CoreResult<Vec<u8>> {
        Ok(codec::serialize(&self.buffer)?)
    }

    /// Replaces the document with a serialized one.
    ///
    /// History, list state, typing attributes and the caret are reset.
    pub fn load(&mut self, blob: &[u8]) -> CoreResult<()> {
        let buffer = codec::deserialize(blob)?;
        tracing::debug!(chars = buffer.len_chars(), "document loaded");

        self.buffer = buffer;
        self.engine.reset();
        self.list.reset();
        self.format.clear();
        self.caret = Caret::default();
        self.modified = false;
        self.events.emit(EditorEvent::Loaded);
        Ok(())
    }

    /// Returns true if the document changed since it was loaded or saved.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    // ==================== Events ====================

    /// Subscribes to editor events.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<EditorEvent> {
        self.events.subscribe()
    }

    fn notify_indent(&self, before: usize) {
        let level = self.list.indent_level();
        if level != before {
            self.events.emit(EditorEvent::IndentLevelChanged(level));
        }
    }

    // ==================== Internals ====================

    /// Runs `op` inside an undo step.
    ///
    /// Nested calls join the step that is already open.
    fn step<T>(&mut self, op: impl FnOnce(&mut Self) -> CoreResult<T>) -> CoreResult<T> {
        let opened = self.engine.begin_step();
        let result = op(self);
        if opened && self.engine.end_step() {
            self.modified = true;
            self.events.emit(EditorEvent::Edited {
                undo_depth: self.undo_depth(),
            });
        }
        result
    }

    /// Inserts text and notifies the undo engine and the list formatter.
    fn insert_live(&mut self, offset: usize, text: &str, origin: Origin) -> CoreResult<()> {
        self.buffer.check_offset(offset)?;
        if text.is_empty() {
            return Ok(());
        }

        let len = text.chars().count();
        let marks = self
            .format
            .marks_for(&self.buffer, offset, len, origin == Origin::User)?;
        let caret = self.caret.offset;

        let mutation = self.buffer.insert(offset, text)?;
        self.buffer.apply_marks(offset, &marks)?;
        self.caret.shift_for_insert(offset, len);
        self.engine.observe(&mutation, caret, marks);

        if origin == Origin::User {
            let level = self.list.indent_level();
            let edits = self.list.on_inserted(&self.buffer, offset, text)?;
            self.apply_list_edits(edits)?;
            self.notify_indent(level);
        }
        Ok(())
    }

    /// Deletes a range and notifies the undo engine and the list formatter.
    fn delete_live(&mut self, range: Range<usize>, origin: Origin) -> CoreResult<()> {
        self.buffer.check_range(&range)?;
        if range.is_empty() {
            return Ok(());
        }

        let level = self.list.indent_level();
        if origin == Origin::User {
            self.list.before_delete(&self.buffer, range.clone())?;
        }
        let caret = self.caret.offset;

        let mutation = self.buffer.delete(range.clone())?;
        self.caret.shift_for_delete(&range);
        self.engine.observe(&mutation, caret, Vec::new());

        if origin == Origin::User {
            if let Some(edit) = self.list.after_delete() {
                self.apply_list_edits(vec![edit])?;
            }
            self.notify_indent(level);
        }
        Ok(())
    }

    fn apply_list_edits(&mut self, edits: Vec<ListEdit>) -> CoreResult<()> {
        for edit in edits {
            match edit {
                ListEdit::Insert { offset, text } => {
                    self.insert_live(offset, &text, Origin::Formatter)?
                }
                ListEdit::Delete { range } => self.delete_live(range, Origin::Formatter)?,
            }
        }
        Ok(())
    }

    fn take_selection(&mut self) -> Option<Selection> {
        let selection = self.caret.selection();
        self.caret.clear_selection();
        selection
    }

    fn after_replay(&mut self, caret: Option<usize>) {
        self.modified = true;
        let len = self.buffer.len_chars();
        match caret {
            Some(offset) => self.caret.move_to(offset.min(len)),
            None if self.caret.offset > len => {
                tracing::warn!(offset = self.caret.offset, len, "caret clamped after replay");
                self.caret.move_to(len);
            }
            None => {}
        }
    }
}

impl Default for RichEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RichEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RichEditor")
            .field("chars", &self.buffer.len_chars())
            .field("caret", &self.caret)
            .field("undo_depth", &self.undo_depth())
            .field("redo_depth", &self.redo_depth())
            .field("list", &self.list.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use noted_buffer::TagRegion;

    fn typed(text: &str) -> RichEditor {
        let mut editor = RichEditor::new();
        for c in text.chars() {
            editor.type_char(c).unwrap();
        }
        editor
    }

    #[test]
    fn test_typing_moves_caret() {
        let editor = typed("hi");
        assert_eq!(editor.text(), "hi");
        assert_eq!(editor.caret(), 2);
        assert!(editor.is_modified());
    }

    #[test]
    fn test_typing_a_word_is_one_step() {
        let mut editor = typed("cat");
        assert_eq!(editor.undo_depth(), 1);
        assert!(editor.undo().unwrap());
        assert_eq!(editor.text(), "");
        assert_eq!(editor.caret(), 0);
    }

    #[test]
    fn test_space_starts_new_step() {
        let mut editor = typed("ab cd");
        assert_eq!(editor.undo_depth(), 3);
        editor.undo().unwrap();
        assert_eq!(editor.text(), "ab ");
        editor.undo().unwrap();
        assert_eq!(editor.text(), "ab");
    }

    #[test]
    fn test_backspaces_merge() {
        let mut editor = typed("hello");
        editor.backspace().unwrap();
        editor.backspace().unwrap();
        assert_eq!(editor.text(), "hel");
        assert_eq!(editor.undo_depth(), 2);

        editor.undo().unwrap();
        assert_eq!(editor.text(), "hello");
        assert_eq!(editor.caret(), 3);
    }

    #[test]
    fn test_forward_delete_undo_puts_caret_after() {
        let mut editor = RichEditor::new();
        editor.insert(0, "abc").unwrap();
        editor.set_caret(0).unwrap();
        editor.delete_forward().unwrap();
        editor.delete_forward().unwrap();
        assert_eq!(editor.text(), "c");

        editor.undo().unwrap();
        assert_eq!(editor.text(), "abc");
        assert_eq!(editor.caret(), 2);
    }

    #[test]
    fn test_backspace_at_start_does_nothing() {
        let mut editor = RichEditor::new();
        editor.backspace().unwrap();
        editor.delete_forward().unwrap();
        assert_eq!(editor.undo_depth(), 0);
        assert!(!editor.is_modified());
    }

    #[test]
    fn test_typing_replaces_selection() {
        let mut editor = RichEditor::new();
        editor.insert(0, "hello world").unwrap();
        editor.select(0, 5).unwrap();
        editor.type_char('J').unwrap();
        assert_eq!(editor.text(), "J world");
        assert_eq!(editor.caret(), 1);

        editor.undo().unwrap();
        assert_eq!(editor.text(), "hello world");
    }

    #[test]
    fn test_out_of_range_leaves_buffer_unchanged() {
        let mut editor = typed("abc");
        assert!(editor.insert(9, "x").is_err());
        assert!(editor.delete(2, 1).is_err());
        assert!(editor.apply_tag_range(Tag::Bold, 0..7).is_err());
        assert_eq!(editor.text(), "abc");
        assert_eq!(editor.undo_depth(), 1);
    }

    #[test]
    fn test_text_range() {
        let editor = typed("abcdef");
        assert_eq!(editor.text_range(Some(2), None).unwrap(), "cdef");
        assert_eq!(editor.text_range(None, Some(2)).unwrap(), "ab");
        assert_eq!(editor.text_range(Some(1), Some(3)).unwrap(), "bc");
        assert!(editor.text_range(Some(4), Some(2)).is_err());
    }

    #[test]
    fn test_apply_tag_is_one_step() {
        let mut editor = typed("bold");
        editor.apply_tag_range(Tag::Bold, 0..4).unwrap();
        assert!(editor.buffer().has_tag(Tag::Bold, 0..4));
        assert_eq!(editor.undo_depth(), 2);

        editor.undo().unwrap();
        assert!(editor.buffer().regions().is_empty());
        assert_eq!(editor.text(), "bold");
        assert_eq!(editor.caret(), 4);

        editor.redo().unwrap();
        assert!(editor.buffer().has_tag(Tag::Bold, 0..4));
    }

    #[test]
    fn test_reapplying_tag_records_nothing() {
        let mut editor = typed("word");
        editor.apply_tag_range(Tag::Italic, 0..4).unwrap();
        editor.apply_tag_range(Tag::Italic, 1..3).unwrap();
        assert_eq!(editor.undo_depth(), 2);
    }

    #[test]
    fn test_heading_tags_exclude_each_other() {
        let mut editor = typed("Heading");
        editor.apply_tag_range(Tag::Title, 0..7).unwrap();
        editor.apply_tag_range(Tag::Header, 0..7).unwrap();
        assert_eq!(
            editor.buffer().regions(),
            vec![TagRegion::new(Tag::Header, 0..7)]
        );

        editor.undo().unwrap();
        assert_eq!(
            editor.buffer().regions(),
            vec![TagRegion::new(Tag::Title, 0..7)]
        );
    }

    #[test]
    fn test_toggle_with_selection() {
        let mut editor = typed("some text");
        editor.select(0, 4).unwrap();
        assert!(editor.toggle_tag(Tag::Underline).unwrap());
        assert!(editor.buffer().has_tag(Tag::Underline, 0..4));

        assert!(!editor.toggle_tag(Tag::Underline).unwrap());
        assert!(editor.buffer().regions().is_empty());
    }

    #[test]
    fn test_typing_attributes_follow_text_through_redo() {
        let mut editor = RichEditor::new();
        editor.toggle_tag(Tag::Bold).unwrap();
        for c in "hey".chars() {
            editor.type_char(c).unwrap();
        }
        assert!(editor.buffer().has_tag(Tag::Bold, 0..3));
        assert_eq!(editor.undo_depth(), 1);

        editor.undo().unwrap();
        assert!(editor.buffer().regions().is_empty());
        editor.redo().unwrap();
        assert_eq!(editor.text(), "hey");
        assert!(editor.buffer().has_tag(Tag::Bold, 0..3));
    }

    #[test]
    fn test_typing_header_inside_title_replaces_it() {
        let mut editor = typed("Title");
        editor.apply_tag_range(Tag::Title, 0..5).unwrap();
        editor.set_caret(2).unwrap();
        editor.toggle_tag(Tag::Header).unwrap();
        editor.type_char('x').unwrap();

        let typed_over = vec![
            TagRegion::new(Tag::Title, 0..2),
            TagRegion::new(Tag::Title, 3..6),
            TagRegion::new(Tag::Header, 2..3),
        ];
        assert_eq!(editor.buffer().tags_at(2), vec![Tag::Header]);
        assert_eq!(editor.buffer().regions(), typed_over);

        editor.undo().unwrap();
        assert_eq!(editor.text(), "Title");
        assert_eq!(
            editor.buffer().regions(),
            vec![TagRegion::new(Tag::Title, 0..5)]
        );

        editor.redo().unwrap();
        assert_eq!(editor.text(), "Tixtle");
        assert_eq!(editor.buffer().regions(), typed_over);
    }

    #[test]
    fn test_justification_rejects_other_tags() {
        let mut editor = RichEditor::new();
        assert!(matches!(
            editor.apply_justification(Tag::Bold),
            Err(CoreError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_justification_tags_line_anchor() {
        let mut editor = typed("one\ntwo");
        editor.apply_justification(Tag::JustRight).unwrap();
        assert_eq!(
            editor.buffer().regions(),
            vec![TagRegion::new(Tag::JustRight, 4..5)]
        );
        assert_eq!(editor.justification(), Some(Tag::JustRight));
    }

    #[test]
    fn test_latched_justification_marks_new_lines() {
        let mut editor = typed("a");
        editor.apply_justification(Tag::JustCenter).unwrap();
        editor.type_char('\n').unwrap();
        editor.type_char('b').unwrap();
        assert!(editor.buffer().has_tag(Tag::JustCenter, 2..3));
    }

    #[test]
    fn test_list_mode_starts_item() {
        let mut editor = typed("Groceries");
        editor.set_list_mode(true).unwrap();
        assert_eq!(editor.text(), "Groceries\n\t- ");
        assert_eq!(editor.caret(), 13);

        editor.undo().unwrap();
        assert_eq!(editor.text(), "Groceries");
    }

    #[test]
    fn test_newline_in_list_is_one_step() {
        let mut editor = RichEditor::new();
        editor.set_list_mode(true).unwrap();
        for c in "milk\n".chars() {
            editor.type_char(c).unwrap();
        }
        assert_eq!(editor.text(), "\n\t- milk\n\t- ");

        editor.undo().unwrap();
        assert_eq!(editor.text(), "\n\t- milk");
        assert_eq!(editor.caret(), 8);
    }

    #[test]
    fn test_tab_reindents_item() {
        let mut editor = RichEditor::new();
        editor.set_list_mode(true).unwrap();
        editor.type_char('\t').unwrap();
        assert_eq!(editor.text(), "\n\t\t- ");
        assert_eq!(editor.indent_level(), 2);
        assert_eq!(editor.caret(), 5);

        editor.undo().unwrap();
        assert_eq!(editor.text(), "\n\t- ");
        // Formatter state is not part of the history
        assert_eq!(editor.indent_level(), 2);
    }

    #[test]
    fn test_deleting_indent_outdents() {
        let mut editor = RichEditor::new();
        editor.set_list_mode(true).unwrap();
        editor.type_char('\t').unwrap();
        // "\n\t\t- " with the caret after the marker
        editor.backspace().unwrap();
        editor.backspace().unwrap();
        editor.backspace().unwrap();
        assert_eq!(editor.text(), "\n\t- ");
        assert_eq!(editor.indent_level(), 1);
    }

    #[test]
    fn test_leaving_list_mode_resets_level() {
        let mut editor = RichEditor::new();
        editor.set_list_mode(true).unwrap();
        editor.type_char('\t').unwrap();
        editor.set_list_mode(false).unwrap();
        assert_eq!(editor.indent_level(), 1);
        assert!(!editor.is_list_active());

        editor.type_char('\n').unwrap();
        assert!(editor.text().ends_with('\n'));
    }

    #[test]
    fn test_undo_on_empty_history() {
        let mut editor = RichEditor::new();
        assert!(!editor.undo().unwrap());
        assert!(!editor.redo().unwrap());
    }

    #[test]
    fn test_new_edit_clears_redo() {
        let mut editor = typed("ab");
        editor.undo().unwrap();
        assert!(editor.can_redo());
        editor.type_char('x').unwrap();
        assert!(!editor.can_redo());
    }

    #[test]
    fn test_load_resets_session() {
        let mut source = typed("saved");
        source.apply_tag_range(Tag::Bold, 0..5).unwrap();
        let blob = source.serialize().unwrap();

        let mut editor = typed("scratch");
        editor.set_list_mode(true).unwrap();
        editor.load(&blob).unwrap();

        assert_eq!(editor.text(), "saved");
        assert!(editor.buffer().has_tag(Tag::Bold, 0..5));
        assert!(!editor.can_undo());
        assert!(!editor.is_list_active());
        assert!(!editor.is_modified());
        assert_eq!(editor.caret(), 0);
    }

    #[test]
    fn test_mode_is_idle_between_operations() {
        let mut editor = typed("x");
        assert_eq!(editor.mode(), EditMode::Idle);
        editor.undo().unwrap();
        assert_eq!(editor.mode(), EditMode::Idle);
    }

    #[tokio::test]
    async fn test_edits_are_published() {
        let mut editor = RichEditor::new();
        let mut rx = editor.subscribe();

        editor.type_char('a').unwrap();
        editor.undo().unwrap();

        assert_eq!(
            rx.recv().await.unwrap(),
            EditorEvent::Edited { undo_depth: 1 }
        );
        assert_eq!(rx.recv().await.unwrap(), EditorEvent::Undone);
    }
}
