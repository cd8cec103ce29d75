//! Undo/redo history management.
//!
//! ## Learning: The Command Pattern
//!
//! Each recorded change is an [`Action`] that can be:
//! - Undone (its inverse applied to the buffer)
//! - Redone (re-applied after undo)
//!
//! Actions are collected into [`UndoStep`]s, one per user operation,
//! so a keystroke and everything it caused come back together.
//! Consecutive single-character steps are folded into one by the
//! pure [`merge`] function, so undo removes a word, not a letter.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::ops::Range;

use crate::Tag;

/// Returns true for the characters that separate words for merging.
pub fn is_word_break(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

/// A tag carried by inserted text, relative to the insertion offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    pub tag: Tag,
    pub start: usize,
    pub end: usize,
}

impl Mark {
    pub fn new(tag: Tag, range: Range<usize>) -> Self {
        Self {
            tag,
            start: range.start,
            end: range.end,
        }
    }

    /// Returns the absolute range of this mark for text inserted at `offset`.
    pub fn at(&self, offset: usize) -> Range<usize> {
        offset + self.start..offset + self.end
    }
}

/// Text was inserted at `offset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertAction {
    pub offset: usize,
    pub text: String,
    /// Only single-character insertions start out mergeable
    pub mergeable: bool,
    /// Formatting applied together with the text
    pub marks: Vec<Mark>,
}

impl InsertAction {
    pub fn new(offset: usize, text: impl Into<String>) -> Self {
        let text = text.into();
        let mergeable = text.chars().count() == 1;
        Self {
            offset,
            text,
            mergeable,
            marks: Vec::new(),
        }
    }

    pub fn with_marks(mut self, marks: Vec<Mark>) -> Self {
        self.marks = marks;
        self
    }

    /// Length of the inserted text in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Offset just past the inserted text.
    pub fn end(&self) -> usize {
        self.offset + self.len()
    }
}

/// Text was removed from `start..end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAction {
    pub start: usize,
    pub end: usize,
    pub text: String,
    /// Tags covering the first removed character
    pub tags_at_start: Vec<Tag>,
    /// Formatting of the removed text relative to `start`, restored on undo
    pub regions: Vec<Mark>,
    /// The caret sat after `start` when the deletion happened
    pub caused_by_backspace: bool,
    pub mergeable: bool,
}

impl DeleteAction {
    pub fn new(
        start: usize,
        text: impl Into<String>,
        tags_at_start: Vec<Tag>,
        caused_by_backspace: bool,
    ) -> Self {
        let text = text.into();
        let len = text.chars().count();
        let mergeable = len == 1 && !matches!(text.as_str(), "\n" | "\r" | " ");
        Self {
            start,
            end: start + len,
            text,
            tags_at_start,
            regions: Vec::new(),
            caused_by_backspace,
            mergeable,
        }
    }

    pub fn with_regions(mut self, regions: Vec<Mark>) -> Self {
        self.regions = regions;
        self
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A tag was applied to or removed from `start..end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagAction {
    pub tag: Tag,
    pub start: usize,
    pub end: usize,
}

impl TagAction {
    pub fn new(tag: Tag, range: Range<usize>) -> Self {
        Self {
            tag,
            start: range.start,
            end: range.end,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// The unit of undo/redo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Insert(InsertAction),
    Delete(DeleteAction),
    ApplyTag(TagAction),
    RemoveTag(TagAction),
}

impl Action {
    /// Returns true if this action may be folded with a neighbour.
    pub fn is_mergeable(&self) -> bool {
        match self {
            Action::Insert(insert) => insert.mergeable,
            Action::Delete(delete) => delete.mergeable,
            Action::ApplyTag(_) | Action::RemoveTag(_) => false,
        }
    }
}

/// Folds `cur` into `prev` when both describe one logical edit.
///
/// `prev` happened first. Returns `None` when the two must stay
/// separate undo steps; mismatched kinds are never an error.
pub fn merge(prev: &Action, cur: &Action) -> Option<Action> {
    match (prev, cur) {
        (Action::Insert(prev), Action::Insert(cur)) => merge_inserts(prev, cur).map(Action::Insert),
        (Action::Delete(prev), Action::Delete(cur)) => merge_deletes(prev, cur).map(Action::Delete),
        _ => None,
    }
}

fn merge_inserts(prev: &InsertAction, cur: &InsertAction) -> Option<InsertAction> {
    if !prev.mergeable || !cur.mergeable {
        return None;
    }
    if cur.offset != prev.end() {
        return None;
    }
    let last = prev.text.chars().last()?;
    let first = cur.text.chars().next()?;
    if is_word_break(last) != is_word_break(first) {
        return None;
    }

    let mut marks = prev.marks.clone();
    marks.extend(shifted(&cur.marks, prev.len()));

    Some(InsertAction {
        offset: prev.offset,
        text: format!("{}{}", prev.text, cur.text),
        mergeable: true,
        marks,
    })
}

fn merge_deletes(prev: &DeleteAction, cur: &DeleteAction) -> Option<DeleteAction> {
    if !prev.mergeable || !cur.mergeable {
        return None;
    }
    if prev.caused_by_backspace != cur.caused_by_backspace {
        return None;
    }

    // Forward deletes keep hitting the same offset; backspaces walk left.
    let forward = prev.start == cur.start;
    if !forward && prev.start != cur.end {
        return None;
    }

    let cur_char = cur.text.chars().next()?;
    let neighbour = if forward {
        prev.text.chars().last()?
    } else {
        prev.text.chars().next()?
    };
    if is_word_break(cur_char) != is_word_break(neighbour) {
        return None;
    }

    let merged = if forward {
        DeleteAction {
            start: prev.start,
            end: prev.end + (cur.end - cur.start),
            text: format!("{}{}", prev.text, cur.text),
            tags_at_start: prev.tags_at_start.clone(),
            regions: prev
                .regions
                .iter()
                .cloned()
                .chain(shifted(&cur.regions, prev.end - prev.start))
                .collect(),
            caused_by_backspace: prev.caused_by_backspace,
            mergeable: true,
        }
    } else {
        DeleteAction {
            start: cur.start,
            end: prev.end,
            text: format!("{}{}", cur.text, prev.text),
            tags_at_start: cur.tags_at_start.clone(),
            regions: cur
                .regions
                .iter()
                .cloned()
                .chain(shifted(&prev.regions, cur.end - cur.start))
                .collect(),
            caused_by_backspace: prev.caused_by_backspace,
            mergeable: true,
        }
    };
    Some(merged)
}

fn shifted(marks: &[Mark], by: usize) -> impl Iterator<Item = Mark> + '_ {
    marks
        .iter()
        .map(move |mark| Mark::new(mark.tag, mark.start + by..mark.end + by))
}

/// The actions of one user operation, in the order they happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoStep {
    actions: Vec<Action>,
}

impl UndoStep {
    /// Creates a step holding a single action.
    pub fn new(action: Action) -> Self {
        Self {
            actions: vec![action],
        }
    }

    /// Creates a step from recorded actions; `None` if nothing was recorded.
    pub fn from_actions(actions: Vec<Action>) -> Option<Self> {
        (!actions.is_empty()).then_some(Self { actions })
    }

    /// Adds an action to this step.
    pub fn push(&mut self, action: Action) {
        self.actions.push(action);
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Returns the action if this step holds exactly one.
    pub fn single(&self) -> Option<&Action> {
        match self.actions.as_slice() {
            [action] => Some(action),
            _ => None,
        }
    }
}

/// The undo and redo stacks.
///
/// ## Design Decisions
///
/// 1. **Bounded history**: Limits memory usage for long editing sessions
/// 2. **Step merging**: Consecutive keystrokes within a word become one step
/// 3. **Composite steps**: Side effects are undone with their cause
///
/// ## Learning: VecDeque
///
/// We use `VecDeque` instead of `Vec` because we need efficient:
/// - Push to back (new steps)
/// - Pop from front (when at capacity)
/// - Pop from back (for undo)
#[derive(Debug, Clone)]
pub struct History {
    /// Stack of undoable steps, most recent at the back
    undo_stack: VecDeque<UndoStep>,
    /// Stack of redoable steps, most recent at the end
    redo_stack: Vec<UndoStep>,
    /// Maximum number of steps to keep
    max_size: usize,
}

impl History {
    /// Creates a new history with the given capacity.
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(max_size.min(1024)),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
        }
    }

    /// Records a new step.
    ///
    /// Clears the redo stack (branching history is not supported) and
    /// folds the step into the previous one when both hold a single
    /// mergeable action.
    pub fn push(&mut self, step: UndoStep) {
        self.redo_stack.clear();

        if let Some(top) = self.undo_stack.back_mut() {
            if let (Some(prev), Some(cur)) = (top.single(), step.single()) {
                if let Some(merged) = merge(prev, cur) {
                    tracing::trace!("merged action into top undo step");
                    *top = UndoStep::new(merged);
                    return;
                }
            }
        }

        self.push_undo(step);
    }

    /// Pops the most recent undoable step.
    pub fn pop_undo(&mut self) -> Option<UndoStep> {
        self.undo_stack.pop_back()
    }

    /// Pops the most recent redoable step.
    pub fn pop_redo(&mut self) -> Option<UndoStep> {
        self.redo_stack.pop()
    }

    /// Pushes a step that was just undone.
    pub fn push_redo(&mut self, step: UndoStep) {
        self.redo_stack.push(step);
    }

    /// Pushes a step without merging and without touching the redo stack.
    pub fn push_undo(&mut self, step: UndoStep) {
        self.undo_stack.push_back(step);

        // Enforce capacity
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.pop_front();
        }
    }

    /// Returns the most recent undoable step.
    pub fn last_undo(&self) -> Option<&UndoStep> {
        self.undo_stack.back()
    }

    /// Returns the most recent redoable step.
    pub fn last_redo(&self) -> Option<&UndoStep> {
        self.redo_stack.last()
    }

    /// Returns true if there are steps to undo.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are steps to redo.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clears all history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Returns the number of undo steps available.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Returns the number of redo steps available.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(1000)
    }
}
