//! Undo/redo engine.
//!
//! ## Learning: State Machines over Flags
//!
//! Two booleans ("replaying", "suppressed") allow four combinations,
//! one of which is meaningless. [`EditMode`] has exactly the three
//! states the engine can be in, and every transition is a plain
//! assignment in one place.
//!
//! ```text
//!            begin_step              end_step
//!   Idle ───────────────▶ Recording ─────────▶ Idle
//!     │                                          ▲
//!     └──── undo / redo ──▶ Replaying ───────────┘
//! ```

use noted_buffer::{
    Action, BufferResult, DeleteAction, History, InsertAction, Mark, Mutation, TagBuffer, UndoStep,
};

/// What the engine is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    /// Between operations; the next mutation opens a step
    #[default]
    Idle,
    /// A user operation is running; every mutation joins its step
    Recording,
    /// An undo or redo is being applied; nothing is recorded
    Replaying,
}

/// Outcome of a successful undo or redo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Replayed {
    /// Where the caret belongs afterwards, if the step moved text
    pub caret: Option<usize>,
    /// Number of actions applied
    pub actions: usize,
}

/// Records buffer mutations as undo steps and replays them.
#[derive(Debug, Clone)]
pub struct UndoEngine {
    history: History,
    mode: EditMode,
    /// Actions of the step being recorded
    pending: Vec<Action>,
}

impl UndoEngine {
    /// Creates an engine keeping at most `limit` undo steps.
    pub fn new(limit: usize) -> Self {
        Self {
            history: History::new(limit),
            mode: EditMode::Idle,
            pending: Vec::new(),
        }
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Opens a step for a user operation.
    ///
    /// Returns false when a step is already open (the caller is a
    /// nested operation and must not close it) or a replay is running.
    pub fn begin_step(&mut self) -> bool {
        if self.mode != EditMode::Idle {
            return false;
        }
        self.mode = EditMode::Recording;
        self.pending.clear();
        true
    }

    /// Closes the open step and pushes it onto the undo stack.
    ///
    /// Returns true if the step recorded anything.
    pub fn end_step(&mut self) -> bool {
        if self.mode != EditMode::Recording {
            return false;
        }
        self.mode = EditMode::Idle;

        match UndoStep::from_actions(std::mem::take(&mut self.pending)) {
            Some(step) => {
                tracing::trace!(actions = step.len(), "recorded undo step");
                self.history.push(step);
                true
            }
            None => false,
        }
    }

    /// Turns a buffer mutation into an action and records it.
    ///
    /// `caret` is the caret offset at the time of the mutation; a
    /// deletion that starts before the caret came from backspace.
    pub fn observe(&mut self, mutation: &Mutation, caret: usize, marks: Vec<Mark>) {
        let action = match mutation {
            Mutation::Inserted { offset, text } => {
                Action::Insert(InsertAction::new(*offset, text.as_str()).with_marks(marks))
            }
            Mutation::Deleted {
                start,
                text,
                tags_at_start,
                regions,
                ..
            } => Action::Delete(
                DeleteAction::new(*start, text.as_str(), tags_at_start.clone(), caret > *start)
                    .with_regions(regions.clone()),
            ),
        };
        self.record(action);
    }

    /// Records an action into the open step.
    ///
    /// Outside a step the action becomes a step of its own; during a
    /// replay it is dropped.
    pub fn record(&mut self, action: Action) {
        match self.mode {
            EditMode::Recording => self.pending.push(action),
            EditMode::Idle => self.history.push(UndoStep::new(action)),
            EditMode::Replaying => {
                tracing::trace!("ignoring mutation during replay");
            }
        }
    }

    /// Reverts the most recent step.
    ///
    /// Returns `Ok(None)` when there is nothing to undo or another
    /// operation is still running.
    pub fn undo(&mut self, buffer: &mut TagBuffer) -> BufferResult<Option<Replayed>> {
        if self.mode != EditMode::Idle {
            return Ok(None);
        }
        let Some(step) = self.history.pop_undo() else {
            return Ok(None);
        };
        tracing::debug!(actions = step.len(), "undo");

        self.mode = EditMode::Replaying;
        let result = step
            .actions()
            .iter()
            .rev()
            .try_fold(None, |caret, action| -> BufferResult<Option<usize>> {
                Ok(apply_inverse(buffer, action)?.or(caret))
            });
        self.mode = EditMode::Idle;

        let actions = step.len();
        self.history.push_redo(step);
        result.map(|caret| Some(Replayed { caret, actions }))
    }

    /// Re-applies the most recently undone step.
    pub fn redo(&mut self, buffer: &mut TagBuffer) -> BufferResult<Option<Replayed>> {
        if self.mode != EditMode::Idle {
            return Ok(None);
        }
        let Some(step) = self.history.pop_redo() else {
            return Ok(None);
        };
        tracing::debug!(actions = step.len(), "redo");

        self.mode = EditMode::Replaying;
        let result = step
            .actions()
            .iter()
            .try_fold(None, |caret, action| -> BufferResult<Option<usize>> {
                Ok(apply_forward(buffer, action)?.or(caret))
            });
        self.mode = EditMode::Idle;

        let actions = step.len();
        self.history.push_undo(step);
        result.map(|caret| Some(Replayed { caret, actions }))
    }

    /// Drops all history and returns to `Idle`.
    pub fn reset(&mut self) {
        self.history.clear();
        self.pending.clear();
        self.mode = EditMode::Idle;
    }
}

impl Default for UndoEngine {
    fn default() -> Self {
        Self::new(1000)
    }
}

/// Applies the opposite of `action`; returns the caret it implies.
fn apply_inverse(buffer: &mut TagBuffer, action: &Action) -> BufferResult<Option<usize>> {
    match action {
        Action::Insert(insert) => {
            buffer.delete(insert.offset..insert.end())?;
            Ok(Some(insert.offset))
        }
        Action::Delete(delete) => {
            // The text may land inside a region the delete joined up.
            buffer.insert(delete.start, &delete.text)?;
            buffer.restore_marks(delete.range(), &delete.regions)?;
            Ok(Some(if delete.caused_by_backspace {
                delete.start
            } else {
                delete.end
            }))
        }
        Action::ApplyTag(tag) => {
            buffer.remove_tag(tag.tag, tag.range())?;
            Ok(None)
        }
        Action::RemoveTag(tag) => {
            buffer.apply_tag(tag.tag, tag.range())?;
            Ok(None)
        }
    }
}

/// Applies `action` as originally recorded; returns the caret it implies.
fn apply_forward(buffer: &mut TagBuffer, action: &Action) -> BufferResult<Option<usize>> {
    match action {
        Action::Insert(insert) => {
            buffer.insert(insert.offset, &insert.text)?;
            buffer.apply_marks(insert.offset, &insert.marks)?;
            Ok(Some(insert.end()))
        }
        Action::Delete(delete) => {
            buffer.delete(delete.range())?;
            Ok(Some(delete.start))
        }
        Action::ApplyTag(tag) => {
            buffer.apply_tag(tag.tag, tag.range())?;
            Ok(None)
        }
        Action::RemoveTag(tag) => {
            buffer.remove_tag(tag.tag, tag.range())?;
            Ok(None)
        }
    }
}
