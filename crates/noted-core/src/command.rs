//! Scripted edit commands.
//!
//! ## Learning: The Command Pattern
//!
//! Commands encapsulate editor operations as values:
//! - Actions become first-class values
//! - Can be stored, queued, replayed from a file
//! - The same script always produces the same document
//!
//! A script holds one command per line:
//!
//! ```text
//! # start a shopping list
//! type Groceries
//! list on
//! type milk\n
//! undo
//! ```
//!
//! Text arguments run to the end of the line and understand the
//! escapes `\n`, `\t` and `\\`.

use std::str::FromStr;

use noted_buffer::Tag;

use crate::editor::RichEditor;
use crate::{CoreError, CoreResult};

/// Why a script line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("expected a number, found '{0}'")]
    NotANumber(String),

    #[error("expected two numbers, found '{0}'")]
    ExpectedTwoNumbers(String),

    #[error("expected 'on' or 'off', found '{0}'")]
    ExpectedSwitch(String),

    #[error("unknown tag '{0}'")]
    UnknownTag(String),

    #[error("unknown escape '\\{0}'")]
    UnknownEscape(char),

    #[error("dangling '\\' at end of line")]
    DanglingEscape,
}

/// One editor operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditCommand {
    /// Type text at the caret, one keystroke per character
    Type(String),
    /// Insert text at an offset in one go
    Insert { offset: usize, text: String },
    Delete { start: usize, end: usize },
    Backspace(usize),
    ForwardDelete(usize),
    Caret(usize),
    Select { anchor: usize, offset: usize },
    Unselect,
    Toggle(Tag),
    Apply(Tag),
    Remove(Tag),
    Justify(Tag),
    List(bool),
    Undo(usize),
    Redo(usize),
}

impl EditCommand {
    /// Returns the command's script keyword.
    pub fn name(&self) -> &'static str {
        match self {
            EditCommand::Type(_) => "type",
            EditCommand::Insert { .. } => "insert",
            EditCommand::Delete { .. } => "delete",
            EditCommand::Backspace(_) => "backspace",
            EditCommand::ForwardDelete(_) => "forward-delete",
            EditCommand::Caret(_) => "caret",
            EditCommand::Select { .. } => "select",
            EditCommand::Unselect => "unselect",
            EditCommand::Toggle(_) => "toggle",
            EditCommand::Apply(_) => "apply",
            EditCommand::Remove(_) => "remove",
            EditCommand::Justify(_) => "justify",
            EditCommand::List(_) => "list",
            EditCommand::Undo(_) => "undo",
            EditCommand::Redo(_) => "redo",
        }
    }

    /// Runs the command against an editor.
    pub fn execute(&self, editor: &mut RichEditor) -> CoreResult<()> {
        match self {
            EditCommand::Type(text) => {
                for c in text.chars() {
                    editor.type_char(c)?;
                }
            }
            EditCommand::Insert { offset, text } => editor.insert(*offset, text)?,
            EditCommand::Delete { start, end } => editor.delete(*start, *end)?,
            EditCommand::Backspace(count) => {
                for _ in 0..*count {
                    editor.backspace()?;
                }
            }
            EditCommand::ForwardDelete(count) => {
                for _ in 0..*count {
                    editor.delete_forward()?;
                }
            }
            EditCommand::Caret(offset) => editor.set_caret(*offset)?,
            EditCommand::Select { anchor, offset } => editor.select(*anchor, *offset)?,
            EditCommand::Unselect => editor.clear_selection(),
            EditCommand::Toggle(tag) => {
                editor.toggle_tag(*tag)?;
            }
            EditCommand::Apply(tag) => editor.apply_tag(*tag)?,
            EditCommand::Remove(tag) => editor.remove_tag(*tag)?,
            EditCommand::Justify(tag) => editor.apply_justification(*tag)?,
            EditCommand::List(active) => editor.set_list_mode(*active)?,
            EditCommand::Undo(count) => {
                for _ in 0..*count {
                    if !editor.undo()? {
                        break;
                    }
                }
            }
            EditCommand::Redo(count) => {
                for _ in 0..*count {
                    if !editor.redo()? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

impl FromStr for EditCommand {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim_start();
        let (keyword, rest) = line.split_once(' ').unwrap_or((line, ""));
        let keyword = keyword.trim_end();

        let command = match keyword {
            "type" => EditCommand::Type(unescape(rest)?),
            "insert" => {
                let (offset, text) = rest.split_once(' ').unwrap_or((rest, ""));
                EditCommand::Insert {
                    offset: number(offset)?,
                    text: unescape(text)?,
                }
            }
            "delete" => {
                let [start, end] = numbers(rest)?;
                EditCommand::Delete { start, end }
            }
            "backspace" => EditCommand::Backspace(count(rest)?),
            "forward-delete" => EditCommand::ForwardDelete(count(rest)?),
            "caret" => EditCommand::Caret(number(rest)?),
            "select" => {
                let [anchor, offset] = numbers(rest)?;
                EditCommand::Select { anchor, offset }
            }
            "unselect" => EditCommand::Unselect,
            "toggle" => EditCommand::Toggle(tag(rest)?),
            "apply" => EditCommand::Apply(tag(rest)?),
            "remove" => EditCommand::Remove(tag(rest)?),
            "justify" => EditCommand::Justify(tag(rest)?),
            "list" => match rest.trim() {
                "on" => EditCommand::List(true),
                "off" => EditCommand::List(false),
                other => return Err(CommandError::ExpectedSwitch(other.to_string())),
            },
            "undo" => EditCommand::Undo(count(rest)?),
            "redo" => EditCommand::Redo(count(rest)?),
            other => return Err(CommandError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

fn number(arg: &str) -> Result<usize, CommandError> {
    let arg = arg.trim();
    arg.parse::<usize>()
        .map_err(|_| CommandError::NotANumber(arg.to_string()))
}

fn numbers(args: &str) -> Result<[usize; 2], CommandError> {
    let mut parts = args.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), None) => Ok([number(a)?, number(b)?]),
        _ => Err(CommandError::ExpectedTwoNumbers(args.trim().to_string())),
    }
}

/// An optional repeat count, 1 when absent.
fn count(arg: &str) -> Result<usize, CommandError> {
    if arg.trim().is_empty() {
        Ok(1)
    } else {
        number(arg)
    }
}

fn tag(arg: &str) -> Result<Tag, CommandError> {
    let arg = arg.trim();
    arg.parse::<Tag>()
        .map_err(|_| CommandError::UnknownTag(arg.to_string()))
}

fn unescape(text: &str) -> Result<String, CommandError> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => return Err(CommandError::UnknownEscape(other)),
            None => return Err(CommandError::DanglingEscape),
        }
    }
    Ok(out)
}

/// A parsed edit script.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    /// Commands with their 1-based source line
    commands: Vec<(usize, EditCommand)>,
}

impl Script {
    /// Parses a script, skipping blank lines and `#` comments.
    pub fn parse(source: &str) -> CoreResult<Self> {
        let mut commands = Vec::new();
        for (idx, line) in source.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let command = line.parse::<EditCommand>().map_err(|source| CoreError::Parse {
                line: idx + 1,
                source,
            })?;
            commands.push((idx + 1, command));
        }
        Ok(Self { commands })
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Iterates over the commands in order.
    pub fn commands(&self) -> impl Iterator<Item = &EditCommand> {
        self.commands.iter().map(|(_, command)| command)
    }

    /// Runs every command, stopping at the first failure.
    pub fn run(&self, editor: &mut RichEditor) -> CoreResult<()> {
        for (line, command) in &self.commands {
            tracing::trace!(line, command = command.name(), "running script command");
            command.execute(editor).map_err(|err| {
                tracing::debug!(line, %err, "script command failed");
                err
            })?;
        }
        Ok(())
    }
}
