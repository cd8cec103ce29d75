//! Note documents.
//!
//! ## Learning: Type Aliases and Newtypes
//!
//! `NoteId` is a newtype wrapper around `Uuid`. This provides:
//! - Type safety: Can't accidentally use a string as a note ID
//! - Encapsulation: Can change the underlying type without breaking APIs
//! - Documentation: The type name explains its purpose

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::EditorConfig;
use crate::editor::RichEditor;
use crate::CoreResult;

/// Title used for a note without any text.
pub const UNTITLED: &str = "New Note";

/// Longest title taken from a note's text, in characters.
const TITLE_LEN: usize = 20;

/// Unique identifier for a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NoteId(Uuid);

impl NoteId {
    /// Creates a new unique note ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A note: an editing session bound to a file.
///
/// ## Learning: Composition over Inheritance
///
/// Rust doesn't have inheritance. `Note` composes a [`RichEditor`]
/// and adds what only matters on disk: identity, title and path.
#[derive(Debug)]
pub struct Note {
    /// Unique identifier
    id: NoteId,

    /// Editing session
    editor: RichEditor,

    /// File path (None for notes never saved)
    path: Option<PathBuf>,

    /// Title as of the last load or save
    title: String,
}

impl Note {
    /// Creates a new empty note.
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            id: NoteId::new(),
            editor: RichEditor::with_config(config),
            path: None,
            title: UNTITLED.to_string(),
        }
    }

    /// Opens a note from a file.
    ///
    /// An empty file opens as an empty note.
    pub fn open(path: impl AsRef<Path>, config: &EditorConfig) -> CoreResult<Self> {
        let path = path.as_ref();
        let blob = std::fs::read(path)?;
        let editor = RichEditor::from_blob(&blob, config)?;
        let title = Self::derive_title(&editor.text());
        tracing::debug!(path = %path.display(), %title, "note opened");

        Ok(Self {
            id: NoteId::new(),
            editor,
            path: Some(path.to_path_buf()),
            title,
        })
    }

    /// Derives a title from a note's text.
    ///
    /// Leading whitespace is skipped. A first line shorter than 20
    /// characters becomes the title; otherwise the first 20 characters
    /// do.
    pub fn derive_title(text: &str) -> String {
        let text = text.trim_start();
        if text.is_empty() {
            return UNTITLED.to_string();
        }

        match text.chars().position(|c| c == '\n') {
            Some(line_end) if line_end < TITLE_LEN => text.chars().take(line_end).collect(),
            _ => text.chars().take(TITLE_LEN).collect(),
        }
    }

    // ==================== Getters ====================

    /// Returns the note ID.
    pub fn id(&self) -> NoteId {
        self.id
    }

    /// Returns the file path.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the title as of the last load or save.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns true if the note has unsaved changes.
    pub fn is_modified(&self) -> bool {
        self.editor.is_modified()
    }

    /// Returns the editing session.
    pub fn editor(&self) -> &RichEditor {
        &self.editor
    }

    /// Returns the editing session mutably.
    pub fn editor_mut(&mut self) -> &mut RichEditor {
        &mut self.editor
    }

    // ==================== File Operations ====================

    /// Sets the file that [`Note::save`] writes to.
    pub fn bind_path(&mut self, path: impl AsRef<Path>) {
        self.path = Some(path.as_ref().to_path_buf());
    }

    /// Saves the note to its file.
    pub fn save(&mut self) -> CoreResult<()> {
        let path = self.path.clone().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "No file path set")
        })?;
        self.save_as(&path)
    }

    /// Saves the note to a specific path.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> CoreResult<()> {
        let path = path.as_ref();
        let blob = self.editor.serialize()?;

        // Write to a temporary file first, then rename (atomic write)
        let temp_path = path.with_extension("tmp");
        std::fs::write(&temp_path, blob)?;
        std::fs::rename(&temp_path, path)?;

        self.path = Some(path.to_path_buf());
        self.title = Self::derive_title(&self.editor.text());
        self.editor.mark_saved();
        tracing::debug!(path = %path.display(), title = %self.title, "note saved");
        Ok(())
    }
}

impl Default for Note {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}
