//! # Noted Core
//!
//! Editing logic for a single open note: undo/redo, list formatting,
//! typing attributes and the session that ties them together.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                          Note                             │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │                    RichEditor                       │  │
//! │  │                                                     │  │
//! │  │   edit ──▶ TagBuffer ──Mutation──▶ UndoEngine       │  │
//! │  │                            │                        │  │
//! │  │                            └─────▶ ListFormatter    │  │
//! │  │                                        │            │  │
//! │  │                    follow-up edits ◀───┘            │  │
//! │  └────────────────────────────────────────────────────┘  │
//! │          │                                                │
//! │          └──▶ EventBus ──▶ outside observers              │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Learning: Module Organization
//!
//! Rust modules map to files:
//! - `mod foo;` looks for `foo.rs` or `foo/mod.rs`
//! - `pub use` re-exports items for cleaner public APIs

pub mod command;
pub mod config;
pub mod document;
pub mod editor;
pub mod event;
pub mod format;
pub mod list;
pub mod undo;

pub use command::{CommandError, EditCommand, Script};
pub use config::{Config, ConfigError, EditorConfig};
pub use document::{Note, NoteId};
pub use editor::RichEditor;
pub use event::{EditorEvent, EventBus, EventHandler};
pub use format::FormatState;
pub use list::{ListEdit, ListFormatter};
pub use undo::{EditMode, Replayed, UndoEngine};

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Buffer error: {0}")]
    Buffer(#[from] noted_buffer::BufferError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: CommandError,
    },
}
