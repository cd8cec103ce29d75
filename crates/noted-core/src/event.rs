//! Notifications for whoever displays the editor.
//!
//! ## Learning: Observer Pattern in Rust
//!
//! Rust's ownership model makes traditional observer patterns tricky:
//! a list of `&mut dyn Observer` would borrow the observers for as long
//! as the editor lives. A `tokio::sync::broadcast` channel sidesteps
//! that. The editor owns the sender and every observer owns a receiver.
//!
//! Only outside observers (toolbar, title bar, autosave) listen here.
//! The undo engine and the list formatter are called directly by the
//! editor, synchronously, in a fixed order.

use noted_buffer::Tag;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

/// Events buffered per receiver before the oldest are dropped.
const CHANNEL_CAPACITY: usize = 256;

/// Something an outside observer may want to redraw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    /// A serialized document replaced the buffer
    Loaded,
    /// A user operation changed the document
    Edited {
        /// Undo steps available after the edit
        undo_depth: usize,
    },
    Undone,
    Redone,
    /// List mode was switched on or off
    ListModeChanged(bool),
    /// The list nesting depth changed
    IndentLevelChanged(usize),
    /// Alignment for new lines changed
    JustificationLatched(Option<Tag>),
}

/// Sending half of the notification channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publishes an event; nobody listening is fine.
    pub fn emit(&self, event: EditorEvent) {
        tracing::trace!(?event, "editor event");
        let _ = self.sender.send(event);
    }

    /// Returns a receiver for every event emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("receivers", &self.sender.receiver_count())
            .finish()
    }
}

/// Receiving half that skips over lag instead of failing.
///
/// ## Example
///
/// ```ignore
/// let mut handler = EventHandler::new(editor.subscribe());
///
/// tokio::spawn(async move {
///     while let Some(event) = handler.next().await {
///         if let EditorEvent::Edited { .. } = event {
///             // Mark the title as unsaved
///         }
///     }
/// });
/// ```
pub struct EventHandler {
    receiver: broadcast::Receiver<EditorEvent>,
}

impl EventHandler {
    pub fn new(receiver: broadcast::Receiver<EditorEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next event; `None` once the editor is gone.
    pub async fn next(&mut self) -> Option<EditorEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "event handler lagged behind the editor");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Takes every event already queued without waiting.
    ///
    /// Suits a UI that polls once per frame.
    pub fn drain(&mut self) -> Vec<EditorEvent> {
        let mut events = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(TryRecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "event handler lagged behind the editor");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => return events,
            }
        }
    }
}
