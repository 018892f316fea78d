//! Per-session conversation state

use crate::{codec::RawImage, turn::Turn};

/// An uploaded image not yet attached to a submitted turn. The encoded form
/// is computed once at acceptance so consumption never re-encodes.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingImage {
    pub raw: RawImage,
    pub encoded: String,
}

/// Process-local state for one interactive session: the ordered turn
/// sequence plus at most one pending uploaded image.
///
/// A store is an explicitly constructed value owned by its session — never a
/// process-wide singleton — so multiple sessions coexist in one process
/// without coordination. Mutations happen only through the turn loop, one
/// stimulus at a time.
#[derive(Debug, Default)]
pub struct SessionStore {
    turns: Vec<Turn>,
    pending: Option<PendingImage>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fully-constructed turn to the end of the conversation
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Number of turns in the conversation
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether the conversation is empty
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Read-only copy of the current history, for windowing and re-render
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    /// Replace the pending image slot
    pub fn set_pending_image(&mut self, raw: RawImage, encoded: String) {
        self.pending = Some(PendingImage { raw, encoded });
    }

    /// Remove the pending image, if any. Idempotent.
    pub fn clear_pending_image(&mut self) {
        self.pending = None;
    }

    /// The pending image, if one is set
    pub fn pending_image(&self) -> Option<&PendingImage> {
        self.pending.as_ref()
    }
}
