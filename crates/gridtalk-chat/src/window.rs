//! History windowing: bound and flatten the conversation for the backend

use gridtalk_ai::HistoryEntry;

use crate::turn::Turn;

/// Project the last `limit` turns into backend-ready history entries.
///
/// Order is preserved; each turn is flattened to its text, discarding any
/// attached image. Must be called with the history *excluding* the turn
/// currently being answered — the in-flight turn travels to the backend as a
/// separate argument, never through the window. Total: `limit = 0` and an
/// empty input both yield an empty sequence.
pub fn window(turns: &[Turn], limit: usize) -> Vec<HistoryEntry> {
    let start = turns.len().saturating_sub(limit);
    turns[start..]
        .iter()
        .map(|turn| HistoryEntry::new(turn.role, turn.content.text()))
        .collect()
}
