//! Core types for orchestrator requests

use serde::{Deserialize, Serialize};

/// Message roles visible to the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Get the wire-format name for this role
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// A single conversation history entry as seen by the backend.
///
/// History is always flattened to plain text; images travel only with the
/// current prompt, never through history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: ChatRole,
    pub content: String,
}

impl HistoryEntry {
    /// Create a new history entry
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(ChatRole::User.as_str(), "user");
        assert_eq!(ChatRole::Assistant.as_str(), "assistant");
    }

    #[test]
    fn test_history_entry_serializes_flat() {
        let entry = HistoryEntry::new(ChatRole::Assistant, "the losses are 0.05 pu");
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "role": "assistant", "content": "the losses are 0.05 pu" })
        );
    }
}
