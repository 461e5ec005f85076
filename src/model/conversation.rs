//! Conversations: one JSONL line each.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::message::Message;
use crate::error::Result;

/// Prefix of the synthetic display label, `"Conversation {position}"`.
pub const LABEL_PREFIX: &str = "Conversation";

/// An ordered sequence of messages deserialized from a single JSONL line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Conversation {
    /// Messages in order.
    pub messages: Vec<Message>,
    /// Top-level keys not interpreted by the editor, kept for lossless export.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Conversation {
    /// Create a conversation from messages.
    #[must_use]
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            extra: Map::new(),
        }
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the conversation has no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Get a message by index.
    #[must_use]
    pub fn message(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    /// Get a mutable message by index.
    pub fn message_mut(&mut self, index: usize) -> Option<&mut Message> {
        self.messages.get_mut(index)
    }

    /// Serialize to a single compact JSON line (no trailing newline).
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Text of the first message, flattened to one line and cut to `width` characters.
    #[must_use]
    pub fn preview(&self, width: usize) -> String {
        let Some(first) = self.messages.first() else {
            return String::from("(no messages)");
        };
        let flat: String = first
            .content
            .chars()
            .map(|c| if c.is_whitespace() { ' ' } else { c })
            .collect();
        crate::util::truncate_chars(flat.trim(), width)
    }
}

/// Synthetic display label for a 1-based position in the unfiltered collection.
#[must_use]
pub fn label(position: usize) -> String {
    format!("{LABEL_PREFIX} {position}")
}
