//! A single turn in a conversation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One message: a free-form role label and its text content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role label (usually `user`, `assistant` or `system`, but not enforced).
    pub role: String,
    /// Message text.
    pub content: String,
    /// Keys not interpreted by the editor, kept for lossless export.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Coarse classification of a role label, used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleKind {
    /// `user` / `human`.
    User,
    /// `assistant` / `model`.
    Assistant,
    /// `system` / `developer`.
    System,
    /// Anything else.
    Other,
}

impl Message {
    /// Create a message with no extra keys.
    #[must_use]
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            extra: Map::new(),
        }
    }

    /// Classify the role label.
    #[must_use]
    pub fn role_kind(&self) -> RoleKind {
        match self.role.to_ascii_lowercase().as_str() {
            "user" | "human" => RoleKind::User,
            "assistant" | "model" => RoleKind::Assistant,
            "system" | "developer" => RoleKind::System,
            _ => RoleKind::Other,
        }
    }

    /// Replace the content wholesale, returning the previous text.
    pub fn replace_content(&mut self, content: impl Into<String>) -> String {
        std::mem::replace(&mut self.content, content.into())
    }
}
