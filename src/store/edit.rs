//! In-progress message edits.

use super::ConversationId;

/// The message currently being edited and its draft text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    /// Conversation that owns the message.
    pub conversation: ConversationId,
    /// Index of the message within the conversation.
    pub message: usize,
    /// Draft replacement content.
    pub draft: String,
    /// Content when the edit began.
    pub original: String,
}

impl EditState {
    /// Start editing, seeding the draft with the current content.
    #[must_use]
    pub fn new(conversation: ConversationId, message: usize, current: &str) -> Self {
        Self {
            conversation,
            message,
            draft: current.to_string(),
            original: current.to_string(),
        }
    }

    /// Whether the draft differs from the content it started from.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.draft != self.original
    }
}
