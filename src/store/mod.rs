//! The conversation store.
//!
//! [`ConversationStore`] owns everything an editing session works on: the
//! ordered collection of parsed conversations, the lines that failed to parse,
//! the search query, the selected conversation and the in-progress edit.
//!
//! Every mutating method takes `&mut self`, builds its result before touching
//! the store, and finishes with one reconcile step that re-applies the
//! selection rules. Callers therefore never observe a half-applied import or an
//! edit that left the selection pointing at a conversation that is gone.
//!
//! # Example
//!
//! ```rust
//! use convo_edit::store::ConversationStore;
//!
//! let mut store = ConversationStore::new();
//! store.import_str("{\"messages\":[{\"role\":\"user\",\"content\":\"hi\"}]}\nnot json");
//!
//! assert_eq!(store.len(), 1);
//! assert_eq!(store.errors().len(), 1);
//!
//! let id = store.selected_id().expect("first conversation is auto-selected");
//! store.edit_message(id, 0, "hi there")?;
//! assert_eq!(store.export()?, "{\"messages\":[{\"role\":\"user\",\"content\":\"hi there\"}]}");
//! # Ok::<(), convo_edit::EditorError>(())
//! ```

mod edit;
mod selection;

pub use edit::EditState;
pub use selection::{resolve_selection, step_selection};

use std::fmt;

use tracing::{debug, instrument};

use crate::error::{EditorError, Result};
use crate::export;
use crate::filter::{self, FilteredEntry, Query};
use crate::model::Conversation;
use crate::parser::{JsonlParser, LineError, ParseOutcome, ParseStats};

/// Stable identifier of a conversation within one store.
///
/// Identifiers are assigned in increasing order at import time and are never
/// reused, so an identifier from a previous import never resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationId(u64);

impl ConversationId {
    /// Wrap a raw identifier value.
    #[must_use]
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A conversation held by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredConversation {
    /// Stable identifier.
    pub id: ConversationId,
    /// 1-based line of the source text this conversation came from.
    pub source_line: usize,
    /// The conversation.
    pub conversation: Conversation,
}

/// Counts reported after an import.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ImportSummary {
    /// Conversations loaded.
    pub conversations: usize,
    /// Lines that failed to parse.
    pub errors: usize,
    /// Messages across all loaded conversations.
    pub messages: usize,
    /// Blank lines skipped.
    pub blank_lines: usize,
}

/// Result of a committed edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// Edited conversation.
    pub conversation: ConversationId,
    /// Edited message index.
    pub message: usize,
    /// Content before the edit.
    pub previous: String,
}

/// In-memory editing state for one imported file.
#[derive(Debug, Default)]
pub struct ConversationStore {
    /// Conversations in source order; ids strictly increasing.
    items: Vec<StoredConversation>,
    /// Lines that failed to parse in the last import.
    errors: Vec<LineError>,
    /// Statistics of the last import.
    stats: ParseStats,
    /// Current search query.
    query: Query,
    /// Selected conversation.
    selected: Option<ConversationId>,
    /// Message being edited, if any.
    edit: Option<EditState>,
    /// Next identifier to hand out.
    next_id: u64,
    /// Bumped on every state change.
    revision: u64,
    /// Whether edits were made since the last import or save.
    modified: bool,
}

impl ConversationStore {
    /// Create an empty store: no conversations, no errors, nothing selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ---------------------------------------------------------------------
    // Import
    // ---------------------------------------------------------------------

    /// Import JSONL text, recording bad lines instead of failing.
    pub fn import_str(&mut self, text: &str) -> ImportSummary {
        let mut parser = JsonlParser::new();
        // Lenient parsing of in-memory text has no failure path.
        let outcome = parser.parse_str(text).unwrap_or_default();
        self.replace(outcome, parser.stats().clone())
    }

    /// Import JSONL text with a configured parser.
    ///
    /// If the parser fails (strict mode), the store is left exactly as it was.
    pub fn import_with(&mut self, parser: &mut JsonlParser, text: &str) -> Result<ImportSummary> {
        let outcome = parser.parse_str(text)?;
        Ok(self.replace(outcome, parser.stats().clone()))
    }

    /// Replace the whole data set with a parse outcome.
    ///
    /// Clears the selection and any edit, assigns fresh identifiers, then
    /// re-applies auto-selection.
    #[instrument(skip_all, level = "debug")]
    pub fn replace(&mut self, outcome: ParseOutcome, stats: ParseStats) -> ImportSummary {
        let mut next_id = self.next_id;
        let items: Vec<StoredConversation> = outcome
            .conversations
            .into_iter()
            .map(|parsed| {
                next_id += 1;
                StoredConversation {
                    id: ConversationId(next_id),
                    source_line: parsed.line,
                    conversation: parsed.conversation,
                }
            })
            .collect();

        let summary = ImportSummary {
            conversations: items.len(),
            errors: outcome.errors.len(),
            messages: items.iter().map(|c| c.conversation.len()).sum(),
            blank_lines: stats.empty_lines,
        };

        self.items = items;
        self.errors = outcome.errors;
        self.stats = stats;
        self.next_id = next_id;
        self.selected = None;
        self.edit = None;
        self.modified = false;
        self.touch();

        debug!(
            conversations = summary.conversations,
            errors = summary.errors,
            "Store replaced"
        );
        summary
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// All conversations in collection order.
    #[must_use]
    pub fn conversations(&self) -> &[StoredConversation] {
        &self.items
    }

    /// Number of conversations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether no conversations are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Lines that failed to parse in the last import.
    #[must_use]
    pub fn errors(&self) -> &[LineError] {
        &self.errors
    }

    /// Statistics of the last import.
    #[must_use]
    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Look up a conversation by identifier.
    #[must_use]
    pub fn get(&self, id: ConversationId) -> Option<&Conversation> {
        index_of(&self.items, id).map(|idx| &self.items[idx].conversation)
    }

    /// 1-based position of a conversation in the unfiltered collection.
    #[must_use]
    pub fn position_of(&self, id: ConversationId) -> Option<usize> {
        index_of(&self.items, id).map(|idx| idx + 1)
    }

    /// Identifier of the conversation at a 1-based position.
    #[must_use]
    pub fn id_at(&self, position: usize) -> Option<ConversationId> {
        position
            .checked_sub(1)
            .and_then(|idx| self.items.get(idx))
            .map(|c| c.id)
    }

    /// Monotonic counter bumped by every state change.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether edits were made since the last import or [`mark_saved`](Self::mark_saved).
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Record that the current contents have been written out.
    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    // ---------------------------------------------------------------------
    // Search
    // ---------------------------------------------------------------------

    /// Current search query.
    #[must_use]
    pub fn query(&self) -> &str {
        self.query.as_str()
    }

    /// Change the search query.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = Query::new(query);
        self.touch();
    }

    /// Reset the search query so every conversation is shown.
    pub fn clear_query(&mut self) {
        self.set_query(String::new());
    }

    /// The filtered view for the current query.
    #[must_use]
    pub fn filtered(&self) -> Vec<FilteredEntry<'_>> {
        filter::filter(&self.items, &self.query)
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    /// Identifier of the selected conversation.
    #[must_use]
    pub fn selected_id(&self) -> Option<ConversationId> {
        self.selected
    }

    /// The selected conversation, as stored.
    #[must_use]
    pub fn selected(&self) -> Option<&StoredConversation> {
        self.selected
            .and_then(|id| index_of(&self.items, id))
            .map(|idx| &self.items[idx])
    }

    /// 1-based position of the selected conversation.
    #[must_use]
    pub fn selected_position(&self) -> Option<usize> {
        self.selected.and_then(|id| self.position_of(id))
    }

    /// Select a conversation, cancelling any in-progress edit.
    pub fn select(&mut self, id: ConversationId) -> Result<()> {
        if index_of(&self.items, id).is_none() {
            return Err(EditorError::invalid_target(id, None));
        }
        self.selected = Some(id);
        self.edit = None;
        self.touch();
        Ok(())
    }

    /// Select the conversation at a 1-based position.
    pub fn select_position(&mut self, position: usize) -> Result<()> {
        let id = self
            .id_at(position)
            .ok_or_else(|| EditorError::invalid_target(position, None))?;
        self.select(id)
    }

    /// Move the selection to the next entry of the filtered view.
    pub fn select_next(&mut self) {
        self.step(1);
    }

    /// Move the selection to the previous entry of the filtered view.
    pub fn select_previous(&mut self) {
        self.step(-1);
    }

    fn step(&mut self, delta: isize) {
        let target = step_selection(&self.filtered(), self.selected, delta);
        if let Some(id) = target {
            if Some(id) != self.selected {
                // Target came from the view, so it exists.
                let _ = self.select(id);
            }
        }
    }

    // ---------------------------------------------------------------------
    // Editing
    // ---------------------------------------------------------------------

    /// The in-progress edit, if any.
    #[must_use]
    pub fn edit_state(&self) -> Option<&EditState> {
        self.edit.as_ref()
    }

    /// Draft text of the in-progress edit.
    #[must_use]
    pub fn draft(&self) -> Option<&str> {
        self.edit.as_ref().map(|e| e.draft.as_str())
    }

    /// Mutable access to the draft text. Counts as a state change.
    pub fn draft_mut(&mut self) -> Option<&mut String> {
        let edit = self.edit.as_mut()?;
        self.revision += 1;
        Some(&mut edit.draft)
    }

    /// Start editing a message of the selected conversation.
    ///
    /// Replaces any edit already in progress.
    pub fn begin_edit(&mut self, message: usize) -> Result<()> {
        let stored = self.selected().ok_or(EditorError::NoSelection)?;
        let current = stored
            .conversation
            .message(message)
            .ok_or_else(|| EditorError::invalid_target(stored.id, Some(message)))?;
        self.edit = Some(EditState::new(stored.id, message, &current.content));
        self.touch();
        Ok(())
    }

    /// Replace the draft text.
    pub fn set_draft(&mut self, text: impl Into<String>) -> Result<()> {
        let edit = self.edit.as_mut().ok_or(EditorError::NotEditing)?;
        edit.draft = text.into();
        self.touch();
        Ok(())
    }

    /// Discard the in-progress edit.
    pub fn cancel_edit(&mut self) {
        if self.edit.take().is_some() {
            self.touch();
        }
    }

    /// Apply the draft to its message and leave edit mode.
    pub fn commit_edit(&mut self) -> Result<EditOutcome> {
        let edit = self.edit.clone().ok_or(EditorError::NotEditing)?;
        let previous = self.edit_message(edit.conversation, edit.message, edit.draft)?;
        Ok(EditOutcome {
            conversation: edit.conversation,
            message: edit.message,
            previous,
        })
    }

    /// Replace the content of one message, returning the previous content.
    ///
    /// Only that message changes. A target that does not exist fails with
    /// [`EditorError::InvalidTarget`] and leaves the store untouched. Any
    /// in-progress edit is cleared on success.
    #[instrument(skip(self, content), level = "debug", fields(conversation = %id))]
    pub fn edit_message(
        &mut self,
        id: ConversationId,
        message: usize,
        content: impl Into<String>,
    ) -> Result<String> {
        let idx = index_of(&self.items, id)
            .ok_or_else(|| EditorError::invalid_target(id, Some(message)))?;
        let target = self.items[idx]
            .conversation
            .message_mut(message)
            .ok_or_else(|| EditorError::invalid_target(id, Some(message)))?;

        let previous = target.replace_content(content);
        self.edit = None;
        self.modified = true;
        self.touch();
        debug!(message, "Message edited");
        Ok(previous)
    }

    /// [`edit_message`](Self::edit_message) addressed by 1-based position.
    pub fn edit_at_position(
        &mut self,
        position: usize,
        message: usize,
        content: impl Into<String>,
    ) -> Result<String> {
        let id = self
            .id_at(position)
            .ok_or_else(|| EditorError::invalid_target(position, Some(message)))?;
        self.edit_message(id, message, content)
    }

    // ---------------------------------------------------------------------
    // Export
    // ---------------------------------------------------------------------

    /// Serialize every conversation to JSONL.
    ///
    /// Fails with [`EditorError::EmptyExport`] when nothing is loaded.
    pub fn export(&self) -> Result<String> {
        export::to_jsonl(self.items.iter().map(|c| &c.conversation))
    }

    /// Serialize only the conversations in the current filtered view.
    pub fn export_filtered(&self) -> Result<String> {
        export::to_jsonl(self.filtered().into_iter().map(|e| e.conversation))
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    /// Record a state change and re-apply the selection rules.
    fn touch(&mut self) {
        self.revision += 1;
        self.reconcile();
    }

    fn reconcile(&mut self) {
        let resolved = {
            let view = filter::filter(&self.items, &self.query);
            resolve_selection(&self.items, &view, self.selected)
        };
        self.selected = resolved;
        // An edit never outlives the selection it was started on.
        if self.edit.as_ref().is_some_and(|e| Some(e.conversation) != self.selected) {
            self.edit = None;
        }
    }
}

/// Index of `id` in `items`, relying on identifiers being strictly increasing.
pub(crate) fn index_of(items: &[StoredConversation], id: ConversationId) -> Option<usize> {
    items.binary_search_by_key(&id, |c| c.id).ok()
}
