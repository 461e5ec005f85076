//! Selection rules.
//!
//! The selected conversation is recomputed from the collection, the filtered
//! view and the previous selection after every store mutation, so no mutation
//! path can leave it dangling.

use super::{ConversationId, StoredConversation};
use crate::filter::FilteredEntry;

/// Resolve the selection after a change.
///
/// A previous selection survives only while its conversation is still in the
/// collection (it may be filtered out of the view). With nothing selected, the
/// first entry of a non-empty view is selected.
#[must_use]
pub fn resolve_selection(
    items: &[StoredConversation],
    view: &[FilteredEntry<'_>],
    current: Option<ConversationId>,
) -> Option<ConversationId> {
    current
        .filter(|id| super::index_of(items, *id).is_some())
        .or_else(|| view.first().map(|entry| entry.id))
}

/// Step the selection within the view by `delta` entries, clamping at both ends.
///
/// A selection outside the view moves to the view's first entry.
#[must_use]
pub fn step_selection(
    view: &[FilteredEntry<'_>],
    current: Option<ConversationId>,
    delta: isize,
) -> Option<ConversationId> {
    let first = view.first()?.id;
    let Some(idx) = current.and_then(|id| view.iter().position(|e| e.id == id)) else {
        return Some(first);
    };
    let target = idx.saturating_add_signed(delta).min(view.len() - 1);
    Some(view[target].id)
}
