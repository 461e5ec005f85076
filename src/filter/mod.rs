//! Case-insensitive search over a conversation collection.
//!
//! A conversation matches a query when its serialized JSON text, or its
//! synthetic label (`"Conversation {position}"`), contains the query ignoring
//! case. The empty query matches everything. Filtering is a pure derived view:
//! it borrows the collection and never changes it.

use crate::model::{label, Conversation};
use crate::store::{ConversationId, StoredConversation};

/// One entry of a filtered view.
#[derive(Debug, Clone, Copy)]
pub struct FilteredEntry<'a> {
    /// Stable identifier of the conversation.
    pub id: ConversationId,
    /// 1-based position in the unfiltered collection.
    pub position: usize,
    /// The conversation itself.
    pub conversation: &'a Conversation,
}

impl FilteredEntry<'_> {
    /// Display label for this entry.
    #[must_use]
    pub fn label(&self) -> String {
        label(self.position)
    }
}

/// A lowercased query, prepared once and matched against many conversations.
#[derive(Debug, Clone, Default)]
pub struct Query {
    raw: String,
    folded: String,
}

impl Query {
    /// Prepare a query.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let folded = raw.to_lowercase();
        Self { raw, folded }
    }

    /// The query as typed.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether this query matches everything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Test a conversation at a 1-based position.
    #[must_use]
    pub fn matches(&self, position: usize, conversation: &Conversation) -> bool {
        if self.folded.is_empty() {
            return true;
        }
        if label(position).to_lowercase().contains(&self.folded) {
            return true;
        }
        // Matches against the full structural text, keys included.
        serde_json::to_string(conversation)
            .map(|text| text.to_lowercase().contains(&self.folded))
            .unwrap_or(false)
    }
}

/// Filter a stored collection, keeping original positions.
#[must_use]
pub fn filter<'a>(items: &'a [StoredConversation], query: &Query) -> Vec<FilteredEntry<'a>> {
    items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            let position = idx + 1;
            query.matches(position, &item.conversation).then_some(FilteredEntry {
                id: item.id,
                position,
                conversation: &item.conversation,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Message;
    use rstest::rstest;

    fn stored(items: Vec<Conversation>) -> Vec<StoredConversation> {
        items
            .into_iter()
            .enumerate()
            .map(|(i, conversation)| StoredConversation {
                id: ConversationId::from_raw(i as u64 + 1),
                source_line: i + 1,
                conversation,
            })
            .collect()
    }

    fn sample() -> Vec<StoredConversation> {
        stored(vec![
            Conversation::new(vec![Message::new("user", "Hello World")]),
            Conversation::new(vec![Message::new("assistant", "Goodbye")]),
            Conversation::new(vec![Message::new("system", "be terse")]),
        ])
    }

    fn positions(view: &[FilteredEntry<'_>]) -> Vec<usize> {
        view.iter().map(|e| e.position).collect()
    }

    #[rstest]
    #[case("", vec![1, 2, 3])]
    #[case("hello", vec![1])]
    #[case("HELLO", vec![1])]
    #[case("assistant", vec![2])]
    #[case("role", vec![1, 2, 3])]
    #[case("conversation 3", vec![3])]
    #[case("CONVERSATION", vec![1, 2, 3])]
    #[case("nothing matches this", vec![])]
    fn test_filter_cases(#[case] query: &str, #[case] expected: Vec<usize>) {
        let items = sample();
        let view = filter(&items, &Query::new(query));
        assert_eq!(positions(&view), expected);
    }

    #[test]
    fn test_filter_keeps_ids_and_positions() {
        let items = sample();
        let view = filter(&items, &Query::new("goodbye"));
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, items[1].id);
        assert_eq!(view[0].position, 2);
        assert_eq!(view[0].label(), "Conversation 2");
    }

    #[test]
    fn test_label_match_uses_original_position() {
        let items = sample();
        // "conversation 2" matches by label even though content does not.
        let view = filter(&items, &Query::new("Conversation 2"));
        assert_eq!(positions(&view), vec![2]);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let items = sample();
        let query = Query::new("o");
        let first = positions(&filter(&items, &query));
        let second = positions(&filter(&items, &query));
        assert_eq!(first, second);
    }

    #[test]
    fn test_unicode_case_folding() {
        let items = stored(vec![Conversation::new(vec![Message::new("user", "ÉCOLE")])]);
        assert_eq!(filter(&items, &Query::new("école")).len(), 1);
    }
}
