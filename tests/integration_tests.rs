//! Integration tests for convo-edit.
//!
//! These tests drive the import, filter, edit and export pipeline through the
//! public API using the JSONL fixtures under `tests/fixtures`.

use convo_edit::parser::{JsonlParser, LineErrorKind};
use convo_edit::session::{FileMirror, NoticeLevel, Session};
use convo_edit::store::ConversationStore;
use convo_edit::EditorError;
use std::path::PathBuf;

/// Get the path to a fixture file.
fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn read_fixture(name: &str) -> String {
    let path = fixture_path(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", name, e))
}

fn load_store(name: &str) -> ConversationStore {
    let mut store = ConversationStore::new();
    store.import_str(&read_fixture(name));
    store
}

mod parsing {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_mixed_fixture_partitions_lines() {
        let mut parser = JsonlParser::new();
        let outcome = parser.parse_str(&read_fixture("mixed.jsonl")).unwrap();

        let lines: Vec<usize> = outcome.conversations.iter().map(|c| c.line).collect();
        assert_eq!(lines, vec![1, 4, 6]);

        let errors: Vec<(usize, LineErrorKind)> =
            outcome.errors.iter().map(|e| (e.line, e.kind)).collect();
        assert_eq!(
            errors,
            vec![(3, LineErrorKind::Syntax), (5, LineErrorKind::Schema)]
        );
        assert_eq!(outcome.errors[0].content, "not json at all");

        let stats = parser.stats();
        assert_eq!(stats.lines_processed, 7);
        assert_eq!(stats.empty_lines, 2);
        assert_eq!(
            stats.lines_processed,
            stats.conversations_parsed + stats.lines_failed + stats.empty_lines
        );
    }

    #[test]
    fn test_strict_mode_reports_first_bad_line() {
        let mut parser = JsonlParser::new().with_lenient(false);
        let err = parser.parse_str(&read_fixture("mixed.jsonl")).unwrap_err();

        assert!(matches!(err, EditorError::ParseError { line: 3, .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_parse_file_respects_size_limit() {
        let mut parser = JsonlParser::new().with_max_bytes(16);
        let err = parser.parse_file(fixture_path("mixed.jsonl")).unwrap_err();

        assert!(matches!(err, EditorError::FileTooLarge { .. }));
    }

    #[test]
    fn test_parse_missing_file() {
        let mut parser = JsonlParser::new();
        let err = parser.parse_file(fixture_path("does-not-exist.jsonl")).unwrap_err();

        assert!(matches!(err, EditorError::FileNotFound { .. }));
        assert_eq!(err.exit_code(), 3);
    }
}

mod store {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_import_selects_first_conversation() {
        let store = load_store("mixed.jsonl");

        assert_eq!(store.len(), 3);
        assert_eq!(store.errors().len(), 2);
        assert_eq!(store.selected_position(), Some(1));
        assert!(!store.is_modified());
    }

    #[test]
    fn test_filter_keeps_original_positions() {
        let mut store = load_store("mixed.jsonl");
        store.set_query("paris");

        let positions: Vec<usize> = store.filtered().iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![1, 3]);

        let labels: Vec<String> = store.filtered().iter().map(|e| e.label()).collect();
        assert_eq!(labels, vec!["Conversation 1", "Conversation 3"]);
    }

    #[test]
    fn test_filter_matches_synthetic_label() {
        let mut store = load_store("mixed.jsonl");
        store.set_query("CONVERSATION 2");

        let positions: Vec<usize> = store.filtered().iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![2]);
    }

    #[test]
    fn test_selection_survives_filter_that_hides_it() {
        let mut store = load_store("mixed.jsonl");
        store.select_position(2).unwrap();
        store.set_query("paris");

        assert_eq!(store.selected_position(), Some(2));
        assert!(store.filtered().iter().all(|e| e.position != 2));
    }

    #[test]
    fn test_edit_changes_only_target_message() {
        let mut store = load_store("mixed.jsonl");
        let before = store.export().unwrap();

        let previous = store.edit_at_position(2, 1, "Summarize chapter 4").unwrap();
        assert_eq!(previous, "Summarize the Rust book");
        assert!(store.is_modified());

        let after = store.export().unwrap();
        let before_lines: Vec<&str> = before.split('\n').collect();
        let after_lines: Vec<&str> = after.split('\n').collect();
        assert_eq!(before_lines[0], after_lines[0]);
        assert_eq!(before_lines[2], after_lines[2]);
        assert!(after_lines[1].contains("Summarize chapter 4"));
        assert!(after_lines[1].contains("Be terse."));
    }

    #[test]
    fn test_out_of_range_edit_leaves_store_untouched() {
        let mut store = load_store("mixed.jsonl");
        let before = store.export().unwrap();
        let revision = store.revision();

        let err = store.edit_at_position(1, 9, "nope").unwrap_err();
        assert!(matches!(err, EditorError::InvalidTarget { .. }));
        let err = store.edit_at_position(4, 0, "nope").unwrap_err();
        assert!(matches!(err, EditorError::InvalidTarget { .. }));

        assert_eq!(store.export().unwrap(), before);
        assert_eq!(store.revision(), revision);
        assert!(!store.is_modified());
    }

    #[test]
    fn test_export_has_no_trailing_newline() {
        let store = load_store("mixed.jsonl");
        let text = store.export().unwrap();

        assert_eq!(text.lines().count(), 3);
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_export_filtered_only_includes_matches() {
        let mut store = load_store("mixed.jsonl");
        store.set_query("terse");

        let text = store.export_filtered().unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("Be terse."));
    }

    #[test]
    fn test_empty_store_refuses_export() {
        let mut store = ConversationStore::new();
        store.import_str("\n\nnot json\n");

        assert!(matches!(store.export(), Err(EditorError::EmptyExport)));
        assert_eq!(store.selected_id(), None);
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let input = read_fixture("extra_keys.jsonl");
        let store = load_store("extra_keys.jsonl");
        let output = store.export().unwrap();

        let parse = |text: &str| -> Vec<serde_json::Value> {
            text.lines()
                .filter(|l| !l.trim().is_empty())
                .map(|l| serde_json::from_str(l).unwrap())
                .collect()
        };
        assert_eq!(parse(&output), parse(&input));
    }

    #[test]
    fn test_reimport_of_export_is_identical() {
        let store = load_store("mixed.jsonl");
        let first = store.export().unwrap();

        let mut again = ConversationStore::new();
        again.import_str(&first);

        assert_eq!(again.errors().len(), 0);
        assert_eq!(again.export().unwrap(), first);
    }
}

mod session {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_import_file_reports_bad_lines() {
        let mut session = Session::new();
        let summary = session.import_file(fixture_path("mixed.jsonl")).unwrap();

        assert_eq!(summary.conversations, 3);
        assert_eq!(summary.errors, 2);
        let notices = session.take_notices();
        assert!(notices
            .iter()
            .any(|n| n.level == NoticeLevel::Warning && n.message == "2 lines could not be parsed"));
    }

    #[test]
    fn test_superseded_import_is_discarded() {
        let mut session = Session::new();
        let older = session.begin_import();
        let newer = session.begin_import();

        session
            .complete_import(newer, &read_fixture("extra_keys.jsonl"))
            .unwrap();
        let err = session
            .complete_import(older, &read_fixture("mixed.jsonl"))
            .unwrap_err();

        assert!(matches!(err, EditorError::StaleImport { .. }));
        assert_eq!(session.store().len(), 2);
    }

    #[test]
    fn test_edit_is_mirrored_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let mirror_path = dir.path().join("mirror.jsonl");
        let mut session = Session::new().with_mirror(Box::new(FileMirror::new(&mirror_path)));

        session.import_file(fixture_path("mixed.jsonl")).unwrap();
        let id = session.store().id_at(1).unwrap();
        session.edit_message(id, 1, "Lyon.").unwrap();

        let mirrored = std::fs::read_to_string(&mirror_path).unwrap();
        assert!(mirrored.contains("Lyon."));
        assert_eq!(mirrored, session.store().export().unwrap());
    }

    #[test]
    fn test_mirror_failure_becomes_notice() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be written as a file.
        let mut session = Session::new().with_mirror(Box::new(FileMirror::new(dir.path())));

        session.import_file(fixture_path("mixed.jsonl")).unwrap();
        let id = session.store().id_at(1).unwrap();
        session.edit_message(id, 0, "edited anyway").unwrap();

        assert_eq!(
            session.store().get(id).unwrap().messages[0].content,
            "edited anyway"
        );
        assert!(session
            .take_notices()
            .iter()
            .any(|n| n.level == NoticeLevel::Error && n.message.starts_with("Mirror to")));
    }

    #[test]
    fn test_export_to_clears_modified_flag() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.jsonl");
        let mut session = Session::new();

        session.import_file(fixture_path("mixed.jsonl")).unwrap();
        let id = session.store().id_at(3).unwrap();
        session.edit_message(id, 0, "Tell me about Rome").unwrap();
        assert!(session.store().is_modified());

        session.export_to(&out).unwrap();
        assert!(!session.store().is_modified());
        assert!(std::fs::read_to_string(&out)
            .unwrap()
            .contains("Tell me about Rome"));
    }
}
