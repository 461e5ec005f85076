//! JSONL serialization.
//!
//! The inverse of [`crate::parser`]: one compact JSON document per
//! conversation, joined by `\n`. Parsing the output again yields a structurally
//! equal collection; unknown keys are carried through.

use std::path::Path;

use tracing::{debug, instrument};

use crate::error::{EditorError, Result};
use crate::model::Conversation;
use crate::util::atomic_write;

/// Conventional file extension for exports.
pub const JSONL_EXTENSION: &str = "jsonl";

/// MIME type used when handing the export to a browser-like consumer.
pub const JSONL_MIME_TYPE: &str = "application/json";

/// Options for writing an export to disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// End the file with a newline after the last line.
    pub trailing_newline: bool,
}

/// Serialize conversations to JSONL text without a trailing newline.
///
/// Fails with [`EditorError::EmptyExport`] when there is nothing to serialize.
pub fn to_jsonl<'a>(conversations: impl IntoIterator<Item = &'a Conversation>) -> Result<String> {
    let lines = conversations
        .into_iter()
        .map(|c| {
            serde_json::to_string(c).map_err(|e| EditorError::SerializationError {
                context: "Failed to serialize conversation".to_string(),
                source: e,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    if lines.is_empty() {
        return Err(EditorError::EmptyExport);
    }
    Ok(lines.join("\n"))
}

/// Write already-serialized JSONL text to `path` atomically.
#[instrument(skip(text), fields(path = %path.display(), bytes = text.len()))]
pub fn write_jsonl(path: &Path, text: &str, options: ExportOptions) -> Result<()> {
    if text.is_empty() {
        return Err(EditorError::EmptyExport);
    }
    if options.trailing_newline {
        let mut buf = String::with_capacity(text.len() + 1);
        buf.push_str(text);
        buf.push('\n');
        atomic_write(path, buf.as_bytes())?;
    } else {
        atomic_write(path, text.as_bytes())?;
    }
    debug!("Export written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Message;
    use crate::parser::JsonlParser;

    #[test]
    fn test_empty_export_errors() {
        let none: Vec<Conversation> = Vec::new();
        assert!(matches!(to_jsonl(&none), Err(EditorError::EmptyExport)));
    }

    #[test]
    fn test_one_line_per_conversation() {
        let items = vec![
            Conversation::new(vec![Message::new("user", "a\nb")]),
            Conversation::new(vec![]),
        ];
        let text = to_jsonl(&items).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(!text.ends_with('\n'));
        assert_eq!(text.lines().nth(1), Some("{\"messages\":[]}"));
    }

    #[test]
    fn test_export_reparses_equal() {
        let source = "{\"messages\":[{\"role\":\"user\",\"content\":\"hi\",\"name\":\"n\"}],\"meta\":{\"k\":[1,2]}}\n{\"messages\":[]}";
        let mut parser = JsonlParser::new();
        let first: Vec<Conversation> = parser
            .parse_str(source)
            .unwrap()
            .conversations
            .into_iter()
            .map(|p| p.conversation)
            .collect();

        let text = to_jsonl(&first).unwrap();
        let second: Vec<Conversation> = parser
            .parse_str(&text)
            .unwrap()
            .conversations
            .into_iter()
            .map(|p| p.conversation)
            .collect();

        assert_eq!(first, second);
        assert_eq!(text, source);
    }

    #[test]
    fn test_write_jsonl_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");

        write_jsonl(&path, "{\"messages\":[]}", ExportOptions::default()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"messages\":[]}");

        write_jsonl(&path, "{\"messages\":[]}", ExportOptions { trailing_newline: true }).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"messages\":[]}\n");
    }

    #[test]
    fn test_write_jsonl_refuses_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        assert!(matches!(
            write_jsonl(&path, "", ExportOptions::default()),
            Err(EditorError::EmptyExport)
        ));
        assert!(!path.exists());
    }
}
