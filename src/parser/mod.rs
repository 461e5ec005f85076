//! JSONL parsing for conversation logs.
//!
//! Turns raw text into a [`ParseOutcome`]: the conversations that parsed, in
//! source order, and a [`LineError`] for every non-blank line that did not.
//! Blank lines produce neither.
//!
//! # Example
//!
//! ```rust
//! use convo_edit::parser::JsonlParser;
//!
//! let text = "{\"messages\":[{\"role\":\"user\",\"content\":\"hi\"}]}\n\nnot json";
//! let mut parser = JsonlParser::new();
//! let outcome = parser.parse_str(text)?;
//!
//! assert_eq!(outcome.conversations.len(), 1);
//! assert_eq!(outcome.errors[0].line, 3);
//! assert_eq!(parser.stats().empty_lines, 1);
//! # Ok::<(), convo_edit::EditorError>(())
//! ```
//!
//! # Parsing Modes
//!
//! - **Lenient mode** (default): bad lines are recorded and parsing continues
//! - **Strict mode**: the first bad line fails the whole parse

use std::fmt;
use std::path::Path;

use serde_json::Value;
use tracing::{debug, instrument, trace};

use crate::error::{EditorError, Result};
use crate::model::Conversation;

/// Default maximum input size in bytes (0 = unlimited).
pub const DEFAULT_MAX_BYTES: u64 = 0;

/// JSONL parser for conversation logs.
#[derive(Debug)]
pub struct JsonlParser {
    /// Whether to record malformed lines instead of failing.
    lenient: bool,
    /// Maximum file size in bytes (0 = unlimited).
    max_bytes: u64,
    /// Statistics about the last parse.
    stats: ParseStats,
}

/// Statistics about a parse.
///
/// `lines_processed == conversations_parsed + lines_failed + empty_lines`.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ParseStats {
    /// Total lines seen, blank ones included.
    pub lines_processed: usize,
    /// Lines that became conversations.
    pub conversations_parsed: usize,
    /// Non-blank lines that failed.
    pub lines_failed: usize,
    /// Blank lines.
    pub empty_lines: usize,
    /// Messages across all parsed conversations.
    pub messages_parsed: usize,
}

impl ParseStats {
    /// Share of non-blank lines that parsed, as a percentage.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        let non_blank = self.conversations_parsed + self.lines_failed;
        if non_blank == 0 {
            return 100.0;
        }
        (self.conversations_parsed as f64 / non_blank as f64) * 100.0
    }
}

/// Why a line was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineErrorKind {
    /// Not valid JSON.
    Syntax,
    /// Valid JSON, but not a `{ "messages": [{ "role", "content" }] }` object.
    Schema,
}

impl fmt::Display for LineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax => f.write_str("syntax"),
            Self::Schema => f.write_str("schema"),
        }
    }
}

/// A non-blank line that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct LineError {
    /// 1-based line number.
    pub line: usize,
    /// Original line text, untrimmed.
    pub content: String,
    /// Human-readable reason.
    pub message: String,
    /// Failure class.
    pub kind: LineErrorKind,
}

/// A conversation together with the line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLine {
    /// 1-based source line number.
    pub line: usize,
    /// The parsed conversation.
    pub conversation: Conversation,
}

/// Result of parsing a whole input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutcome {
    /// Parsed conversations in source order.
    pub conversations: Vec<ParsedLine>,
    /// Failed lines in source order.
    pub errors: Vec<LineError>,
}

impl JsonlParser {
    /// Create a new parser with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lenient: true,
            max_bytes: DEFAULT_MAX_BYTES,
            stats: ParseStats::default(),
        }
    }

    /// Set lenient mode (record malformed lines instead of failing).
    #[must_use]
    pub fn with_lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// Set maximum file size in bytes for [`parse_file`](Self::parse_file) (0 = unlimited).
    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    /// Get statistics for the last parse.
    #[must_use]
    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    /// Read and parse a JSONL file.
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<ParseOutcome> {
        let text = read_input(path.as_ref(), self.max_bytes)?;
        self.parse_str(&text)
    }

    /// Parse JSONL text.
    ///
    /// The text is split on `\n` only; line numbers are 1-based positions in
    /// that split, blank lines included.
    #[instrument(skip(self, content), level = "debug", fields(bytes = content.len()))]
    pub fn parse_str(&mut self, content: &str) -> Result<ParseOutcome> {
        self.stats = ParseStats::default();
        let mut outcome = ParseOutcome::default();

        for (idx, raw) in content.split('\n').enumerate() {
            let line_num = idx + 1;
            self.stats.lines_processed += 1;

            if raw.trim().is_empty() {
                self.stats.empty_lines += 1;
                continue;
            }

            match Self::parse_line(raw, line_num) {
                Ok(conversation) => {
                    self.stats.conversations_parsed += 1;
                    self.stats.messages_parsed += conversation.len();
                    outcome.conversations.push(ParsedLine {
                        line: line_num,
                        conversation,
                    });
                }
                Err((error, source)) => {
                    if !self.lenient {
                        return Err(EditorError::parse_with_source(line_num, error.message, source));
                    }
                    trace!(line = line_num, kind = %error.kind, error = %error.message, "Recording bad line");
                    self.stats.lines_failed += 1;
                    outcome.errors.push(error);
                }
            }
        }

        debug!(
            conversations = self.stats.conversations_parsed,
            failed = self.stats.lines_failed,
            empty = self.stats.empty_lines,
            "Parsing complete"
        );
        Ok(outcome)
    }

    /// Parse one non-blank line.
    ///
    /// JSON syntax is checked first so a schema mismatch is never reported for
    /// text that was not JSON to begin with. Only JSON whitespace (space, tab,
    /// CR) may surround the document; other Unicode spaces are syntax errors.
    fn parse_line(
        raw: &str,
        line_num: usize,
    ) -> std::result::Result<Conversation, (LineError, serde_json::Error)> {
        let reject = |kind, e: serde_json::Error| {
            (
                LineError {
                    line: line_num,
                    content: raw.to_string(),
                    message: e.to_string(),
                    kind,
                },
                e,
            )
        };

        let value: Value =
            serde_json::from_str(raw).map_err(|e| reject(LineErrorKind::Syntax, e))?;
        serde_json::from_value(value).map_err(|e| reject(LineErrorKind::Schema, e))
    }

    /// Parse a single conversation from a JSON string.
    pub fn parse_conversation(json: &str) -> Result<Conversation> {
        Self::parse_line(json, 0).map_err(|(error, source)| {
            EditorError::parse_with_source(0, error.message, source)
        })
    }
}

impl Default for JsonlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Read an input file, enforcing the size limit before loading it.
fn read_input(path: &Path, max_bytes: u64) -> Result<String> {
    debug!("Opening file for parsing");

    if max_bytes > 0 {
        let metadata = std::fs::metadata(path).map_err(|e| {
            EditorError::from_io_at(path, format!("Failed to get metadata for {}", path.display()), e)
        })?;
        let size = metadata.len();
        trace!(size, max_bytes, "Checking file size limit");
        if size > max_bytes {
            return Err(EditorError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                limit: max_bytes,
            });
        }
    }

    std::fs::read_to_string(path)
        .map_err(|e| EditorError::from_io_at(path, format!("Failed to read {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SCENARIO: &str = "{\"messages\":[{\"role\":\"user\",\"content\":\"hi\"}]}\n\nnot json\n{\"messages\":[{\"role\":\"assistant\",\"content\":\"hello\"}]}";

    #[test]
    fn test_parse_empty() {
        let mut parser = JsonlParser::new();
        let outcome = parser.parse_str("").unwrap();
        assert!(outcome.conversations.is_empty());
        assert!(outcome.errors.is_empty());
        assert_eq!(parser.stats().empty_lines, 1);
    }

    #[test]
    fn test_example_scenario() {
        let mut parser = JsonlParser::new();
        let outcome = parser.parse_str(SCENARIO).unwrap();

        assert_eq!(outcome.conversations.len(), 2);
        assert_eq!(outcome.conversations[0].line, 1);
        assert_eq!(outcome.conversations[1].line, 4);
        assert_eq!(outcome.conversations[1].conversation.messages[0].content, "hello");

        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].line, 3);
        assert_eq!(outcome.errors[0].content, "not json");
        assert_eq!(outcome.errors[0].kind, LineErrorKind::Syntax);
    }

    #[test]
    fn test_whitespace_lines_are_blank() {
        let mut parser = JsonlParser::new();
        let outcome = parser.parse_str("  \t \n\r\n{\"messages\":[]}\n").unwrap();
        assert_eq!(outcome.conversations.len(), 1);
        assert_eq!(outcome.conversations[0].line, 3);
        assert!(outcome.errors.is_empty());
        assert_eq!(parser.stats().empty_lines, 3);
    }

    #[test]
    fn test_error_keeps_untrimmed_content() {
        let mut parser = JsonlParser::new();
        let outcome = parser.parse_str("   {broken  ").unwrap();
        assert_eq!(outcome.errors[0].content, "   {broken  ");
    }

    #[test]
    fn test_crlf_lines_parse() {
        let mut parser = JsonlParser::new();
        let outcome = parser
            .parse_str("{\"messages\":[]}\r\n{\"messages\":[]}\r\n")
            .unwrap();
        assert_eq!(outcome.conversations.len(), 2);
    }

    #[test]
    fn test_non_json_whitespace_is_syntax_error() {
        let mut parser = JsonlParser::new();
        let input = "\u{a0}{\"messages\":[]}\n{\"messages\":[]}\u{2028}\n\t{\"messages\":[]} ";
        let outcome = parser.parse_str(input).unwrap();

        let lines: Vec<usize> = outcome.conversations.iter().map(|c| c.line).collect();
        assert_eq!(lines, vec![3]);
        let errors: Vec<(usize, LineErrorKind)> =
            outcome.errors.iter().map(|e| (e.line, e.kind)).collect();
        assert_eq!(errors, vec![(1, LineErrorKind::Syntax), (2, LineErrorKind::Syntax)]);
    }

    #[test]
    fn test_unicode_space_only_line_is_blank() {
        let mut parser = JsonlParser::new();
        let outcome = parser.parse_str("\u{a0}\u{2003}").unwrap();
        assert!(outcome.errors.is_empty());
        assert_eq!(parser.stats().empty_lines, 1);
    }

    #[test]
    fn test_schema_mismatch_recorded() {
        let content = "{}\n\"just a string\"\n{\"messages\":[{\"role\":\"user\",\"content\":7}]}";
        let mut parser = JsonlParser::new();
        let outcome = parser.parse_str(content).unwrap();

        assert!(outcome.conversations.is_empty());
        assert_eq!(outcome.errors.len(), 3);
        assert!(outcome.errors.iter().all(|e| e.kind == LineErrorKind::Schema));
        assert_eq!(
            outcome.errors.iter().map(|e| e.line).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_strict_mode_fails_fast() {
        let mut parser = JsonlParser::new().with_lenient(false);
        let err = parser.parse_str(SCENARIO).unwrap_err();
        assert!(matches!(err, EditorError::ParseError { line: 3, .. }));
    }

    #[test]
    fn test_parse_stats() {
        let mut parser = JsonlParser::new();
        parser.parse_str(SCENARIO).unwrap();

        let stats = parser.stats();
        assert_eq!(stats.lines_processed, 4);
        assert_eq!(stats.conversations_parsed, 2);
        assert_eq!(stats.lines_failed, 1);
        assert_eq!(stats.empty_lines, 1);
        assert_eq!(stats.messages_parsed, 2);
        assert!((stats.success_rate() - 66.666).abs() < 0.01);
    }

    #[test]
    fn test_stats_reset_between_parses() {
        let mut parser = JsonlParser::new();
        parser.parse_str(SCENARIO).unwrap();
        parser.parse_str("{\"messages\":[]}").unwrap();
        assert_eq!(parser.stats().lines_processed, 1);
        assert_eq!(parser.stats().lines_failed, 0);
    }

    #[test]
    fn test_parse_file_missing() {
        let mut parser = JsonlParser::new();
        let err = parser.parse_file("/definitely/not/here.jsonl").unwrap_err();
        assert!(matches!(err, EditorError::FileNotFound { .. }));
    }

    #[test]
    fn test_parse_file_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.jsonl");
        std::fs::write(&path, SCENARIO).unwrap();

        let mut parser = JsonlParser::new().with_max_bytes(10);
        let err = parser.parse_file(&path).unwrap_err();
        assert!(matches!(err, EditorError::FileTooLarge { limit: 10, .. }));

        let mut parser = JsonlParser::new().with_max_bytes(10_000);
        assert_eq!(parser.parse_file(&path).unwrap().conversations.len(), 2);
    }

    #[test]
    fn test_parse_conversation() {
        let conv = JsonlParser::parse_conversation(r#"{"messages":[]}"#).unwrap();
        assert!(conv.is_empty());
        assert!(JsonlParser::parse_conversation("{}").is_err());
    }
}
