//! The editing session: a store plus its side channels.
//!
//! [`Session`] owns the [`ConversationStore`] for the lifetime of a command
//! or TUI run and adds what the store itself does not know about:
//!
//! - reading input files with the configured parser settings,
//! - ordering imports so a superseded import can never overwrite a newer one,
//! - handing the export to an optional [`MirrorSink`] after imports and edits,
//! - collecting user-facing [`Notice`]s for failures that must not abort.

mod mirror;

pub use mirror::{FileMirror, MirrorSink};

use std::collections::VecDeque;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::error::{EditorError, Result};
use crate::export::{self, ExportOptions};
use crate::parser::{JsonlParser, ParseOutcome, ParseStats};
use crate::store::{ConversationId, ConversationStore, EditOutcome, ImportSummary};

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Something worked.
    Info,
    /// Something was skipped or partially failed.
    Warning,
    /// An operation failed.
    Error,
}

/// A human-readable message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub level: NoticeLevel,
    /// Text to show.
    pub message: String,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Handle for an import in flight. Only the newest ticket may be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportTicket {
    generation: u64,
}

impl ImportTicket {
    /// Generation number of this import.
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.generation
    }
}

/// Parser settings applied to every import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Record bad lines instead of failing the import.
    pub lenient: bool,
    /// Maximum input file size in bytes (0 = unlimited).
    pub max_bytes: u64,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            lenient: true,
            max_bytes: 0,
        }
    }
}

/// An editing session.
pub struct Session {
    store: ConversationStore,
    mirror: Option<Box<dyn MirrorSink>>,
    notices: VecDeque<Notice>,
    import_options: ImportOptions,
    export_options: ExportOptions,
    /// Newest import generation handed out.
    generation: u64,
    /// File the current data came from.
    source: Option<PathBuf>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("store", &self.store)
            .field("mirror", &self.mirror.as_ref().map(|m| m.name()))
            .field("notices", &self.notices)
            .field("generation", &self.generation)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session with an empty store and no mirror.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: ConversationStore::new(),
            mirror: None,
            notices: VecDeque::new(),
            import_options: ImportOptions::default(),
            export_options: ExportOptions::default(),
            generation: 0,
            source: None,
        }
    }

    /// Attach a mirror sink.
    #[must_use]
    pub fn with_mirror(mut self, sink: Box<dyn MirrorSink>) -> Self {
        self.mirror = Some(sink);
        self
    }

    /// Set parser options for imports.
    #[must_use]
    pub fn with_import_options(mut self, options: ImportOptions) -> Self {
        self.import_options = options;
        self
    }

    /// Set options for file exports.
    #[must_use]
    pub fn with_export_options(mut self, options: ExportOptions) -> Self {
        self.export_options = options;
        self
    }

    /// The store.
    #[must_use]
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Mutable store access for selection, search and drafts.
    ///
    /// Content edits should go through [`Session::edit_message`] or
    /// [`Session::commit_edit`] so they reach the mirror.
    pub fn store_mut(&mut self) -> &mut ConversationStore {
        &mut self.store
    }

    /// File the current data was imported from.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    // ---------------------------------------------------------------------
    // Imports
    // ---------------------------------------------------------------------

    /// Start an import. Any import started earlier becomes stale.
    pub fn begin_import(&mut self) -> ImportTicket {
        self.generation += 1;
        ImportTicket {
            generation: self.generation,
        }
    }

    /// Finish an import from text.
    ///
    /// Fails with [`EditorError::StaleImport`] without touching the store when a
    /// newer import has been started since `ticket` was issued.
    pub fn complete_import(&mut self, ticket: ImportTicket, text: &str) -> Result<ImportSummary> {
        self.check_ticket(ticket)?;
        let mut parser = self.parser();
        match parser.parse_str(text) {
            Ok(outcome) => Ok(self.apply_import(outcome, parser.stats().clone(), None)),
            Err(e) => Err(self.report(e)),
        }
    }

    /// Import text in one step.
    pub fn import_str(&mut self, text: &str) -> Result<ImportSummary> {
        let ticket = self.begin_import();
        self.complete_import(ticket, text)
    }

    /// Read and import a file.
    ///
    /// Read failures are reported as notices and returned; the store keeps its
    /// previous contents.
    #[instrument(skip(self), fields(path = %path.as_ref().display()))]
    pub fn import_file(&mut self, path: impl AsRef<Path>) -> Result<ImportSummary> {
        let path = path.as_ref();
        let ticket = self.begin_import();
        let mut parser = self.parser();
        let outcome = match parser.parse_file(path) {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.report(e)),
        };
        self.check_ticket(ticket)?;
        Ok(self.apply_import(outcome, parser.stats().clone(), Some(path.to_path_buf())))
    }

    fn parser(&self) -> JsonlParser {
        JsonlParser::new()
            .with_lenient(self.import_options.lenient)
            .with_max_bytes(self.import_options.max_bytes)
    }

    fn check_ticket(&self, ticket: ImportTicket) -> Result<()> {
        if ticket.generation == self.generation {
            Ok(())
        } else {
            Err(EditorError::StaleImport {
                ticket: ticket.generation,
                current: self.generation,
            })
        }
    }

    fn apply_import(
        &mut self,
        outcome: ParseOutcome,
        stats: ParseStats,
        source: Option<PathBuf>,
    ) -> ImportSummary {
        let summary = self.store.replace(outcome, stats);
        self.source = source;
        info!(
            conversations = summary.conversations,
            errors = summary.errors,
            "Import complete"
        );
        if summary.errors > 0 {
            self.notify(
                NoticeLevel::Warning,
                format!(
                    "{} line{} could not be parsed",
                    summary.errors,
                    if summary.errors == 1 { "" } else { "s" }
                ),
            );
        }
        if !self.store.is_empty() {
            self.mirror_now();
        }
        summary
    }

    // ---------------------------------------------------------------------
    // Edits
    // ---------------------------------------------------------------------

    /// Replace one message's content and mirror the result.
    pub fn edit_message(
        &mut self,
        id: ConversationId,
        message: usize,
        content: impl Into<String>,
    ) -> Result<String> {
        let previous = self.store.edit_message(id, message, content)?;
        self.mirror_now();
        Ok(previous)
    }

    /// Commit the store's in-progress edit and mirror the result.
    pub fn commit_edit(&mut self) -> Result<EditOutcome> {
        let outcome = self.store.commit_edit()?;
        self.mirror_now();
        Ok(outcome)
    }

    // ---------------------------------------------------------------------
    // Export
    // ---------------------------------------------------------------------

    /// Serialize the store. An empty store is reported as a notice and an error.
    pub fn export(&mut self) -> Result<String> {
        self.store.export().map_err(|e| self.report(e))
    }

    /// Export the store to a file and mark it saved.
    pub fn export_to(&mut self, path: &Path) -> Result<()> {
        let text = self.export()?;
        if let Err(e) = export::write_jsonl(path, &text, self.export_options) {
            return Err(self.report(e));
        }
        self.store.mark_saved();
        self.notify(
            NoticeLevel::Info,
            format!("Exported {} conversations to {}", self.store.len(), path.display()),
        );
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Notices
    // ---------------------------------------------------------------------

    /// Queue a notice for the user.
    pub fn notify(&mut self, level: NoticeLevel, message: impl Into<String>) {
        let message = message.into();
        // Consumers show notices themselves; the log only traces them.
        debug!(level = ?level, notice = %message, "Notice queued");
        self.notices.push_back(Notice { level, message });
    }

    /// Pending notices, oldest first.
    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    /// Remove and return all pending notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// Turn an error into an error notice and hand it back.
    fn report(&mut self, error: EditorError) -> EditorError {
        self.notify(NoticeLevel::Error, error.to_string());
        error
    }

    /// Hand the current export to the mirror. Failures become notices only.
    fn mirror_now(&mut self) {
        let Some(sink) = self.mirror.as_mut() else {
            return;
        };
        let result = self.store.export().and_then(|text| sink.mirror(&text));
        if let Err(e) = result {
            let name = sink.name();
            self.notify(NoticeLevel::Error, format!("Mirror to {name} failed: {e}"));
        }
    }
}
