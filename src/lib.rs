//! convo-edit: inspect, search and edit conversation logs stored as JSONL.
//!
//! Each line of the input is one conversation, `{"messages": [{"role", "content"}, ...]}`.
//! The crate imports such a file into an in-memory store, keeps the lines that
//! failed to parse (with their line numbers), lets you filter and select
//! conversations, replace the content of individual messages, and exports the
//! result back to JSONL.
//!
//! # Features
//!
//! - **Lenient import**: bad lines are recorded, never fatal (unless strict)
//! - **Lossless round-trip**: unknown keys survive import and export
//! - **Stable selection**: conversations are addressed by id, not by value
//! - **Dual interface**: scriptable CLI and an interactive TUI
//!
//! # Quick Start
//!
//! ```rust
//! use convo_edit::store::ConversationStore;
//!
//! let mut store = ConversationStore::new();
//! let summary = store.import_str(
//!     "{\"messages\":[{\"role\":\"user\",\"content\":\"hi\"}]}\n\nnot json\n\
//!      {\"messages\":[{\"role\":\"assistant\",\"content\":\"hello\"}]}",
//! );
//! assert_eq!(summary.conversations, 2);
//! assert_eq!(store.errors()[0].line, 3);
//!
//! store.edit_at_position(1, 0, "hi there")?;
//! let jsonl = store.export()?;
//! assert!(jsonl.starts_with("{\"messages\":[{\"role\":\"user\",\"content\":\"hi there\"}]}"));
//! # Ok::<(), convo_edit::EditorError>(())
//! ```
//!
//! # Architecture
//!
//! - [`model`]: Conversation and message types
//! - [`parser`]: JSONL parsing with per-line error recovery
//! - [`filter`]: Case-insensitive search producing a derived view
//! - [`store`]: The conversation store (selection, editing, export)
//! - [`export`]: JSONL serialization and atomic file output
//! - [`session`]: Import ordering, mirroring and user notices
//! - [`cli`]: Command-line interface
//! - [`tui`]: Terminal user interface
//! - [`config`]: Configuration management
//! - [`error`]: Error types and handling

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod model;
pub mod parser;
pub mod session;
pub mod store;
pub mod tui;
pub mod util;

// Re-export commonly used types at the crate root
pub use error::{EditorError, Result};
pub use model::{Conversation, Message};
pub use store::{ConversationId, ConversationStore};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{EditorError, Result};
    pub use crate::export::{to_jsonl, ExportOptions};
    pub use crate::model::{Conversation, Message};
    pub use crate::parser::{JsonlParser, LineError};
    pub use crate::session::{FileMirror, MirrorSink, Notice, NoticeLevel, Session};
    pub use crate::store::{ConversationId, ConversationStore};
}
