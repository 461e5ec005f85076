//! Error types for convo-edit.
//!
//! Every fallible operation in the crate returns [`Result`], built on the
//! thiserror-derived [`EditorError`]. Per-line parse failures during a lenient
//! import are not errors in this sense: they are collected as
//! [`crate::parser::LineError`] values and kept in the store.

use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for convo-edit operations.
#[derive(Error, Debug)]
pub enum EditorError {
    /// JSONL parsing failed (strict mode only).
    #[error("Failed to parse JSONL at line {line}: {message}")]
    ParseError {
        /// Line number where parsing failed.
        line: usize,
        /// Human-readable error message.
        message: String,
        /// Underlying serde_json error, if available.
        #[source]
        source: Option<serde_json::Error>,
    },

    /// Export requested with no conversations loaded.
    #[error("Nothing to export: no conversations are loaded")]
    EmptyExport,

    /// A select or edit addressed a conversation or message that does not exist.
    #[error("Invalid edit target: conversation {conversation}{}", .message.map(|m| format!(", message {m}")).unwrap_or_default())]
    InvalidTarget {
        /// Conversation identifier or position as supplied by the caller.
        conversation: String,
        /// Message index, when the target was a message.
        message: Option<usize>,
    },

    /// An operation needed a selected conversation but none is selected.
    #[error("No conversation is selected")]
    NoSelection,

    /// A commit or draft update was issued while no message is being edited.
    #[error("No message is being edited")]
    NotEditing,

    /// An import finished after a newer import had already been started.
    #[error("Import {ticket} was superseded by import {current}")]
    StaleImport {
        /// Generation of the finished import.
        ticket: u64,
        /// Generation of the newest import.
        current: u64,
    },

    /// The mirror sink failed to persist the exported text.
    #[error("Mirror failed: {message}")]
    MirrorError {
        /// Human-readable error message.
        message: String,
        /// Underlying error, if available.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Permission denied when accessing a file or directory.
    #[error("Permission denied: {path}")]
    PermissionDenied {
        /// Path where access was denied.
        path: PathBuf,
    },

    /// Input file exceeds the configured size limit.
    #[error("File {path} is {size} bytes, above the {limit} byte limit")]
    FileTooLarge {
        /// Path to the oversized file.
        path: PathBuf,
        /// Actual size in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Human-readable error message.
        message: String,
    },

    /// Invalid configuration file contents.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// Human-readable error message.
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {context}")]
    IoError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Serialization error: {context}")]
    SerializationError {
        /// Context describing the operation that failed.
        context: String,
        /// Underlying serde_json error.
        #[source]
        source: serde_json::Error,
    },

    /// Unsupported operation or feature.
    #[error("Unsupported: {feature}")]
    Unsupported {
        /// Name of the unsupported feature.
        feature: String,
    },

    /// TUI error.
    #[error("TUI error: {message}")]
    TuiError {
        /// Human-readable error message.
        message: String,
    },

    /// Interrupted operation.
    #[error("Operation interrupted")]
    Interrupted,
}

impl EditorError {
    /// Create a new parse error.
    #[must_use]
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new parse error with source.
    #[must_use]
    pub fn parse_with_source(line: usize, message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::ParseError {
            line,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a new I/O error with context.
    #[must_use]
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoError {
            context: context.into(),
            source,
        }
    }

    /// Map an I/O error on `path` to the most specific variant.
    #[must_use]
    pub fn from_io_at(path: &std::path::Path, context: impl Into<String>, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Self::io(context, source),
        }
    }

    /// Create a new mirror error.
    #[must_use]
    pub fn mirror(message: impl Into<String>) -> Self {
        Self::MirrorError {
            message: message.into(),
            source: None,
        }
    }

    /// Create an invalid-target error for a conversation.
    #[must_use]
    pub fn invalid_target(conversation: impl ToString, message: Option<usize>) -> Self {
        Self::InvalidTarget {
            conversation: conversation.to_string(),
            message,
        }
    }

    /// Create a new unsupported error.
    #[must_use]
    pub fn unsupported(feature: impl Into<String>) -> Self {
        Self::Unsupported {
            feature: feature.into(),
        }
    }

    /// Get the process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ParseError { .. } => exit_codes::EXIT_PARSE_ERROR,
            Self::FileNotFound { .. } => exit_codes::EXIT_FILE_NOT_FOUND,
            Self::PermissionDenied { .. } => exit_codes::EXIT_PERMISSION_DENIED,
            Self::ConfigError { .. } | Self::InvalidConfig { .. } => exit_codes::EXIT_CONFIG_ERROR,
            Self::EmptyExport | Self::MirrorError { .. } => exit_codes::EXIT_EXPORT_ERROR,
            Self::InvalidTarget { .. } | Self::NoSelection | Self::NotEditing => {
                exit_codes::EXIT_USAGE_ERROR
            }
            Self::FileTooLarge { .. } => exit_codes::EXIT_DATA_ERROR,
            Self::Interrupted => exit_codes::EXIT_INTERRUPTED,
            Self::IoError { .. } => exit_codes::EXIT_IO_ERROR,
            _ => exit_codes::EXIT_GENERAL_ERROR,
        }
    }

    /// Check whether the editor remains usable after this error.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::TuiError { .. } | Self::Interrupted)
    }
}

/// Result type alias for convo-edit operations.
pub type Result<T> = std::result::Result<T, EditorError>;

impl From<std::io::Error> for EditorError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError {
            context: "I/O operation failed".to_string(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for EditorError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError {
            context: "JSON operation failed".to_string(),
            source: err,
        }
    }
}

/// Exit codes for CLI operations.
pub mod exit_codes {
    /// Operation completed successfully.
    pub const EXIT_SUCCESS: i32 = 0;
    /// General/unspecified error.
    pub const EXIT_GENERAL_ERROR: i32 = 1;
    /// JSONL parsing failed.
    pub const EXIT_PARSE_ERROR: i32 = 2;
    /// Specified file not found.
    pub const EXIT_FILE_NOT_FOUND: i32 = 3;
    /// Insufficient permissions.
    pub const EXIT_PERMISSION_DENIED: i32 = 4;
    /// Invalid configuration.
    pub const EXIT_CONFIG_ERROR: i32 = 5;
    /// Export operation failed.
    pub const EXIT_EXPORT_ERROR: i32 = 6;
    /// Invalid command-line usage (BSD standard).
    pub const EXIT_USAGE_ERROR: i32 = 64;
    /// Input data format error (BSD standard).
    pub const EXIT_DATA_ERROR: i32 = 65;
    /// I/O error (BSD standard).
    pub const EXIT_IO_ERROR: i32 = 74;
    /// Terminated by Ctrl+C (128 + SIGINT).
    pub const EXIT_INTERRUPTED: i32 = 130;
}
