//! Utility functions for common operations.
//!
//! - Atomic file writes for exports, mirrors and configuration
//! - Character-aware truncation for previews
//! - Output path derivation

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{EditorError, Result};

/// Atomically write content to a file.
///
/// The content goes to a temporary file in the target's directory, is flushed,
/// and is then renamed over the target. If any step fails, the original file
/// (if it exists) remains unchanged.
///
/// # Example
///
/// ```rust,no_run
/// use convo_edit::util::atomic_write;
///
/// atomic_write("out.jsonl", b"{\"messages\":[]}").unwrap();
/// ```
pub fn atomic_write(path: impl AsRef<Path>, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    if !parent.exists() {
        std::fs::create_dir_all(parent).map_err(|e| {
            EditorError::io(format!("Failed to create directory: {}", parent.display()), e)
        })?;
    }

    // Same directory keeps the final rename on one filesystem
    let mut temp_file = NamedTempFile::new_in(parent).map_err(|e| {
        EditorError::io(
            format!("Failed to create temporary file in: {}", parent.display()),
            e,
        )
    })?;

    temp_file.write_all(content).map_err(|e| {
        EditorError::io(
            format!("Failed to write to temporary file for: {}", path.display()),
            e,
        )
    })?;

    temp_file.flush().map_err(|e| {
        EditorError::io(
            format!("Failed to flush temporary file for: {}", path.display()),
            e,
        )
    })?;

    temp_file.persist(path).map_err(|e| {
        EditorError::from_io_at(
            path,
            format!("Failed to atomically write file: {}", path.display()),
            e.error,
        )
    })?;

    Ok(())
}

/// Truncate a string to at most `max_chars` characters, ending in `...` when cut.
///
/// Counts characters rather than bytes so multi-byte text never splits.
#[must_use]
pub fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars <= 3 {
        return ".".repeat(max_chars);
    }
    let kept: String = s.chars().take(max_chars - 3).collect();
    format!("{kept}...")
}

/// Derive the default export path for an input file: `<stem>.<suffix>.jsonl`
/// next to the input.
#[must_use]
pub fn derived_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "conversations".to_string());
    let name = if suffix.is_empty() {
        format!("{stem}.{}", crate::export::JSONL_EXTENSION)
    } else {
        format!("{stem}.{suffix}.{}", crate::export::JSONL_EXTENSION)
    };
    input.with_file_name(name)
}
