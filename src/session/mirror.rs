//! Best-effort persistence of the exported text.

use std::path::{Path, PathBuf};

use crate::error::{EditorError, Result};
use crate::util::atomic_write;

/// A sink that receives the full JSONL export after imports and edits.
///
/// Failures are reported to the user but never undo the change that
/// triggered the mirror.
pub trait MirrorSink: Send {
    /// Short human-readable name for notices and logs.
    fn name(&self) -> String;

    /// Persist the export.
    fn mirror(&mut self, jsonl: &str) -> Result<()>;
}

/// Mirrors the export to a file, replacing it atomically each time.
#[derive(Debug, Clone)]
pub struct FileMirror {
    path: PathBuf,
}

impl FileMirror {
    /// Mirror to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Target path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MirrorSink for FileMirror {
    fn name(&self) -> String {
        format!("file {}", self.path.display())
    }

    fn mirror(&mut self, jsonl: &str) -> Result<()> {
        atomic_write(&self.path, jsonl.as_bytes()).map_err(|e| EditorError::MirrorError {
            message: format!("could not write {}", self.path.display()),
            source: Some(Box::new(e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_mirror_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirror.jsonl");
        let mut sink = FileMirror::new(&path);

        sink.mirror("{\"messages\":[]}").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{\"messages\":[]}");
        assert!(sink.name().contains("mirror.jsonl"));
    }

    #[test]
    fn test_file_mirror_failure_is_mirror_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be replaced by a file rename.
        let mut sink = FileMirror::new(dir.path());
        let err = sink.mirror("x").unwrap_err();
        assert!(matches!(err, EditorError::MirrorError { .. }));
    }
}
