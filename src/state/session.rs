//! A single open document
//!
//! Sessions are mutated only by the registry, which keeps the dirty flag
//! and change notifications consistent.

use crate::config::UNTITLED_NAME;
use crate::file_handler::FileReadResult;
use crate::utils;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use uuid::Uuid;

/// Unique identifier for sessions, stable for the tab's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new unique session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Status bar statistics for a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentStats {
    pub bytes: usize,
    pub chars: usize,
    pub words: usize,
    pub lines: usize,
}

/// One open, editable document
#[derive(Debug, Clone)]
pub struct DocumentSession {
    id: SessionId,

    /// Document content as a rope
    content: ropey::Rope,

    /// Backing file (None for untitled documents)
    path: Option<PathBuf>,

    /// Whether the content differs from what was last persisted
    dirty: bool,

    display_name: String,

    /// Modification time of the file when it was last read or written
    last_disk_mtime: Option<SystemTime>,

    last_saved_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl DocumentSession {
    /// Create a new empty, untitled session
    pub fn untitled() -> Self {
        Self {
            id: SessionId::new(),
            content: ropey::Rope::new(),
            path: None,
            dirty: false,
            display_name: UNTITLED_NAME.to_string(),
            last_disk_mtime: None,
            last_saved_at: None,
        }
    }

    /// Create a clean session from file content
    pub fn from_file(path: PathBuf, read: FileReadResult) -> Self {
        Self {
            id: SessionId::new(),
            content: ropey::Rope::from_str(&read.content),
            display_name: utils::path::display_name(&path),
            path: Some(path),
            dirty: false,
            last_disk_mtime: read.modified,
            last_saved_at: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Current source text
    pub fn text(&self) -> String {
        self.content.to_string()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Tab title with modification indicator
    pub fn title(&self) -> String {
        if self.dirty {
            format!("• {}", self.display_name)
        } else {
            self.display_name.clone()
        }
    }

    /// Full path for tooltips, or the display name when untitled
    pub fn full_title(&self) -> String {
        match &self.path {
            Some(p) => p.to_string_lossy().to_string(),
            None => self.display_name.clone(),
        }
    }

    pub fn has_file(&self) -> bool {
        self.path.is_some()
    }

    pub fn last_disk_mtime(&self) -> Option<SystemTime> {
        self.last_disk_mtime
    }

    pub fn last_saved_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.last_saved_at
    }

    /// Whether the content is exactly `text`
    pub fn content_eq(&self, text: &str) -> bool {
        self.content.len_bytes() == text.len() && self.content == text
    }

    pub fn stats(&self) -> DocumentStats {
        DocumentStats {
            bytes: self.content.len_bytes(),
            chars: self.content.len_chars(),
            words: utils::text::word_count(&self.text()),
            lines: self.content.len_lines(),
        }
    }

    /// Replace the content from an edit; returns false when nothing changed
    pub(crate) fn apply_edit(&mut self, text: &str) -> bool {
        if self.content_eq(text) {
            return false;
        }
        self.content = ropey::Rope::from_str(text);
        self.dirty = true;
        true
    }

    /// Record a successful write to `path`
    pub(crate) fn mark_saved(&mut self, path: PathBuf, mtime: Option<SystemTime>) {
        self.display_name = utils::path::display_name(&path);
        self.path = Some(path);
        self.dirty = false;
        self.last_disk_mtime = mtime;
        self.last_saved_at = Some(chrono::Utc::now());
    }

    /// Replace content with what is on disk; the session becomes clean
    pub(crate) fn replace_from_disk(&mut self, read: FileReadResult) -> bool {
        let changed = !self.content_eq(&read.content);
        if changed {
            self.content = ropey::Rope::from_str(&read.content);
        }
        self.dirty = false;
        self.last_disk_mtime = read.modified;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_handler::FileEncoding;

    fn read_result(content: &str) -> FileReadResult {
        FileReadResult {
            content: content.to_string(),
            encoding: FileEncoding::Utf8,
            size_bytes: content.len() as u64,
            modified: None,
        }
    }

    #[test]
    fn test_untitled_session() {
        let session = DocumentSession::untitled();
        assert!(session.path().is_none());
        assert!(!session.is_dirty());
        assert_eq!(session.display_name(), "Untitled");
        assert_eq!(session.text(), "");
    }

    #[test]
    fn test_from_file() {
        let session = DocumentSession::from_file(PathBuf::from("/test/file.md"), read_result("# Hi"));
        assert_eq!(session.display_name(), "file.md");
        assert_eq!(session.full_title(), "/test/file.md");
        assert!(!session.is_dirty());
    }

    #[test]
    fn test_edit_sets_dirty_only_on_change() {
        let mut session = DocumentSession::untitled();
        assert!(!session.apply_edit(""));
        assert!(!session.is_dirty());

        assert!(session.apply_edit("hello"));
        assert!(session.is_dirty());
        assert_eq!(session.title(), "• Untitled");
    }

    #[test]
    fn test_mark_saved_assigns_path() {
        let mut session = DocumentSession::untitled();
        session.apply_edit("x");
        session.mark_saved(PathBuf::from("/docs/new.md"), None);

        assert!(!session.is_dirty());
        assert_eq!(session.display_name(), "new.md");
        assert!(session.last_saved_at().is_some());
    }

    #[test]
    fn test_stats() {
        let mut session = DocumentSession::untitled();
        session.apply_edit("# Héllo world\nsecond line\n");
        let stats = session.stats();
        assert_eq!(stats.words, 5);
        assert_eq!(stats.lines, 3);
        assert_eq!(stats.chars, 26);
        assert_eq!(stats.bytes, 27);
    }
}
