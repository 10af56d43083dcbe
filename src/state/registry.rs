//! Open document sessions
//!
//! The registry owns every `DocumentSession`, tracks which one is active and
//! is the only place sessions are mutated. All changes are announced as
//! [`SessionEvent`]s to subscribers.

use super::events::SessionEvent;
use super::session::{DocumentSession, SessionId};
use crate::config::{FileConfig, MAX_FILE_SIZE};
use crate::error::{SessionError, SessionResult};
use crate::file_handler::{self, modified_time, normalize_path};
use crate::utils::{self, IntervalTimer};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

/// Name proposed for an untitled document's first save
pub const DEFAULT_SAVE_NAME: &str = "new_file.md";

/// Result of `SessionRegistry::open`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOutcome {
    pub id: SessionId,
    /// The path was already open and its session was activated instead
    pub already_open: bool,
}

/// How to resolve closing a session with unsaved changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseResolution {
    /// Save to the session's own path
    Save,
    /// Save to a new path first
    SaveAs(PathBuf),
    /// Drop the unsaved changes
    Discard,
    /// Abort the close
    Cancel,
}

/// Result of `SessionRegistry::close`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    /// The session is gone; `replacement` is set when an untitled session
    /// had to be created to keep the registry non-empty
    Closed { replacement: Option<SessionId> },
    Cancelled,
}

/// Outcome of one autosave pass
#[derive(Debug, Default)]
pub struct AutosaveReport {
    pub saved: Vec<(SessionId, PathBuf)>,
    pub failed: Vec<(SessionId, SessionError)>,
}

impl AutosaveReport {
    pub fn is_empty(&self) -> bool {
        self.saved.is_empty() && self.failed.is_empty()
    }
}

/// Registry of open documents; never empty
pub struct SessionRegistry {
    /// Sessions in tab order
    sessions: Vec<DocumentSession>,

    active: SessionId,

    subscribers: Vec<Sender<SessionEvent>>,

    max_file_size: u64,

    autosave: Option<IntervalTimer>,
}

impl SessionRegistry {
    /// Create a registry holding a single untitled session
    pub fn new() -> Self {
        let first = DocumentSession::untitled();
        Self {
            active: first.id(),
            sessions: vec![first],
            subscribers: Vec::new(),
            max_file_size: MAX_FILE_SIZE,
            autosave: None,
        }
    }

    /// Create a registry using file settings from the configuration
    pub fn from_config(files: &FileConfig, now: Instant) -> Self {
        let mut registry = Self::new().with_max_file_size(files.max_file_size);
        if files.autosave_enabled {
            registry.enable_autosave(Duration::from_secs(files.autosave_interval.max(1)), now);
        }
        registry
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Receive every event emitted from now on
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn emit(&mut self, event: SessionEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn index_of(&self, id: SessionId) -> SessionResult<usize> {
        self.sessions
            .iter()
            .position(|s| s.id() == id)
            .ok_or(SessionError::UnknownSession(id))
    }

    pub fn get(&self, id: SessionId) -> Option<&DocumentSession> {
        self.sessions.iter().find(|s| s.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DocumentSession> {
        self.sessions.iter()
    }

    pub fn count(&self) -> usize {
        self.sessions.len()
    }

    pub fn active_id(&self) -> SessionId {
        self.active
    }

    pub fn active(&self) -> Option<&DocumentSession> {
        self.get(self.active)
    }

    /// Make `id` the active session
    pub fn set_active(&mut self, id: SessionId) -> SessionResult<()> {
        self.index_of(id)?;
        if self.active != id {
            self.active = id;
            self.emit(SessionEvent::Activated { id });
        }
        Ok(())
    }

    /// Find the session backed by `path`, comparing normalized paths
    pub fn find_by_path(&self, path: impl AsRef<Path>) -> Option<SessionId> {
        let wanted = normalize_path(path);
        self.sessions
            .iter()
            .find(|s| s.path() == Some(wanted.as_path()))
            .map(DocumentSession::id)
    }

    /// Open a file, or activate the session that already has it open
    pub fn open(&mut self, path: impl AsRef<Path>) -> SessionResult<OpenOutcome> {
        let path = normalize_path(path);

        if let Some(id) = self.find_by_path(&path) {
            log::debug!("{} is already open, activating it", path.display());
            self.set_active(id)?;
            return Ok(OpenOutcome {
                id,
                already_open: true,
            });
        }

        let read = file_handler::read_file_with_limit(&path, self.max_file_size)?;
        log::info!(
            "Opened {} ({} bytes, {:?})",
            path.display(),
            read.size_bytes,
            read.encoding
        );

        let session = DocumentSession::from_file(path.clone(), read);
        let id = session.id();
        self.sessions.push(session);
        self.emit(SessionEvent::Opened { id, path });
        self.set_active(id)?;

        Ok(OpenOutcome {
            id,
            already_open: false,
        })
    }

    /// Create and activate a new untitled session
    pub fn create_untitled(&mut self) -> SessionId {
        let session = DocumentSession::untitled();
        let id = session.id();
        self.sessions.push(session);
        self.emit(SessionEvent::Created { id });
        self.active = id;
        self.emit(SessionEvent::Activated { id });
        id
    }

    /// Close a session
    ///
    /// A dirty session needs a resolution; without one the close is
    /// rejected and the session stays open. `Cancel` aborts any close.
    pub fn close(
        &mut self,
        id: SessionId,
        resolution: Option<CloseResolution>,
    ) -> SessionResult<CloseOutcome> {
        let index = self.index_of(id)?;

        if resolution == Some(CloseResolution::Cancel) {
            return Ok(CloseOutcome::Cancelled);
        }

        if self.sessions[index].is_dirty() {
            match resolution {
                None => return Err(SessionError::UnresolvedDirtyClose(id)),
                Some(CloseResolution::Save) => {
                    self.save(id, None)?;
                }
                Some(CloseResolution::SaveAs(target)) => {
                    self.save(id, Some(target.as_path()))?;
                }
                Some(CloseResolution::Discard) => {
                    log::info!("Discarding unsaved changes in {}", self.sessions[index].display_name());
                }
                Some(CloseResolution::Cancel) => return Ok(CloseOutcome::Cancelled),
            }
        }

        let index = self.index_of(id)?;
        let closed = self.sessions.remove(index);
        log::info!("Closed {}", closed.full_title());
        self.emit(SessionEvent::Closed { id });

        if self.sessions.is_empty() {
            let replacement = self.create_untitled();
            return Ok(CloseOutcome::Closed {
                replacement: Some(replacement),
            });
        }

        if self.active == id {
            let next = self.sessions[index.min(self.sessions.len() - 1)].id();
            self.active = next;
            self.emit(SessionEvent::Activated { id: next });
        }

        Ok(CloseOutcome::Closed { replacement: None })
    }

    /// Save a session, to `target` when given, else to its own path
    ///
    /// New targets get a `.md` suffix when they lack one. Returns the path
    /// written to.
    pub fn save(&mut self, id: SessionId, target: Option<&Path>) -> SessionResult<PathBuf> {
        let index = self.index_of(id)?;

        let path = match target {
            Some(target) => normalize_path(utils::path::ensure_md_extension(target)),
            None => self.sessions[index]
                .path()
                .map(Path::to_path_buf)
                .ok_or(SessionError::NoTargetPath(id))?,
        };

        if let Some(owner) = self.find_by_path(&path) {
            if owner != id {
                return Err(SessionError::PathAlreadyOpen { path, owner });
            }
        }

        let text = self.sessions[index].text();
        file_handler::write_file_atomic_sync(&path, &text)?;

        // Canonical form only exists once the file does
        let path = normalize_path(&path);
        let was_dirty = self.sessions[index].is_dirty();
        self.sessions[index].mark_saved(path.clone(), modified_time(&path));
        log::info!("Saved {} ({} bytes)", path.display(), text.len());

        self.emit(SessionEvent::Saved {
            id,
            path: path.clone(),
        });
        if was_dirty {
            self.emit(SessionEvent::DirtyChanged { id, dirty: false });
        }

        Ok(path)
    }

    /// Replace a session's text from an edit
    ///
    /// Returns whether the text changed. This is the single source of
    /// `ContentChanged` notifications.
    pub fn mark_edited(&mut self, id: SessionId, text: &str) -> SessionResult<bool> {
        let index = self.index_of(id)?;
        let was_dirty = self.sessions[index].is_dirty();

        if !self.sessions[index].apply_edit(text) {
            return Ok(false);
        }

        self.emit(SessionEvent::ContentChanged { id });
        if !was_dirty {
            self.emit(SessionEvent::DirtyChanged { id, dirty: true });
        }
        Ok(true)
    }

    /// Reload a clean session after its file changed on disk
    ///
    /// Dirty sessions are left alone. Returns whether the content changed.
    pub fn reload_from_disk(&mut self, id: SessionId) -> SessionResult<bool> {
        let index = self.index_of(id)?;
        let session = &self.sessions[index];

        if session.is_dirty() {
            log::debug!("Not reloading {}: unsaved changes", session.display_name());
            return Ok(false);
        }

        let path = session
            .path()
            .map(Path::to_path_buf)
            .ok_or(SessionError::NoTargetPath(id))?;
        let read = file_handler::read_file_with_limit(&path, self.max_file_size)?;

        let changed = self.sessions[index].replace_from_disk(read);
        if changed {
            log::info!("Reloaded {} from disk", path.display());
            self.emit(SessionEvent::Reloaded { id });
        }
        Ok(changed)
    }

    /// Sessions with unsaved changes
    pub fn unsaved_sessions(&self) -> Vec<SessionId> {
        self.sessions
            .iter()
            .filter(|s| s.is_dirty())
            .map(DocumentSession::id)
            .collect()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.sessions.iter().any(DocumentSession::is_dirty)
    }

    /// Path to offer in a save dialog
    pub fn suggest_save_path(&self, id: SessionId, documents_root: &Path) -> SessionResult<PathBuf> {
        let session = &self.sessions[self.index_of(id)?];
        Ok(session
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| documents_root.join(DEFAULT_SAVE_NAME)))
    }

    /// Save every dirty session that has a path
    ///
    /// Failures are reported and the session stays dirty, so the next pass
    /// retries it.
    pub fn autosave(&mut self) -> AutosaveReport {
        let candidates: Vec<SessionId> = self
            .sessions
            .iter()
            .filter(|s| s.is_dirty() && s.has_file())
            .map(DocumentSession::id)
            .collect();

        let mut report = AutosaveReport::default();
        for id in candidates {
            match self.save(id, None) {
                Ok(path) => report.saved.push((id, path)),
                Err(e) => {
                    log::warn!("Autosave failed: {}", e);
                    report.failed.push((id, e));
                }
            }
        }

        log::debug!(
            "Autosave pass: {} saved, {} failed",
            report.saved.len(),
            report.failed.len()
        );
        report
    }

    pub fn enable_autosave(&mut self, interval: Duration, now: Instant) {
        log::info!("Autosave enabled every {}s", interval.as_secs());
        self.autosave = Some(IntervalTimer::new(interval, now));
    }

    pub fn disable_autosave(&mut self) {
        self.autosave = None;
    }

    pub fn autosave_enabled(&self) -> bool {
        self.autosave.is_some()
    }

    /// Run an autosave pass if the timer is due
    pub fn poll_autosave(&mut self, now: Instant) -> Option<AutosaveReport> {
        let due = self.autosave.as_mut().map(|t| t.tick(now)).unwrap_or(false);
        due.then(|| self.autosave())
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn drain(rx: &Receiver<SessionEvent>) -> Vec<SessionEvent> {
        rx.try_iter().collect()
    }

    #[test]
    fn test_new_registry_has_one_session() {
        let registry = SessionRegistry::new();
        assert_eq!(registry.count(), 1);
        assert!(registry.active().is_some());
        assert!(!registry.has_unsaved_changes());
    }

    #[test]
    fn test_open_twice_returns_same_session() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "notes.md", "# Notes\n");
        let mut registry = SessionRegistry::new();

        let first = registry.open(&path).unwrap();
        let count = registry.count();
        let second = registry.open(&path).unwrap();

        assert!(!first.already_open);
        assert!(second.already_open);
        assert_eq!(first.id, second.id);
        assert_eq!(registry.count(), count);
        assert!(!registry.get(first.id).unwrap().is_dirty());
    }

    #[test]
    fn test_open_reactivates_existing() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.md", "a");
        let mut registry = SessionRegistry::new();

        let opened = registry.open(&path).unwrap().id;
        registry.create_untitled();
        assert_ne!(registry.active_id(), opened);

        let rx = registry.subscribe();
        registry.open(&path).unwrap();
        assert_eq!(registry.active_id(), opened);
        assert_eq!(drain(&rx), vec![SessionEvent::Activated { id: opened }]);
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let mut registry = SessionRegistry::new();
        let err = registry.open(dir.path().join("missing.md")).unwrap_err();
        assert!(matches!(err, SessionError::File(_)));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_open_respects_size_limit() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "big.md", "0123456789");
        let mut registry = SessionRegistry::new().with_max_file_size(4);
        assert!(registry.open(&path).is_err());
    }

    #[test]
    fn test_mark_edited_dirty_semantics() {
        let mut registry = SessionRegistry::new();
        let id = registry.active_id();
        let rx = registry.subscribe();

        assert!(!registry.mark_edited(id, "").unwrap());
        assert!(!registry.get(id).unwrap().is_dirty());
        assert!(drain(&rx).is_empty());

        assert!(registry.mark_edited(id, "hello").unwrap());
        assert!(registry.get(id).unwrap().is_dirty());
        assert_eq!(
            drain(&rx),
            vec![
                SessionEvent::ContentChanged { id },
                SessionEvent::DirtyChanged { id, dirty: true },
            ]
        );

        assert!(!registry.mark_edited(id, "hello").unwrap());
        assert!(registry.get(id).unwrap().is_dirty());
    }

    #[test]
    fn test_save_untitled_without_target_fails() {
        let mut registry = SessionRegistry::new();
        let id = registry.active_id();
        registry.mark_edited(id, "text").unwrap();
        assert!(matches!(
            registry.save(id, None),
            Err(SessionError::NoTargetPath(_))
        ));
        assert!(registry.get(id).unwrap().is_dirty());
    }

    #[test]
    fn test_save_appends_extension_and_round_trips() {
        let dir = TempDir::new().unwrap();
        let mut registry = SessionRegistry::new();
        let id = registry.active_id();
        registry.mark_edited(id, "# Saved\n\nbody\n").unwrap();

        let saved = registry.save(id, Some(dir.path().join("draft").as_path())).unwrap();
        assert_eq!(saved.file_name().unwrap(), "draft.md");
        assert!(!registry.get(id).unwrap().is_dirty());
        assert_eq!(registry.get(id).unwrap().display_name(), "draft.md");

        let mut fresh = SessionRegistry::new();
        let reopened = fresh.open(&saved).unwrap().id;
        assert_eq!(fresh.get(reopened).unwrap().text(), "# Saved\n\nbody\n");
    }

    #[test]
    fn test_save_keeps_uppercase_extension() {
        let dir = TempDir::new().unwrap();
        let mut registry = SessionRegistry::new();
        let id = registry.active_id();
        let saved = registry.save(id, Some(dir.path().join("README.MD").as_path())).unwrap();
        assert_eq!(saved.file_name().unwrap(), "README.MD");
    }

    #[test]
    fn test_save_to_path_owned_by_other_session() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "taken.md", "mine");
        let mut registry = SessionRegistry::new();
        let owner = registry.open(&path).unwrap().id;
        let other = registry.create_untitled();

        let err = registry.save(other, Some(path.as_path())).unwrap_err();
        assert!(matches!(err, SessionError::PathAlreadyOpen { owner: o, .. } if o == owner));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "mine");
    }

    #[test]
    fn test_close_last_session_creates_untitled() {
        let mut registry = SessionRegistry::new();
        let id = registry.active_id();

        let outcome = registry.close(id, None).unwrap();
        let CloseOutcome::Closed { replacement: Some(replacement) } = outcome else {
            panic!("expected a replacement session, got {:?}", outcome);
        };
        assert_eq!(registry.count(), 1);
        assert_eq!(registry.active_id(), replacement);
        assert!(registry.get(id).is_none());
    }

    #[test]
    fn test_close_dirty_requires_resolution() {
        let mut registry = SessionRegistry::new();
        let id = registry.active_id();
        registry.mark_edited(id, "unsaved").unwrap();

        assert!(matches!(
            registry.close(id, None),
            Err(SessionError::UnresolvedDirtyClose(_))
        ));
        assert_eq!(
            registry.close(id, Some(CloseResolution::Cancel)).unwrap(),
            CloseOutcome::Cancelled
        );
        assert!(registry.get(id).is_some());

        let outcome = registry.close(id, Some(CloseResolution::Discard)).unwrap();
        assert!(matches!(outcome, CloseOutcome::Closed { .. }));
        assert!(registry.get(id).is_none());
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_close_with_save_as() {
        let dir = TempDir::new().unwrap();
        let mut registry = SessionRegistry::new();
        let id = registry.active_id();
        registry.mark_edited(id, "keep me").unwrap();

        let target = dir.path().join("kept.md");
        registry
            .close(id, Some(CloseResolution::SaveAs(target.clone())))
            .unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "keep me");
    }

    #[test]
    fn test_close_failed_save_keeps_session() {
        let mut registry = SessionRegistry::new();
        let id = registry.active_id();
        registry.mark_edited(id, "text").unwrap();
        assert!(registry.close(id, Some(CloseResolution::Save)).is_err());
        assert!(registry.get(id).is_some());
    }

    #[test]
    fn test_close_active_activates_neighbour() {
        let mut registry = SessionRegistry::new();
        let first = registry.active_id();
        let second = registry.create_untitled();
        let third = registry.create_untitled();

        registry.set_active(second).unwrap();
        registry.close(second, None).unwrap();
        assert_eq!(registry.active_id(), third);

        registry.close(third, None).unwrap();
        assert_eq!(registry.active_id(), first);
    }

    #[test]
    fn test_count_never_zero() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.md", "a");
        let b = write(&dir, "b.md", "b");
        let mut registry = SessionRegistry::new();

        let a = registry.open(&a).unwrap().id;
        let b = registry.open(&b).unwrap().id;
        for id in registry.iter().map(DocumentSession::id).collect::<Vec<_>>() {
            registry.close(id, None).unwrap();
            assert!(registry.count() >= 1);
        }
        assert!(registry.get(a).is_none() && registry.get(b).is_none());
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_autosave_saves_only_dirty_with_path() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "auto.md", "old");
        let mut registry = SessionRegistry::new();
        let untitled = registry.active_id();
        let file = registry.open(&path).unwrap().id;

        registry.mark_edited(untitled, "no path").unwrap();
        registry.mark_edited(file, "new").unwrap();

        let report = registry.autosave();
        assert_eq!(report.saved.len(), 1);
        assert!(report.failed.is_empty());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert!(!registry.get(file).unwrap().is_dirty());
        assert!(registry.get(untitled).unwrap().is_dirty());
    }

    #[test]
    fn test_autosave_failure_is_retried() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "gone.md", "x");
        let mut registry = SessionRegistry::new();
        let id = registry.open(&path).unwrap().id;
        registry.mark_edited(id, "y").unwrap();

        std::fs::remove_dir_all(dir.path()).unwrap();
        let report = registry.autosave();
        assert_eq!(report.failed.len(), 1);
        assert!(registry.get(id).unwrap().is_dirty());

        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let report = registry.autosave();
        assert_eq!(report.saved.len(), 1);
        assert!(!registry.get(id).unwrap().is_dirty());
    }

    #[test]
    fn test_poll_autosave_follows_timer() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "timer.md", "a");
        let start = Instant::now();
        let mut registry = SessionRegistry::new();
        let id = registry.open(&path).unwrap().id;
        registry.mark_edited(id, "b").unwrap();

        assert!(registry.poll_autosave(start).is_none());

        registry.enable_autosave(Duration::from_secs(60), start);
        assert!(registry.poll_autosave(start + Duration::from_secs(10)).is_none());
        let report = registry.poll_autosave(start + Duration::from_secs(60)).unwrap();
        assert_eq!(report.saved.len(), 1);
    }

    #[test]
    fn test_reload_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "ext.md", "one");
        let mut registry = SessionRegistry::new();
        let id = registry.open(&path).unwrap().id;

        std::fs::write(&path, "two").unwrap();
        assert!(registry.reload_from_disk(id).unwrap());
        assert_eq!(registry.get(id).unwrap().text(), "two");

        registry.mark_edited(id, "local").unwrap();
        std::fs::write(&path, "three").unwrap();
        assert!(!registry.reload_from_disk(id).unwrap());
        assert_eq!(registry.get(id).unwrap().text(), "local");
    }

    #[test]
    fn test_suggest_save_path() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "named.md", "");
        let mut registry = SessionRegistry::new();
        let untitled = registry.active_id();
        let named = registry.open(&path).unwrap().id;

        assert_eq!(
            registry.suggest_save_path(untitled, Path::new("/docs")).unwrap(),
            PathBuf::from("/docs/new_file.md")
        );
        assert_eq!(
            registry.suggest_save_path(named, Path::new("/docs")).unwrap(),
            normalize_path(&path)
        );
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut registry = SessionRegistry::new();
        let rx = registry.subscribe();
        drop(rx);
        registry.create_untitled();
        assert!(registry.subscribers.is_empty());
    }
}
