//! File system watcher for detecting external changes
//!
//! Monitors open documents for modifications made outside the editor so
//! clean sessions can be reloaded.

use crate::error::WatcherError;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::time::{Duration, Instant};

/// Events from the file watcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A watched file was modified or recreated
    FileModified(PathBuf),

    /// A watched file was deleted
    FileDeleted(PathBuf),

    /// Watcher error occurred
    Error(String),
}

/// Manages file system watching
pub struct FileWatcher {
    watcher: RecommendedWatcher,

    event_rx: Receiver<notify::Result<Event>>,

    /// Files being watched (normalized)
    watched_files: HashSet<PathBuf>,

    debounce: Duration,

    pending_events: Vec<WatchEvent>,

    last_process: Instant,
}

impl FileWatcher {
    /// Create a new file watcher
    pub fn new(debounce_ms: u64) -> Result<Self, WatcherError> {
        let (tx, rx) = channel();

        let watcher = RecommendedWatcher::new(
            move |res| {
                let _ = tx.send(res);
            },
            Config::default(),
        )
        .map_err(|e| WatcherError::InitError(e.to_string()))?;

        Ok(Self {
            watcher,
            event_rx: rx,
            watched_files: HashSet::new(),
            debounce: Duration::from_millis(debounce_ms),
            pending_events: Vec::new(),
            last_process: Instant::now(),
        })
    }

    /// Watch a file for changes
    ///
    /// The parent directory is watched so that editors which save by
    /// replacing the file are still observed.
    pub fn watch(&mut self, path: impl AsRef<Path>) -> Result<(), WatcherError> {
        let path = crate::file_handler::normalize_path(path);
        if self.watched_files.contains(&path) {
            return Ok(());
        }

        let dir = path.parent().map(Path::to_path_buf).unwrap_or_else(|| path.clone());
        self.watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|source| WatcherError::WatchError {
                path: dir.clone(),
                source,
            })?;

        log::debug!("Watching {}", path.display());
        self.watched_files.insert(path);
        Ok(())
    }

    /// Stop watching a file
    pub fn unwatch(&mut self, path: impl AsRef<Path>) {
        let path = crate::file_handler::normalize_path(path);
        self.watched_files.remove(&path);
    }

    /// Poll for new events (non-blocking, debounced)
    pub fn poll(&mut self) -> Vec<WatchEvent> {
        while let Ok(event_result) = self.event_rx.try_recv() {
            match event_result {
                Ok(event) => self.collect_event(event),
                Err(e) => self.pending_events.push(WatchEvent::Error(e.to_string())),
            }
        }

        let now = Instant::now();
        if now.duration_since(self.last_process) < self.debounce {
            return Vec::new();
        }
        self.last_process = now;

        let mut events = Vec::new();
        for event in self.pending_events.drain(..) {
            if !events.contains(&event) {
                events.push(event);
            }
        }
        events
    }

    fn collect_event(&mut self, event: Event) {
        for path in event.paths {
            let path = crate::file_handler::normalize_path(&path);
            if !self.watched_files.contains(&path) {
                continue;
            }
            let watch_event = match event.kind {
                EventKind::Create(_) | EventKind::Modify(_) => WatchEvent::FileModified(path),
                EventKind::Remove(_) => WatchEvent::FileDeleted(path),
                _ => continue,
            };
            self.pending_events.push(watch_event);
        }
    }

    /// Number of files being watched
    pub fn watched_count(&self) -> usize {
        self.watched_files.len()
    }
}
