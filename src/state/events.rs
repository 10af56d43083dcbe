//! Session change notifications

use super::session::SessionId;
use std::path::PathBuf;

/// Change notifications emitted by the session registry
///
/// Subscribers receive these through a channel obtained from
/// `SessionRegistry::subscribe`; a dropped receiver is silently pruned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A new untitled session was created
    Created { id: SessionId },
    /// A file was opened into a new session
    Opened { id: SessionId, path: PathBuf },
    /// The session became the active one
    Activated { id: SessionId },
    /// Source text changed through an edit
    ContentChanged { id: SessionId },
    /// The dirty flag flipped
    DirtyChanged { id: SessionId, dirty: bool },
    /// Content was written to `path`
    Saved { id: SessionId, path: PathBuf },
    /// Content was replaced from disk after an external change
    Reloaded { id: SessionId },
    Closed { id: SessionId },
}

impl SessionEvent {
    /// The session this event is about
    pub fn session_id(&self) -> SessionId {
        match self {
            SessionEvent::Created { id }
            | SessionEvent::Opened { id, .. }
            | SessionEvent::Activated { id }
            | SessionEvent::ContentChanged { id }
            | SessionEvent::DirtyChanged { id, .. }
            | SessionEvent::Saved { id, .. }
            | SessionEvent::Reloaded { id }
            | SessionEvent::Closed { id } => *id,
        }
    }
}
