//! Noteism - document sessions and live preview for a Markdown editor
//!
//! The library is the editor's core without any UI toolkit:
//! - `state`: open document sessions, dirty tracking, autosave and change events
//! - `markdown`: fenced code highlighting, rendering, preview styles and the
//!   debounced preview coordinator
//! - `file_handler`: encoding-aware reads, atomic writes and file watching
//! - `config`: persisted user settings

pub mod config;
pub mod error;
pub mod file_handler;
pub mod markdown;
pub mod state;
pub mod utils;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use markdown::{MarkdownRenderer, PreviewCoordinator, RenderedDocument, StyleCatalog};
pub use state::{DocumentSession, SessionEvent, SessionId, SessionRegistry};
