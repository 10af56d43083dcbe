//! State management module for Noteism
//!
//! This module contains the document session types:
//! - `session`: A single open document and its dirty tracking
//! - `events`: Change notifications for subscribers
//! - `registry`: The set of open sessions, autosave and the active session

mod events;
mod registry;
mod session;

pub use events::*;
pub use registry::*;
pub use session::*;
