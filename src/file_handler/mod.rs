//! File handler module for Noteism
//!
//! Handles all file system operations including:
//! - Reading and writing files with encoding detection
//! - Atomic save operations for data safety
//! - File watching for external changes

pub mod io;
pub mod watcher;

pub use io::*;
pub use watcher::*;
