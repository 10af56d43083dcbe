//! Error types for Noteism
//!
//! This module defines all custom error types used throughout the crate.
//! Error types are organized by category for clear error handling and user-friendly messages.

use crate::state::SessionId;
use std::path::PathBuf;
use thiserror::Error;

/// Main application error type encompassing all error categories
#[derive(Error, Debug)]
pub enum AppError {
    /// File I/O related errors
    #[error(transparent)]
    FileIO(#[from] FileError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Session lifecycle errors
    #[error(transparent)]
    Session(#[from] SessionError),

    /// Rendering errors
    #[error(transparent)]
    Render(#[from] RenderError),

    /// File watcher errors
    #[error(transparent)]
    Watcher(#[from] WatcherError),
}

/// File I/O related errors
#[derive(Error, Debug)]
pub enum FileError {
    /// File not found at specified path
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when accessing file
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// File is too large to open
    #[error("File too large: {path} ({size} bytes, max {max_size} bytes)")]
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// File could not be decoded as text
    #[error("Unable to read file as text: {path}")]
    EncodingError { path: PathBuf },

    /// Error reading file
    #[error("Could not read file: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error writing file
    #[error("Could not save file: {path}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory operation error
    #[error("Directory error: {path}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Path is not a file
    #[error("Path is not a file: {path}")]
    NotAFile { path: PathBuf },
}

/// Configuration related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error loading configuration file
    #[error("Could not load configuration: {0}")]
    LoadError(String),

    /// Error saving configuration
    #[error("Could not save configuration: {0}")]
    SaveError(String),

    /// Error parsing configuration
    #[error("Invalid configuration format: {0}")]
    ParseError(String),

    /// Configuration directory error
    #[error("Could not access configuration directory")]
    DirectoryError,
}

/// Session lifecycle errors
#[derive(Error, Debug)]
pub enum SessionError {
    /// No session with this id is registered
    #[error("Session not found: {0}")]
    UnknownSession(SessionId),

    /// Save was requested for an untitled session without a target path
    #[error("Session {0} has no file path; a target path is required")]
    NoTargetPath(SessionId),

    /// Close was requested on a dirty session without a resolution
    #[error("Session {0} has unsaved changes; choose save, discard or cancel")]
    UnresolvedDirtyClose(SessionId),

    /// Another session already owns this path
    #[error("File is already open in another tab: {path}")]
    PathAlreadyOpen { path: PathBuf, owner: SessionId },

    /// Underlying file error
    #[error(transparent)]
    File(#[from] FileError),
}

/// Rendering errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Code extraction or the markdown parser panicked on this input
    #[error("Rendering failed: {0}")]
    Panicked(String),
}

/// Code highlighting errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HighlightError {
    /// No syntax definition for this language tag
    #[error("No highlighter for language: {0}")]
    UnknownLanguage(String),

    /// The highlighter failed while processing the code
    #[error("Highlighting failed: {0}")]
    Highlighter(String),
}

/// File watcher errors
#[derive(Error, Debug)]
pub enum WatcherError {
    /// Could not initialize file watcher
    #[error("Could not start file watcher: {0}")]
    InitError(String),

    /// Could not watch path
    #[error("Could not watch path: {path}")]
    WatchError {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

/// Result type alias for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for file operations
pub type FileResult<T> = Result<T, FileError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type alias for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Result type alias for rendering
pub type RenderResult<T> = Result<T, RenderError>;

impl FileError {
    /// Map an I/O error from a read to the most specific variant
    pub fn from_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => FileError::NotFound(path),
            std::io::ErrorKind::PermissionDenied => FileError::PermissionDenied { path },
            _ => FileError::ReadError { path, source },
        }
    }

    /// Create a user-friendly error message suitable for the status bar
    pub fn user_message(&self) -> String {
        match self {
            FileError::NotFound(_) => {
                "The file could not be found. It may have been moved or deleted.".to_string()
            }
            FileError::PermissionDenied { .. } => {
                "You don't have permission to access this file. Check file permissions.".to_string()
            }
            FileError::FileTooLarge { max_size, .. } => {
                format!(
                    "This file is too large to open. Maximum file size is {} bytes.",
                    max_size
                )
            }
            FileError::EncodingError { .. } => {
                "This file cannot be opened as text.".to_string()
            }
            FileError::WriteError { .. } => {
                "Could not save the file. Check disk space and permissions.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl SessionError {
    /// Create a user-friendly error message suitable for the status bar
    pub fn user_message(&self) -> String {
        match self {
            SessionError::File(err) => err.user_message(),
            SessionError::NoTargetPath(_) => "Choose where to save this document.".to_string(),
            SessionError::UnresolvedDirtyClose(_) => {
                "Save changes before closing?".to_string()
            }
            _ => self.to_string(),
        }
    }
}
