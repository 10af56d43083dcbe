//! Configuration management for Noteism
//!
//! Handles loading, saving, and managing configuration.
//! Configuration is persisted as JSON in the platform configuration directory.

use crate::error::{ConfigError, ConfigResult, FileError, FileResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier following reverse-DNS convention
pub const APP_ID: &str = "com.cloudwerxlab.Noteism";

/// Name of the configuration file inside the configuration directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Maximum file size to open (in bytes) - 10MB
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Autosave interval in seconds
pub const DEFAULT_AUTOSAVE_INTERVAL: u64 = 60;

/// Quiet period before a burst of edits is rendered
pub const DEFAULT_PREVIEW_DEBOUNCE_MS: u64 = 150;

/// Default editor font, also used by the preview's base CSS
pub const DEFAULT_FONT_FAMILY: &str = "Inter";

/// Default editor font size in points
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Placeholder name for documents without a file
pub const UNTITLED_NAME: &str = "Untitled";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Editor configuration
    pub editor: EditorConfig,

    /// File handling configuration
    pub files: FileConfig,

    /// Preview configuration
    pub preview: PreviewConfig,
}

impl Config {
    /// Load configuration from the default location, falling back to defaults
    pub fn load() -> ConfigResult<Self> {
        let path = Self::config_dir()?.join(CONFIG_FILE_NAME);
        Self::load_from(&path)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            log::debug!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadError(e.to_string()))?;

        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to the default location
    pub fn save(&self) -> ConfigResult<()> {
        let path = Self::config_dir()?.join(CONFIG_FILE_NAME);
        self.save_to(&path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::SaveError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::SaveError(e.to_string()))
    }

    /// Get the configuration directory path
    pub fn config_dir() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }
}

/// Editor settings the preview depends on
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Font family for the editor
    pub font_family: String,

    /// Font size in points
    pub font_size: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

/// File handling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Enable autosave
    pub autosave_enabled: bool,

    /// Autosave interval in seconds
    pub autosave_interval: u64,

    /// Root directory for new documents (None = platform documents dir)
    pub documents_dir: Option<PathBuf>,

    /// Maximum file size to open (in bytes)
    pub max_file_size: u64,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            autosave_enabled: false,
            autosave_interval: DEFAULT_AUTOSAVE_INTERVAL,
            documents_dir: None,
            max_file_size: MAX_FILE_SIZE,
        }
    }
}

impl FileConfig {
    /// Resolve the documents root directory
    pub fn documents_root(&self) -> PathBuf {
        self.documents_dir.clone().unwrap_or_else(|| {
            dirs::document_dir()
                .or_else(dirs::home_dir)
                .unwrap_or_else(|| PathBuf::from("."))
                .join("Noteism")
        })
    }

    /// Resolve and create the documents root directory
    pub fn ensure_documents_root(&self) -> FileResult<PathBuf> {
        let root = self.documents_root();
        if !root.exists() {
            std::fs::create_dir_all(&root).map_err(|e| FileError::DirectoryError {
                path: root.clone(),
                source: e,
            })?;
            log::info!("Created documents directory {}", root.display());
        }
        Ok(root)
    }
}

/// Preview configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Name of the active preview style
    pub style: String,

    /// Debounce interval in milliseconds (0 renders immediately)
    pub debounce_ms: u64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            style: crate::markdown::DEFAULT_STYLE.to_string(),
            debounce_ms: DEFAULT_PREVIEW_DEBOUNCE_MS,
        }
    }
}
