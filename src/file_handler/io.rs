//! File I/O operations with encoding detection and atomic writes
//!
//! Provides safe file reading and writing with:
//! - UTF-8 and UTF-16 encoding detection
//! - Atomic writes to prevent data loss
//! - File size limits

use crate::config::MAX_FILE_SIZE;
use crate::error::{FileError, FileResult};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Detected encoding of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileEncoding {
    /// UTF-8 without BOM
    #[default]
    Utf8,
    /// UTF-8 with BOM
    Utf8Bom,
    /// UTF-16 Little Endian with BOM
    Utf16Le,
    /// UTF-16 Big Endian with BOM
    Utf16Be,
}

/// Result of reading a file
#[derive(Debug, Clone)]
pub struct FileReadResult {
    /// The file content as a string
    pub content: String,
    /// Detected encoding
    pub encoding: FileEncoding,
    /// Original file size in bytes
    pub size_bytes: u64,
    /// Last modification time on disk
    pub modified: Option<SystemTime>,
}

/// Detect file encoding from raw bytes
fn detect_encoding(bytes: &[u8]) -> FileEncoding {
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return FileEncoding::Utf8Bom;
    }
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return FileEncoding::Utf16Le;
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return FileEncoding::Utf16Be;
    }
    FileEncoding::Utf8
}

/// Decode bytes to string based on detected encoding
fn decode_content(bytes: &[u8], encoding: FileEncoding) -> Option<String> {
    match encoding {
        FileEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_string),
        FileEncoding::Utf8Bom => std::str::from_utf8(&bytes[3..]).ok().map(str::to_string),
        FileEncoding::Utf16Le => decode_utf16(&bytes[2..], u16::from_le_bytes),
        FileEncoding::Utf16Be => decode_utf16(&bytes[2..], u16::from_be_bytes),
    }
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units = bytes.chunks_exact(2).map(|chunk| to_unit([chunk[0], chunk[1]]));
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

/// Read a text file with encoding detection and the default size limit
pub fn read_file_sync(path: impl AsRef<Path>) -> FileResult<FileReadResult> {
    read_file_with_limit(path, MAX_FILE_SIZE)
}

/// Read a text file with encoding detection
pub fn read_file_with_limit(path: impl AsRef<Path>, max_size: u64) -> FileResult<FileReadResult> {
    let path = path.as_ref();
    let path_buf = path.to_path_buf();

    let metadata = std::fs::metadata(path).map_err(|e| FileError::from_read(&path_buf, e))?;

    if !metadata.is_file() {
        return Err(FileError::NotAFile { path: path_buf });
    }

    let size_bytes = metadata.len();
    if size_bytes > max_size {
        return Err(FileError::FileTooLarge {
            path: path_buf,
            size: size_bytes,
            max_size,
        });
    }

    let bytes = std::fs::read(path).map_err(|e| FileError::from_read(&path_buf, e))?;

    let encoding = detect_encoding(&bytes);
    let content = decode_content(&bytes, encoding)
        .ok_or(FileError::EncodingError { path: path_buf })?;

    Ok(FileReadResult {
        content,
        encoding,
        size_bytes,
        modified: metadata.modified().ok(),
    })
}

/// Write content to a file synchronously using atomic write
///
/// The content goes to a temporary sibling first and is renamed over the
/// target, so the file is either fully written or unchanged.
pub fn write_file_atomic_sync(path: impl AsRef<Path>, content: &str) -> FileResult<()> {
    let path = path.as_ref();
    let path_buf = path.to_path_buf();

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string());

    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);

    let temp_path = parent.join(format!(".{}.{}.tmp", filename, timestamp));

    let write_result = (|| {
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(content.as_bytes())?;
        file.flush()?;
        file.sync_all()?;
        Ok::<(), std::io::Error>(())
    })();

    if let Err(e) = write_result {
        let _ = std::fs::remove_file(&temp_path);
        return Err(FileError::WriteError {
            path: path_buf,
            source: e,
        });
    }

    if let Err(e) = std::fs::rename(&temp_path, path) {
        let _ = std::fs::remove_file(&temp_path);
        return Err(FileError::WriteError {
            path: path_buf,
            source: e,
        });
    }

    Ok(())
}

/// Last modification time of a file, if it can be read
pub fn modified_time(path: impl AsRef<Path>) -> Option<SystemTime> {
    std::fs::metadata(path.as_ref()).ok()?.modified().ok()
}

/// Normalize a path for identity comparison between sessions
///
/// Existing files are canonicalized; paths that don't exist yet are made
/// absolute against the current directory.
pub fn normalize_path(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
