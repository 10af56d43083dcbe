//! Utilities module for Noteism
//!
//! Shared helper functions and utilities including:
//! - Debouncing and interval timing
//! - Path utilities
//! - Text utilities

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Trailing-edge debouncer: fires once a burst of triggers has gone quiet
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    last_trigger: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            last_trigger: None,
        }
    }

    /// Record a trigger, restarting the quiet period
    pub fn trigger(&mut self, now: Instant) {
        self.last_trigger = Some(now);
    }

    /// Whether a trigger is waiting to fire
    pub fn is_pending(&self) -> bool {
        self.last_trigger.is_some()
    }

    /// Fire if the quiet period has elapsed; clears the pending trigger
    pub fn should_fire(&mut self, now: Instant) -> bool {
        match self.last_trigger {
            Some(last) if now.saturating_duration_since(last) >= self.delay => {
                self.last_trigger = None;
                true
            }
            _ => false,
        }
    }

    /// Drop any pending trigger
    pub fn reset(&mut self) {
        self.last_trigger = None;
    }
}

/// Recurring timer polled by the host event loop
#[derive(Debug, Clone)]
pub struct IntervalTimer {
    interval: Duration,
    next_due: Instant,
}

impl IntervalTimer {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_due: now + interval,
        }
    }

    /// Returns true once per elapsed interval
    pub fn tick(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due = now + self.interval;
        true
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Path utilities
pub mod path {
    use super::*;

    /// Check if path has a markdown extension
    pub fn is_markdown(path: &Path) -> bool {
        matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("md" | "markdown" | "mdown" | "mkd")
        )
    }

    /// Append `.md` unless the path already ends with it (case-insensitive)
    pub fn ensure_md_extension(path: &Path) -> PathBuf {
        let has_md = path
            .extension()
            .and_then(|s| s.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("md"))
            .unwrap_or(false);

        if has_md {
            return path.to_path_buf();
        }

        let mut name = path.as_os_str().to_os_string();
        name.push(".md");
        PathBuf::from(name)
    }

    /// Basename of a path for display
    pub fn display_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string())
    }
}

/// Text utilities
pub mod text {
    /// Count words in text
    pub fn word_count(text: &str) -> usize {
        text.split_whitespace().count()
    }

    /// Escape text for inclusion in HTML
    pub fn escape_html(text: &str) -> String {
        let mut escaped = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&#39;"),
                _ => escaped.push(c),
            }
        }
        escaped
    }
}
