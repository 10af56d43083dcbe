//! Markdown module for Noteism
//!
//! Handles turning markdown source into a styled preview:
//! - Fenced code block extraction and syntax highlighting
//! - Markdown parsing with tables, footnotes and a table of contents
//! - Preview styles
//! - Debounced preview rendering for the active session
//! - HTML export

pub mod export;
pub mod fence;
pub mod highlight;
pub mod preview;
pub mod renderer;
pub mod styles;
pub mod toc;

pub use export::{export_html_file, suggest_output_path};
pub use fence::{CodeBlockExtractor, CodeFence, PLAIN_LANGUAGE};
pub use highlight::{Highlighter, SyntectHighlighter};
pub use preview::{PreviewCoordinator, PreviewStatus};
pub use renderer::{compose_document, MarkdownRenderer, RenderedDocument};
pub use styles::{ComposedStyle, FontSettings, StyleCatalog, StyleDefinition, DEFAULT_STYLE};
pub use toc::{HeadingEntry, TOC_MARKER};
