//! Markdown to standalone HTML rendering
//!
//! `render` is a pure function of `(source, style)`: fenced blocks are
//! rewritten first, the remainder goes through pulldown-cmark, and the body
//! is wrapped together with the composed stylesheet.

use super::fence::CodeBlockExtractor;
use super::highlight::Highlighter;
use super::styles::{FontSettings, StyleCatalog};
use super::toc;
use crate::error::{RenderError, RenderResult};
use pulldown_cmark::{html, Event, Options, Parser};
use std::panic::{self, AssertUnwindSafe};

/// Output of one render pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// HTML fragment for the document body
    pub body_html: String,
    /// Style used for `composed_html`
    pub style_name: String,
    /// True when the requested style was unknown and Default was used
    pub style_substituted: bool,
    /// Complete HTML document ready for display
    pub composed_html: String,
}

/// Main Markdown renderer combining code block extraction, parsing and styling
pub struct MarkdownRenderer {
    extractor: CodeBlockExtractor,
    catalog: StyleCatalog,
    options: Options,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::with_parts(CodeBlockExtractor::default(), StyleCatalog::default())
    }

    /// Use a specific highlighter for fenced code blocks
    pub fn with_highlighter(highlighter: Box<dyn Highlighter>) -> Self {
        Self::with_parts(CodeBlockExtractor::new(highlighter), StyleCatalog::default())
    }

    fn with_parts(extractor: CodeBlockExtractor, catalog: StyleCatalog) -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        Self {
            extractor,
            catalog,
            options,
        }
    }

    pub fn catalog(&self) -> &StyleCatalog {
        &self.catalog
    }

    /// Update the editor font the base CSS inherits
    pub fn set_font(&mut self, font: FontSettings) {
        self.catalog.set_font(font);
    }

    /// Render the body fragment only
    ///
    /// A panic anywhere in extraction or parsing becomes a `RenderError`.
    pub fn render_body(&self, source: &str) -> RenderResult<String> {
        let options = self.options;

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let preprocessed = self.extractor.rewrite(source);
            let events: Vec<Event> = Parser::new_ext(&preprocessed, options).collect();
            let mut body = String::with_capacity(preprocessed.len() * 3 / 2);
            html::push_html(&mut body, toc::apply(events).into_iter());
            body
        }));

        result.map_err(|payload| {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            RenderError::Panicked(message)
        })
    }

    /// Render a full document with the named style
    pub fn render(&self, source: &str, style_name: &str) -> RenderResult<RenderedDocument> {
        let body_html = self.render_body(source)?;
        let style = self.catalog.compose(style_name);
        let composed_html = compose_document(&body_html, &style.css);

        log::debug!(
            "Rendered {} bytes of markdown with style {}",
            source.len(),
            style.name
        );

        Ok(RenderedDocument {
            body_html,
            style_name: style.name.to_string(),
            style_substituted: style.substituted,
            composed_html,
        })
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Wrap a body fragment and stylesheet into a standalone HTML document
pub fn compose_document(body_html: &str, css: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="generator" content="Noteism">
    <style>{}</style>
</head>
<body>
{}
</body>
</html>
"#,
        css, body_html
    )
}
