//! Code block syntax highlighting
//!
//! Highlighting emits class-based markup (`hl-keyword`, `hl-string`, ...)
//! so that colors come from the stylesheet rather than being baked into
//! the fragment. The same fragment can then be restyled without a re-highlight.

use crate::error::HighlightError;
use std::sync::OnceLock;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

/// Prefix applied to every scope class emitted by the highlighter
pub const CLASS_PREFIX: &str = "hl-";

/// Something that can turn source code into highlighted HTML
pub trait Highlighter {
    /// Canonical language token for a declared fence tag, if supported
    fn resolve_language(&self, tag: &str) -> Option<String>;

    /// Highlight `code` as `language`, returning inline HTML spans
    fn highlight(&self, code: &str, language: &str) -> Result<String, HighlightError>;
}

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

/// Map common fence aliases onto tokens syntect knows.
fn map_alias(tag: &str) -> &str {
    match tag {
        "shell" | "console" | "zsh" => "sh",
        "c++" => "cpp",
        "c#" | "csharp" => "cs",
        "py3" | "python3" => "py",
        "yml" => "yaml",
        "rust" => "rs",
        "golang" => "go",
        "jsonc" | "json5" => "json",
        _ => tag,
    }
}

/// Highlighter backed by syntect's bundled syntax definitions
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntectHighlighter;

impl SyntectHighlighter {
    pub fn new() -> Self {
        Self
    }

    fn find_syntax(&self, tag: &str) -> Option<&'static SyntaxReference> {
        let tag = tag.trim().to_ascii_lowercase();
        if tag.is_empty() {
            return None;
        }
        let set = syntax_set();
        set.find_syntax_by_token(map_alias(&tag))
            .or_else(|| set.find_syntax_by_token(&tag))
    }
}

impl Highlighter for SyntectHighlighter {
    fn resolve_language(&self, tag: &str) -> Option<String> {
        self.find_syntax(tag).map(|_| tag.trim().to_ascii_lowercase())
    }

    fn highlight(&self, code: &str, language: &str) -> Result<String, HighlightError> {
        let syntax = self
            .find_syntax(language)
            .ok_or_else(|| HighlightError::UnknownLanguage(language.to_string()))?;

        let mut generator = ClassedHTMLGenerator::new_with_class_style(
            syntax,
            syntax_set(),
            ClassStyle::SpacedPrefixed {
                prefix: CLASS_PREFIX,
            },
        );

        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .map_err(|e| HighlightError::Highlighter(e.to_string()))?;
        }

        Ok(generator.finalize())
    }
}
