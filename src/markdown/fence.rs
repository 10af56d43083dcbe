//! Fenced code block extraction
//!
//! Fenced blocks are found with a line-anchored pattern and rewritten into
//! standalone `<pre>` HTML blocks before the markdown parser sees the text.
//! Any backtick opener counts, whatever follows the language word, so a
//! closing line is never mistaken for the next opener. A fence without a
//! closing line is never matched and stays literal text.

use super::highlight::{Highlighter, SyntectHighlighter};
use crate::utils::text::escape_html;
use regex::Regex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::OnceLock;

/// Language sentinel for fences with no tag or an unrecognized one
pub const PLAIN_LANGUAGE: &str = "plain";

static FENCE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn fence_pattern() -> &'static Regex {
    FENCE_PATTERN.get_or_init(|| {
        Regex::new(r"(?ms)^ {0,3}```[ \t]*([A-Za-z0-9_+#.-]*)[^\n`]*\n(.*?)^ {0,3}```[ \t]*\r?$")
            .expect("fence pattern is a valid regex")
    })
}

/// A fenced code block located in the source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeFence {
    /// Resolved language token, or [`PLAIN_LANGUAGE`]
    pub language: String,
    /// Verbatim text between the opening and closing fence lines
    pub raw_code: String,
    /// Byte offset of the opening fence
    pub start_offset: usize,
    /// Byte offset just past the closing fence
    pub end_offset: usize,
}

impl CodeFence {
    pub(crate) fn is_plain(&self) -> bool {
        self.language == PLAIN_LANGUAGE
    }
}

/// Replaces fenced code blocks with pre-rendered HTML fragments
pub struct CodeBlockExtractor {
    highlighter: Box<dyn Highlighter>,
}

impl CodeBlockExtractor {
    pub fn new(highlighter: Box<dyn Highlighter>) -> Self {
        Self { highlighter }
    }

    /// Locate every well-formed fence, left to right, non-overlapping
    pub fn extract(&self, source: &str) -> Vec<CodeFence> {
        fence_pattern()
            .captures_iter(source)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let tag = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                let language = self
                    .highlighter
                    .resolve_language(tag)
                    .unwrap_or_else(|| PLAIN_LANGUAGE.to_string());

                Some(CodeFence {
                    language,
                    raw_code: caps.get(2).map(|m| m.as_str()).unwrap_or("").to_string(),
                    start_offset: whole.start(),
                    end_offset: whole.end(),
                })
            })
            .collect()
    }

    /// Produce the HTML fragment for one fence; never fails
    ///
    /// A highlighter that errors or panics degrades to an escaped block.
    pub fn render_fence(&self, fence: &CodeFence) -> String {
        if !fence.is_plain() {
            let highlighted = panic::catch_unwind(AssertUnwindSafe(|| {
                self.highlighter.highlight(&fence.raw_code, &fence.language)
            }));

            match highlighted {
                Ok(Ok(highlighted)) => {
                    return format!(
                        "<pre class=\"highlight\"><code class=\"language-{}\">{}</code></pre>",
                        escape_html(&fence.language),
                        highlighted
                    );
                }
                Ok(Err(e)) => {
                    log::warn!("Falling back to plain code block: {}", e);
                }
                Err(_) => {
                    log::warn!(
                        "Highlighter panicked on {} block, falling back to plain",
                        fence.language
                    );
                }
            }
        }

        format!("<pre><code>{}</code></pre>", escape_html(&fence.raw_code))
    }

    /// Rewrite `source`, splicing each fence's fragment over its span
    pub fn rewrite(&self, source: &str) -> String {
        let fences = self.extract(source);
        if fences.is_empty() {
            return source.to_string();
        }

        let mut output = String::with_capacity(source.len() + fences.len() * 64);
        let mut cursor = 0;
        for fence in &fences {
            output.push_str(&source[cursor..fence.start_offset]);
            output.push_str(&self.render_fence(fence));
            cursor = fence.end_offset;
        }
        output.push_str(&source[cursor..]);
        output
    }
}

impl Default for CodeBlockExtractor {
    fn default() -> Self {
        Self::new(Box::new(SyntectHighlighter::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HighlightError;

    /// Knows one language and always fails to highlight it
    struct BrokenHighlighter;

    impl Highlighter for BrokenHighlighter {
        fn resolve_language(&self, tag: &str) -> Option<String> {
            (tag == "python").then(|| tag.to_string())
        }

        fn highlight(&self, _code: &str, _language: &str) -> Result<String, HighlightError> {
            Err(HighlightError::Highlighter("boom".to_string()))
        }
    }

    /// Claims every language, then panics while highlighting
    struct PanickingHighlighter;

    impl Highlighter for PanickingHighlighter {
        fn resolve_language(&self, tag: &str) -> Option<String> {
            Some(tag.to_string())
        }

        fn highlight(&self, _code: &str, _language: &str) -> Result<String, HighlightError> {
            panic!("highlighter blew up");
        }
    }

    #[test]
    fn test_extracts_language_and_offsets() {
        let extractor = CodeBlockExtractor::default();
        let source = "intro\n```python\nprint(1)\n```\noutro\n";
        let fences = extractor.extract(source);

        assert_eq!(fences.len(), 1);
        let fence = &fences[0];
        assert_eq!(fence.language, "python");
        assert_eq!(fence.raw_code, "print(1)\n");
        assert_eq!(&source[fence.start_offset..fence.end_offset], "```python\nprint(1)\n```");
    }

    #[test]
    fn test_untagged_and_unknown_are_plain() {
        let extractor = CodeBlockExtractor::default();
        let fences = extractor.extract("```\na\n```\n\n```klingon\nb\n```\n");
        assert_eq!(fences.len(), 2);
        assert!(fences.iter().all(CodeFence::is_plain));
    }

    #[test]
    fn test_body_keeps_blank_lines() {
        let extractor = CodeBlockExtractor::default();
        let fences = extractor.extract("```\nfirst\n\n\nlast\n```");
        assert_eq!(fences[0].raw_code, "first\n\n\nlast\n");
    }

    #[test]
    fn test_empty_body() {
        let extractor = CodeBlockExtractor::default();
        let fences = extractor.extract("```\n```\n");
        assert_eq!(fences.len(), 1);
        assert_eq!(fences[0].raw_code, "");
    }

    #[test]
    fn test_unterminated_fence_left_literal() {
        let extractor = CodeBlockExtractor::default();
        let source = "# Heading\n\n```python\nprint(1)\n\nmore text\n";
        assert!(extractor.extract(source).is_empty());
        assert_eq!(extractor.rewrite(source), source);
    }

    #[test]
    fn test_inline_backticks_do_not_close() {
        let extractor = CodeBlockExtractor::default();
        let fences = extractor.extract("```\nlet s = \"```\";\n```\n");
        assert_eq!(fences.len(), 1);
        assert_eq!(fences[0].raw_code, "let s = \"```\";\n");
    }

    #[test]
    fn test_first_match_wins_left_to_right() {
        let extractor = CodeBlockExtractor::default();
        let fences = extractor.extract("```\none\n```\n```\ntwo\n```\n");
        assert_eq!(fences.len(), 2);
        assert_eq!(fences[0].raw_code, "one\n");
        assert_eq!(fences[1].raw_code, "two\n");
        assert!(fences[0].end_offset <= fences[1].start_offset);
    }

    #[test]
    fn test_plain_fence_is_escaped() {
        let extractor = CodeBlockExtractor::default();
        let output = extractor.rewrite("```\n<b>&</b>\n```\n");
        assert_eq!(output, "<pre><code>&lt;b&gt;&amp;&lt;/b&gt;\n</code></pre>\n");
    }

    #[test]
    fn test_highlighted_fence_is_wrapped() {
        let extractor = CodeBlockExtractor::default();
        let output = extractor.rewrite("```python\nprint(1)\n```\n");
        assert!(output.starts_with("<pre class=\"highlight\"><code class=\"language-python\">"));
        assert!(output.contains("print"));
        assert!(output.trim_end().ends_with("</code></pre>"));
    }

    #[test]
    fn test_highlighter_failure_degrades() {
        let extractor = CodeBlockExtractor::new(Box::new(BrokenHighlighter));
        let output = extractor.rewrite("```python\nx < 1\n```\n");
        assert_eq!(output, "<pre><code>x &lt; 1\n</code></pre>\n");
    }

    #[test]
    fn test_non_fenced_content_unchanged() {
        let extractor = CodeBlockExtractor::default();
        let source = "para one\n\n```\ncode\n```\n\npara two\n";
        let output = extractor.rewrite(source);
        assert!(output.starts_with("para one\n\n<pre><code>"));
        assert!(output.ends_with("</code></pre>\n\npara two\n"));
    }

    #[test]
    fn test_spaced_info_string_keeps_following_prose() {
        let extractor = CodeBlockExtractor::default();
        let source = "``` python\na = 1\n```\n\nSome text\n\n```\nb\n```\n";
        let fences = extractor.extract(source);

        assert_eq!(fences.len(), 2);
        assert_eq!(fences[0].language, "python");
        assert_eq!(fences[0].raw_code, "a = 1\n");
        assert_eq!(fences[1].raw_code, "b\n");

        let output = extractor.rewrite(source);
        assert!(output.contains("</pre>\n\nSome text\n\n<pre>"));
    }

    #[test]
    fn test_info_string_attributes_ignored() {
        let extractor = CodeBlockExtractor::default();
        let fences = extractor.extract("```python title=x\nprint(1)\n```\n\n```{r}\nplot()\n```\n");
        assert_eq!(fences.len(), 2);
        assert_eq!(fences[0].language, "python");
        assert_eq!(fences[0].raw_code, "print(1)\n");
        assert!(fences[1].is_plain());
    }

    #[test]
    fn test_indented_fence_is_paired() {
        let extractor = CodeBlockExtractor::default();
        let fences = extractor.extract("  ```\none\n  ```\n\ntext\n\n```\ntwo\n```\n");
        assert_eq!(fences.len(), 2);
        assert_eq!(fences[0].raw_code, "one\n");
        assert_eq!(fences[1].raw_code, "two\n");
    }

    #[test]
    fn test_highlighter_panic_degrades() {
        let extractor = CodeBlockExtractor::new(Box::new(PanickingHighlighter));
        let output = extractor.rewrite("```py\nx < 1\n```\n");
        assert_eq!(output, "<pre><code>x &lt; 1\n</code></pre>\n");
    }
}
