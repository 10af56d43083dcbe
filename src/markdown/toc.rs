//! Heading anchors and table of contents
//!
//! Works on the parser's event stream: headings get stable `id`s and a
//! paragraph consisting only of `[TOC]` is replaced by a nested link list.

use crate::utils::text::escape_html;
use pulldown_cmark::{CowStr, Event, HeadingLevel, Tag};
use std::collections::HashMap;

/// Marker paragraph replaced by the table of contents
pub const TOC_MARKER: &str = "[TOC]";

/// A heading found in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingEntry {
    pub level: usize,
    pub text: String,
    pub anchor: String,
}

fn level_number(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Generate URL-safe anchor from heading text
pub fn generate_anchor(text: &str) -> String {
    let mut anchor = String::with_capacity(text.len());
    for c in text.trim().to_lowercase().chars() {
        if c.is_alphanumeric() || c == '_' {
            anchor.push(c);
        } else if (c.is_whitespace() || c == '-') && !anchor.ends_with('-') {
            anchor.push('-');
        }
    }
    let anchor = anchor.trim_matches('-');
    if anchor.is_empty() {
        "section".to_string()
    } else {
        anchor.to_string()
    }
}

/// Collect headings with unique anchors, in document order
pub fn collect_headings(events: &[Event<'_>]) -> Vec<HeadingEntry> {
    let mut headings = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut current: Option<(usize, Option<String>, String)> = None;

    for event in events {
        match event {
            Event::Start(Tag::Heading(level, id, _)) => {
                current = Some((level_number(*level), id.map(str::to_string), String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, _, buffer)) = current.as_mut() {
                    buffer.push_str(text);
                }
            }
            Event::End(Tag::Heading(..)) => {
                if let Some((level, explicit_id, text)) = current.take() {
                    let base = explicit_id.unwrap_or_else(|| generate_anchor(&text));
                    let count = seen.entry(base.clone()).or_insert(0);
                    let anchor = if *count == 0 {
                        base
                    } else {
                        format!("{}-{}", base, count)
                    };
                    *count += 1;
                    headings.push(HeadingEntry {
                        level,
                        text: text.trim().to_string(),
                        anchor,
                    });
                }
            }
            _ => {}
        }
    }

    headings
}

/// Render the nested table of contents list
///
/// Each nested `<ul>` opens inside the previous `<li>`, one level at a time,
/// so a document starting at a deep heading still nests validly.
pub fn render_toc(headings: &[HeadingEntry]) -> String {
    let mut toc = String::from("<nav class=\"toc\">\n");
    let base_level = headings.iter().map(|h| h.level).min().unwrap_or(1);
    let mut depth = 0;

    for heading in headings {
        let target = (heading.level - base_level + 1).min(depth + 1);
        if target > depth {
            toc.push_str(if depth == 0 { "<ul>\n" } else { "\n<ul>\n" });
            depth += 1;
        } else {
            toc.push_str("</li>\n");
            while depth > target {
                toc.push_str("</ul>\n</li>\n");
                depth -= 1;
            }
        }
        toc.push_str(&format!(
            "<li><a href=\"#{}\">{}</a>",
            heading.anchor,
            escape_html(&heading.text)
        ));
    }

    if depth > 0 {
        toc.push_str("</li>\n");
        while depth > 1 {
            toc.push_str("</ul>\n</li>\n");
            depth -= 1;
        }
        toc.push_str("</ul>\n");
    }

    toc.push_str("</nav>\n");
    toc
}

/// Whether the events between a paragraph's start and end spell `[TOC]`
fn is_toc_marker(inner: &[Event<'_>]) -> bool {
    let mut text = String::new();
    for event in inner {
        match event {
            Event::Text(t) => text.push_str(t),
            _ => return false,
        }
    }
    text.trim() == TOC_MARKER
}

/// Give headings anchor ids and expand `[TOC]` paragraphs
pub fn apply<'a>(events: Vec<Event<'a>>) -> Vec<Event<'a>> {
    let headings = collect_headings(&events);
    let mut anchors = headings.iter();
    let mut output = Vec::with_capacity(events.len());
    let mut index = 0;

    while index < events.len() {
        match &events[index] {
            Event::Start(Tag::Paragraph) => {
                let end = events[index..]
                    .iter()
                    .position(|e| matches!(e, Event::End(Tag::Paragraph)))
                    .map(|offset| index + offset);

                if let Some(end) = end {
                    if is_toc_marker(&events[index + 1..end]) {
                        output.push(Event::Html(CowStr::from(render_toc(&headings))));
                        index = end + 1;
                        continue;
                    }
                }
                output.push(events[index].clone());
            }
            Event::Start(Tag::Heading(level, _, _)) => {
                let anchor = anchors.next().map(|h| h.anchor.as_str()).unwrap_or("section");
                output.push(Event::Html(CowStr::from(format!(
                    "<h{} id=\"{}\">",
                    level_number(*level),
                    escape_html(anchor)
                ))));
            }
            Event::End(Tag::Heading(level, _, _)) => {
                output.push(Event::Html(CowStr::from(format!(
                    "</h{}>\n",
                    level_number(*level)
                ))));
            }
            event => output.push(event.clone()),
        }
        index += 1;
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulldown_cmark::{html, Parser};

    fn render(markdown: &str) -> String {
        let events: Vec<Event> = Parser::new(markdown).collect();
        let mut out = String::new();
        html::push_html(&mut out, apply(events).into_iter());
        out
    }

    #[test]
    fn test_anchor_generation() {
        assert_eq!(generate_anchor("Hello World"), "hello-world");
        assert_eq!(generate_anchor("Test 123!"), "test-123");
        assert_eq!(generate_anchor("  --  "), "section");
    }

    #[test]
    fn test_headings_get_ids() {
        let html = render("# Title\n\n## Sub `code`\n");
        assert!(html.contains("<h1 id=\"title\">Title</h1>"));
        assert!(html.contains("<h2 id=\"sub-code\">Sub <code>code</code></h2>"));
    }

    #[test]
    fn test_duplicate_anchors_are_unique() {
        let html = render("# Notes\n\n# Notes\n");
        assert!(html.contains("id=\"notes\""));
        assert!(html.contains("id=\"notes-1\""));
    }

    #[test]
    fn test_toc_marker_replaced() {
        let html = render("[TOC]\n\n# One\n\n## Two\n\n# Three\n");
        assert!(html.starts_with("<nav class=\"toc\">"));
        assert!(html.contains("<a href=\"#one\">One</a>"));
        assert!(html.contains("<a href=\"#two\">Two</a>"));
        assert!(!html.contains("[TOC]"));
    }

    #[test]
    fn test_toc_nesting_balanced() {
        let events: Vec<Event> = Parser::new("## A\n\n### B\n\n## C\n").collect();
        let toc = render_toc(&collect_headings(&events));
        assert_eq!(toc.matches("<ul>").count(), toc.matches("</ul>").count());
        assert_eq!(toc.matches("<ul>").count(), 2);
    }

    #[test]
    fn test_toc_inside_text_is_kept() {
        let html = render("See [TOC] here\n");
        assert!(html.contains("See [TOC] here"));
    }

    #[test]
    fn test_toc_deep_first_heading_nests_validly() {
        let events: Vec<Event> = Parser::new("### A\n\n# B\n\n## C\n").collect();
        let toc = render_toc(&collect_headings(&events));

        assert!(!toc.contains("<ul>\n<ul>"));
        assert!(!toc.contains("</li>\n\n<ul>"));
        assert_eq!(toc.matches("<ul>").count(), toc.matches("</ul>").count());
        assert_eq!(toc.matches("<li>").count(), toc.matches("</li>").count());
        assert!(toc.contains("<a href=\"#b\">B</a>\n<ul>\n<li><a href=\"#c\">C</a>"));
    }
}
