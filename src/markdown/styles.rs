//! Preview styles
//!
//! A closed table of named CSS bundles. Composing a stylesheet is a pure
//! lookup plus concatenation; nothing here is mutated after construction
//! except the font settings fed in from the editor.

/// Name of the fallback style
pub const DEFAULT_STYLE: &str = "Default";

/// A named presentation style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleDefinition {
    pub name: &'static str,
    pub css: &'static str,
}

const DEFAULT_CSS: &str = r#"
body {
    background-color: #121212;
    color: #e0e0e0;
}
h1, h2, h3, h4, h5, h6 {
    color: #3498db;
    border-bottom: 1px solid rgba(52, 152, 219, 0.2);
    padding-bottom: 0.3em;
}
a { color: #4ecdc4; text-decoration: none; }
a:hover { text-decoration: underline; }
code {
    background-color: rgba(255, 255, 255, 0.1);
    border-radius: 4px;
    padding: 0.2em 0.4em;
}
pre {
    background-color: #1e1e1e;
    border-radius: 6px;
    padding: 15px;
    overflow-x: auto;
}
blockquote {
    border-left: 4px solid #3498db;
    margin: 1.5em 0;
    padding-left: 15px;
    font-style: italic;
    color: #a0a0a0;
}
th, td { border: 1px solid #333333; }
"#;

const MINIMAL_CSS: &str = r#"
body {
    background-color: #f4f4f4;
    color: #333;
    font-weight: 300;
}
h1, h2, h3, h4, h5, h6 {
    color: #2c3e50;
    font-weight: 300;
    border-bottom: 1px solid rgba(0, 0, 0, 0.1);
}
a { color: #3498db; text-decoration: none; }
a:hover { text-decoration: underline; }
code {
    background-color: rgba(0, 0, 0, 0.05);
    border-radius: 3px;
    padding: 0.2em 0.4em;
    font-size: 0.9em;
}
pre {
    background-color: #f8f8f8;
    border: 1px solid #e9e9e9;
    border-radius: 4px;
    padding: 15px;
}
blockquote {
    border-left: 3px solid #3498db;
    margin: 1.5em 0;
    padding-left: 15px;
    color: #777;
    font-style: italic;
}
th, td { border: 1px solid #e9e9e9; }
"#;

const ACADEMIC_CSS: &str = r#"
body {
    background-color: #ffffff;
    color: #2c3e50;
    max-width: 700px;
}
h1, h2, h3, h4, h5, h6 {
    color: #2980b9;
    font-weight: 500;
    border-bottom: 1px solid rgba(41, 128, 185, 0.2);
    padding-bottom: 0.3em;
}
a { color: #2980b9; text-decoration: none; }
a:hover { text-decoration: underline; }
code {
    background-color: #f8f8f8;
    border: 1px solid #e9e9e9;
    border-radius: 3px;
    padding: 0.2em 0.4em;
    font-family: 'Courier New', monospace;
}
pre {
    background-color: #f8f8f8;
    border: 1px solid #e9e9e9;
    border-radius: 4px;
    padding: 15px;
}
blockquote {
    border-left: 3px solid #2980b9;
    margin: 1.5em 0;
    padding-left: 15px;
    color: #666;
    font-style: italic;
}
th, td { border: 1px solid #d0d7de; }
"#;

const MODERN_CSS: &str = r#"
body {
    background-color: #1a1a2e;
    color: #e0e0e0;
    font-weight: 300;
}
h1, h2, h3, h4, h5, h6 {
    color: #4ecdc4;
    font-weight: 400;
    border-bottom: 1px solid rgba(78, 205, 196, 0.2);
    padding-bottom: 0.3em;
}
a { color: #4ecdc4; text-decoration: none; }
a:hover { text-decoration: underline; }
code {
    background-color: rgba(255, 255, 255, 0.1);
    border-radius: 4px;
    padding: 0.2em 0.4em;
    font-family: 'Fira Code', monospace;
}
pre {
    background-color: #16213e;
    border-radius: 6px;
    padding: 15px;
    border: 1px solid rgba(78, 205, 196, 0.1);
}
blockquote {
    border-left: 4px solid #4ecdc4;
    margin: 1.5em 0;
    padding-left: 15px;
    color: #a0a0a0;
    font-style: italic;
}
th, td { border: 1px solid rgba(78, 205, 196, 0.2); }
"#;

const CLASSIC_CSS: &str = r#"
body {
    background-color: #f5f5f5;
    color: #333;
    font-family: Georgia, serif;
    max-width: 750px;
}
h1, h2, h3, h4, h5, h6 {
    color: #2c3e50;
    font-family: 'Palatino Linotype', serif;
    border-bottom: 1px solid rgba(0, 0, 0, 0.1);
    padding-bottom: 0.3em;
}
a { color: #2980b9; text-decoration: none; }
a:hover { text-decoration: underline; }
code {
    background-color: #f8f8f8;
    border: 1px solid #e9e9e9;
    border-radius: 3px;
    padding: 0.2em 0.4em;
    font-family: Consolas, monospace;
}
pre {
    background-color: #f8f8f8;
    border: 1px solid #e9e9e9;
    border-radius: 4px;
    padding: 15px;
    font-family: Consolas, monospace;
}
blockquote {
    border-left: 3px solid #2980b9;
    margin: 1.5em 0;
    padding-left: 15px;
    color: #666;
    font-style: italic;
}
th, td { border: 1px solid #cccccc; }
"#;

/// Token colors shared by every style
const SYNTAX_CSS: &str = r#"
/* Syntax highlighting */
.highlight .hl-keyword     { color: #ff79c6; }
.highlight .hl-storage     { color: #8be9fd; }
.highlight .hl-string      { color: #f1fa8c; }
.highlight .hl-numeric     { color: #bd93f9; }
.highlight .hl-comment     { color: #6272a4; }
.highlight .hl-operator    { color: #ff79c6; }
.highlight .hl-punctuation { color: #f8f8f2; }
.highlight .hl-support     { color: #50fa7b; }
"#;

static STYLES: [StyleDefinition; 5] = [
    StyleDefinition { name: "Default", css: DEFAULT_CSS },
    StyleDefinition { name: "Minimal", css: MINIMAL_CSS },
    StyleDefinition { name: "Academic", css: ACADEMIC_CSS },
    StyleDefinition { name: "Modern", css: MODERN_CSS },
    StyleDefinition { name: "Classic", css: CLASSIC_CSS },
];

/// Editor font metadata the base layout inherits
#[derive(Debug, Clone, PartialEq)]
pub struct FontSettings {
    pub family: String,
    pub size_pt: f32,
}

impl Default for FontSettings {
    fn default() -> Self {
        Self {
            family: crate::config::DEFAULT_FONT_FAMILY.to_string(),
            size_pt: crate::config::DEFAULT_FONT_SIZE,
        }
    }
}

impl FontSettings {
    pub fn from_config(editor: &crate::config::EditorConfig) -> Self {
        Self {
            family: editor.font_family.clone(),
            size_pt: editor.font_size,
        }
    }
}

/// A composed stylesheet and the style that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedStyle {
    /// Name of the style actually used
    pub name: &'static str,
    pub css: String,
    /// True when the requested name was unknown and Default was used
    pub substituted: bool,
}

/// Registry of preview styles
#[derive(Debug, Clone, Default)]
pub struct StyleCatalog {
    font: FontSettings,
}

impl StyleCatalog {
    pub fn new(font: FontSettings) -> Self {
        Self { font }
    }

    pub fn set_font(&mut self, font: FontSettings) {
        self.font = font;
    }

    /// All style names in menu order
    pub fn names() -> impl Iterator<Item = &'static str> {
        STYLES.iter().map(|s| s.name)
    }

    /// Look up a style by name (case-insensitive)
    pub fn get(name: &str) -> Option<&'static StyleDefinition> {
        STYLES.iter().find(|s| s.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Look up a style, falling back to Default; the flag reports substitution
    pub fn resolve(name: &str) -> (&'static StyleDefinition, bool) {
        match Self::get(name) {
            Some(style) => (style, false),
            None => (&STYLES[0], true),
        }
    }

    /// Base layout rules; selectors here never outrank style rules
    pub fn base_css(&self) -> String {
        format!(
            r#"
body {{
    font-family: '{}', -apple-system, BlinkMacSystemFont, 'Segoe UI', 'Roboto', 'Ubuntu', 'Helvetica Neue', sans-serif;
    font-size: {}pt;
    line-height: 1.6;
    max-width: 800px;
    margin: 0 auto;
    padding: 20px;
}}
img {{ max-width: 100%; }}
table {{ border-collapse: collapse; }}
th, td {{ padding: 6px 13px; }}
.toc ul {{ list-style-type: none; padding-left: 1.5em; }}
"#,
            sanitize_font_family(&self.font.family),
            self.font.size_pt
        )
    }

    /// Compose base + style + syntax CSS, in that order
    pub fn compose(&self, name: &str) -> ComposedStyle {
        let (style, substituted) = Self::resolve(name);
        if substituted {
            log::warn!("Unknown preview style '{}', using {}", name, DEFAULT_STYLE);
        }

        let mut css = self.base_css();
        css.push_str(style.css);
        css.push_str(SYNTAX_CSS);

        ComposedStyle {
            name: style.name,
            css,
            substituted,
        }
    }
}

/// Keep a user-supplied font name from breaking out of its CSS string
fn sanitize_font_family(family: &str) -> String {
    let cleaned: String = family
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | ';' | '{' | '}' | '<' | '>' | '\\'))
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        crate::config::DEFAULT_FONT_FAMILY.to_string()
    } else {
        cleaned.to_string()
    }
}
