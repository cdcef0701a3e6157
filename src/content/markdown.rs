//! Line-oriented markdown rendering for post bodies
//!
//! Supports a deliberately small subset: `#`/`##`/`###` headings, `-`/`*`
//! and numbered list items, fenced code blocks, paragraphs, and the inline
//! rules for bold, italic, inline code and links. Anything else falls through
//! to a paragraph, so rendering never fails.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::helpers::escape_html;

lazy_static! {
    static ref UNORDERED_ITEM: Regex = Regex::new(r"^[-*]\s").unwrap();
    static ref ORDERED_ITEM: Regex = Regex::new(r"^\d+\.\s(.+)").unwrap();
    static ref ORDERED_MARKER: Regex = Regex::new(r"^\d+\.\s").unwrap();
    static ref BOLD: Regex = Regex::new(r"\*\*(.+?)\*\*").unwrap();
    static ref ITALIC: Regex = Regex::new(r"\*(.+?)\*").unwrap();
    static ref INLINE_CODE: Regex = Regex::new(r"`(.+?)`").unwrap();
    static ref LINK: Regex = Regex::new(r"\[(.+?)\]\((.+?)\)").unwrap();
}

const FENCE: &str = "```";
const MORE_MARKER: &str = "<!-- more -->";

/// Kind of list a run of items belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Unordered,
    Ordered,
}

/// A block produced by [`render`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderNode {
    /// Heading text is plain text, not inline markup
    Heading { level: u8, text: String },
    /// Items are inline-rendered markup
    List { kind: ListKind, items: Vec<String> },
    /// Raw lines between the fences
    CodeBlock { language: String, lines: Vec<String> },
    /// Inline-rendered markup
    Paragraph { html: String },
}

impl RenderNode {
    /// Code block body joined the way it is displayed
    pub fn code(&self) -> Option<String> {
        match self {
            RenderNode::CodeBlock { lines, .. } => Some(lines.join("\n")),
            _ => None,
        }
    }
}

/// Scan state for a single render call
#[derive(Default)]
struct BlockScanner {
    nodes: Vec<RenderNode>,
    list: Vec<String>,
    list_kind: Option<ListKind>,
    in_code: bool,
    code_lang: String,
    code_lines: Vec<String>,
}

impl BlockScanner {
    fn flush_list(&mut self) {
        if self.list.is_empty() {
            self.list_kind = None;
            return;
        }
        let items = self.list.drain(..).map(|item| parse_inline(&item)).collect();
        let kind = self.list_kind.take().unwrap_or(ListKind::Unordered);
        self.nodes.push(RenderNode::List { kind, items });
    }

    fn flush_code(&mut self) {
        self.nodes.push(RenderNode::CodeBlock {
            language: std::mem::take(&mut self.code_lang),
            lines: std::mem::take(&mut self.code_lines),
        });
    }

    /// Bullets join whatever list is open and keep its kind
    fn push_bullet(&mut self, text: &str) {
        self.list_kind.get_or_insert(ListKind::Unordered);
        self.list.push(text.to_string());
    }

    /// Numbered items end an open bullet list
    fn push_numbered(&mut self, text: &str) {
        if self.list_kind == Some(ListKind::Unordered) {
            self.flush_list();
        }
        self.list_kind = Some(ListKind::Ordered);
        self.list.push(text.to_string());
    }

    fn line(&mut self, line: &str) {
        if let Some(rest) = line.strip_prefix(FENCE) {
            if self.in_code {
                self.flush_code();
                self.in_code = false;
            } else {
                self.flush_list();
                self.in_code = true;
                self.code_lang = rest.trim().to_string();
            }
            return;
        }

        if self.in_code {
            self.code_lines.push(line.to_string());
            return;
        }

        if let Some((level, text)) = heading(line) {
            self.flush_list();
            self.nodes.push(RenderNode::Heading {
                level,
                text: text.to_string(),
            });
        } else if UNORDERED_ITEM.is_match(line) {
            // Marker plus one whitespace char, which may be multi-byte
            let mut chars = line.chars();
            chars.next();
            chars.next();
            self.push_bullet(chars.as_str());
        } else if ORDERED_MARKER.is_match(line) {
            if let Some(caps) = ORDERED_ITEM.captures(line) {
                self.push_numbered(&caps[1]);
            } else {
                // "1. " with nothing after the marker
                self.flush_list();
            }
        } else if line.trim().is_empty() {
            self.flush_list();
        } else {
            self.flush_list();
            self.nodes.push(RenderNode::Paragraph {
                html: parse_inline(line),
            });
        }
    }

    fn finish(mut self) -> Vec<RenderNode> {
        self.flush_list();
        if self.in_code {
            self.flush_code();
        }
        self.nodes
    }
}

fn heading(line: &str) -> Option<(u8, &str)> {
    if let Some(text) = line.strip_prefix("### ") {
        Some((3, text))
    } else if let Some(text) = line.strip_prefix("## ") {
        Some((2, text))
    } else {
        line.strip_prefix("# ").map(|text| (1, text))
    }
}

/// Render markdown into a sequence of block nodes
pub fn render(content: &str) -> Vec<RenderNode> {
    let mut scanner = BlockScanner::default();
    for line in content.split('\n') {
        scanner.line(line.strip_suffix('\r').unwrap_or(line));
    }
    scanner.finish()
}

/// Apply the inline rules (bold, italic, code, links) to a single line.
///
/// Surrounding text is not escaped; post content is trusted.
pub fn parse_inline(text: &str) -> String {
    let text = BOLD.replace_all(text, "<strong>$1</strong>");
    let text = ITALIC.replace_all(&text, "<em>$1</em>");
    let text = INLINE_CODE.replace_all(&text, "<code>$1</code>");
    LINK.replace_all(&text, r#"<a href="$2">$1</a>"#).into_owned()
}

/// Serialize rendered nodes to HTML
pub fn to_html(nodes: &[RenderNode]) -> String {
    let mut html = String::new();

    for node in nodes {
        match node {
            RenderNode::Heading { level, text } => {
                html.push_str(&format!(
                    "<h{level}>{}</h{level}>\n",
                    escape_html(text),
                    level = level
                ));
            }
            RenderNode::List { kind, items } => {
                let tag = match kind {
                    ListKind::Unordered => "ul",
                    ListKind::Ordered => "ol",
                };
                html.push_str(&format!("<{}>\n", tag));
                for item in items {
                    html.push_str(&format!("<li>{}</li>\n", item));
                }
                html.push_str(&format!("</{}>\n", tag));
            }
            RenderNode::CodeBlock { language, lines } => {
                let body: Vec<String> = lines.iter().map(|l| escape_html(l)).collect();
                html.push_str(&format!(
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    escape_html(language),
                    body.join("\n")
                ));
                html.push('\n');
            }
            RenderNode::Paragraph { html: inner } => {
                html.push_str(&format!("<p>{}</p>\n", inner));
            }
        }
    }

    html
}

/// Markdown renderer used by the content loader and the display layer
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    /// Create a new markdown renderer
    pub fn new() -> Self {
        Self
    }

    /// Render markdown to nodes
    pub fn render(&self, markdown: &str) -> Vec<RenderNode> {
        render(markdown)
    }

    /// Render markdown straight to HTML
    pub fn render_html(&self, markdown: &str) -> String {
        to_html(&render(markdown))
    }

    /// Split the excerpt marker off the content.
    ///
    /// Returns the text before `<!-- more -->` (if present) and the content
    /// with the marker removed.
    pub fn split_excerpt(content: &str) -> (Option<String>, String) {
        if let Some(pos) = content.find(MORE_MARKER) {
            let excerpt = content[..pos].trim().to_string();
            let remaining = content[pos + MORE_MARKER.len()..].trim().to_string();
            let full = format!("{}\n\n{}", excerpt, remaining);
            (Some(excerpt), full)
        } else {
            (None, content.to_string())
        }
    }

    /// First paragraph line of the content, as plain text
    pub fn first_paragraph(content: &str) -> Option<String> {
        render(content).into_iter().find_map(|node| match node {
            RenderNode::Paragraph { html } => Some(crate::helpers::strip_html(&html)),
            _ => None,
        })
    }
}
