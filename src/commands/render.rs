//! Render a single markdown file for preview

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::content::{FrontMatter, MarkdownRenderer};

/// Render the body of a markdown file (front-matter stripped) to HTML
pub fn render_file(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path)?;
    let (_, body) = FrontMatter::parse(&raw)?;
    let (_, content) = MarkdownRenderer::split_excerpt(body);
    Ok(MarkdownRenderer::new().render_html(&content))
}

/// Render a markdown file to JSON nodes
pub fn render_file_nodes(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path)?;
    let (_, body) = FrontMatter::parse(&raw)?;
    let (_, content) = MarkdownRenderer::split_excerpt(body);
    let nodes = MarkdownRenderer::new().render(&content);
    Ok(serde_json::to_string_pretty(&nodes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("post.md");
        fs::write(&path, "---\ntitle: T\n---\n\n# Hello\n\n- a\n- b\n").unwrap();

        let html = render_file(&path).unwrap();
        assert_eq!(html, "<h1>Hello</h1>\n<ul>\n<li>a</li>\n<li>b</li>\n</ul>\n");

        let json = render_file_nodes(&path).unwrap();
        assert!(json.contains(r#""type": "heading""#));
        assert!(json.contains(r#""kind": "unordered""#));
    }

    #[test]
    fn test_render_strips_more_marker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("post.md");
        fs::write(&path, "Intro\n\n<!-- more -->\n\nRest\n").unwrap();

        let html = render_file(&path).unwrap();
        assert_eq!(html, "<p>Intro</p>\n<p>Rest</p>\n");

        let json = render_file_nodes(&path).unwrap();
        assert!(!json.contains("more"));
        let nodes: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(nodes.as_array().unwrap().len(), 2);
    }
}
