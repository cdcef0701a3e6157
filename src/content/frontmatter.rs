//! Front-matter parsing
//!
//! Posts may start with a YAML block delimited by `---` lines or a JSON
//! object delimited by `;;;`. Anything that does not look like metadata is
//! left in the body.

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::helpers::parse_date;

/// Accept either `tags: rust` or `tags: [rust, web]`
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
        Nothing,
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(s)) => vec![s],
        Some(OneOrMany::Many(v)) => v,
        Some(OneOrMany::Nothing) | None => Vec::new(),
    })
}

fn default_published() -> bool {
    true
}

/// Front-matter data from a post
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub id: Option<String>,
    pub title: Option<String>,
    pub excerpt: Option<String>,
    /// Only the first entry is used; posts have a single category
    #[serde(deserialize_with = "string_or_vec", alias = "categories")]
    pub category: Vec<String>,
    #[serde(deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,
    pub date: Option<String>,
    #[serde(alias = "readTime")]
    pub read_time: Option<String>,
    #[serde(default = "default_published")]
    pub published: bool,
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            id: None,
            title: None,
            excerpt: None,
            category: Vec::new(),
            tags: Vec::new(),
            date: None,
            read_time: None,
            published: true,
        }
    }
}

impl FrontMatter {
    /// Split front-matter from the body.
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        let trimmed = content.trim_start();

        if let Some(rest) = trimmed.strip_prefix(";;;") {
            return Self::parse_json(rest);
        }

        if let Some(rest) = trimmed.strip_prefix("---") {
            if let Some(parsed) = Self::parse_yaml(rest) {
                return Ok(parsed);
            }
        }

        Ok((FrontMatter::default(), trimmed))
    }

    /// `None` means the block was not metadata and belongs to the body
    fn parse_yaml(rest: &str) -> Option<(Self, &str)> {
        let rest = rest.trim_start_matches(['\n', '\r']);
        let end = rest.find("\n---")?;
        let yaml = &rest[..end];
        let body = rest[end + 4..].trim_start_matches(['\n', '\r']);

        if yaml.trim().is_empty() {
            return Some((FrontMatter::default(), body));
        }

        if !yaml.lines().any(looks_like_yaml_key) {
            return None;
        }

        match serde_yaml::from_str::<FrontMatter>(yaml) {
            Ok(fm) => Some((fm, body)),
            Err(e) => {
                tracing::warn!("Ignoring malformed YAML front-matter: {}", e);
                None
            }
        }
    }

    fn parse_json(rest: &str) -> Result<(Self, &str)> {
        let end = rest
            .find(";;;")
            .ok_or_else(|| anyhow!("Unterminated JSON front-matter"))?;
        let json = rest[..end].trim();
        let body = rest[end + 3..].trim_start_matches(['\n', '\r']);

        // JSON front-matter may omit the surrounding braces
        let fm: FrontMatter = if json.starts_with('{') {
            serde_json::from_str(json)
        } else {
            serde_json::from_str(&format!("{{{}}}", json))
        }
        .map_err(|e| anyhow!("Failed to parse JSON front-matter: {}", e))?;

        Ok((fm, body))
    }

    /// The post's category, if one was given
    pub fn category(&self) -> Option<&str> {
        self.category.first().map(String::as_str)
    }

    /// Parse the date field
    pub fn parse_date(&self) -> Option<NaiveDate> {
        self.date.as_deref().and_then(parse_date)
    }
}

/// `key: value` or `key:` with an identifier-like key that is not a URL scheme
fn looks_like_yaml_key(line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return false;
    }

    let Some((key, value)) = line.split_once(':') else {
        return false;
    };

    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        && !matches!(key, "http" | "https" | "ftp" | "mailto")
        && (value.is_empty() || value.starts_with(' '))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_yaml_frontmatter() {
        let content = r#"---
id: scalable-apis
title: Building Scalable APIs
date: 2024-01-15 10:30:00
category: API Development
readTime: 8 min read
tags:
  - Node.js
  - REST
---

This is the content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.id.as_deref(), Some("scalable-apis"));
        assert_eq!(fm.title.as_deref(), Some("Building Scalable APIs"));
        assert_eq!(fm.category(), Some("API Development"));
        assert_eq!(fm.tags, vec!["Node.js", "REST"]);
        assert_eq!(fm.read_time.as_deref(), Some("8 min read"));
        assert!(fm.published);
        assert!(remaining.starts_with("This is the content."));
    }

    #[test]
    fn test_parse_json_frontmatter() {
        let content = r#";;;
"title": "Test Post", "tags": ["a", "b"], "published": false
;;;
This is content.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title.as_deref(), Some("Test Post"));
        assert_eq!(fm.tags, vec!["a", "b"]);
        assert!(!fm.published);
        assert!(remaining.starts_with("This is content."));
    }

    #[test]
    fn test_unterminated_json_is_an_error() {
        assert!(FrontMatter::parse(";;;\n\"title\": \"x\"\n").is_err());
    }

    #[test]
    fn test_parse_date() {
        let fm = FrontMatter {
            date: Some("2024-01-15 10:30:00".to_string()),
            ..Default::default()
        };

        let d = fm.parse_date().unwrap();
        assert_eq!(d.format("%Y-%m-%d").to_string(), "2024-01-15");
    }

    #[test]
    fn test_single_string_tags_and_categories_list() {
        let content = r#"---
title: Single Tag Post
tags: Notes
categories:
  - Blog
  - Ignored
---

Content here.
"#;

        let (fm, _) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.tags, vec!["Notes"]);
        assert_eq!(fm.category(), Some("Blog"));
    }

    #[test]
    fn test_markdown_separator_not_yaml() {
        let content = r#"---

Some random text with markdown lists:
- Item 1
- Item 2

---
More content here.
"#;

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, None);
        assert!(remaining.contains("Some random text"));
    }

    #[test]
    fn test_content_with_url_not_yaml() {
        let content = "---\n\nCheck out https://example.com/path\n\n---\nMore.\n";

        let (fm, remaining) = FrontMatter::parse(content).unwrap();
        assert_eq!(fm.title, None);
        assert!(remaining.contains("https://example.com"));
    }

    #[test]
    fn test_no_frontmatter() {
        let (fm, remaining) = FrontMatter::parse("# Just markdown").unwrap();
        assert!(fm.id.is_none());
        assert_eq!(remaining, "# Just markdown");
    }
}
