//! Post model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::markdown::{self, RenderNode};

/// A blog post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier, used in URLs
    pub id: String,

    /// Post title
    pub title: String,

    /// Short summary shown on the post card
    pub excerpt: String,

    /// Raw markdown body
    pub content: String,

    /// Single category
    pub category: String,

    /// Tags in display order
    #[serde(default)]
    pub tags: Vec<String>,

    /// Display-formatted date
    pub date: String,

    /// Display-formatted reading time
    #[serde(rename = "readTime", alias = "read_time")]
    pub read_time: String,

    /// Where the post was loaded from (relative to the source dir)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,

    /// Parsed date used for ordering
    #[serde(skip)]
    pub sort_date: Option<NaiveDate>,
}

impl Post {
    /// Create a new post with minimal required fields
    pub fn new(id: &str, title: &str, category: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            excerpt: String::new(),
            content: String::new(),
            category: category.to_string(),
            tags: Vec::new(),
            date: String::new(),
            read_time: String::new(),
            source: String::new(),
            sort_date: None,
        }
    }

    /// Builder-style tag setter
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style excerpt setter
    pub fn with_excerpt(mut self, excerpt: &str) -> Self {
        self.excerpt = excerpt.to_string();
        self
    }

    /// Builder-style content setter
    pub fn with_content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }

    /// Render the body into block nodes
    pub fn render(&self) -> Vec<RenderNode> {
        markdown::render(&self.content)
    }

    /// Render the body to HTML
    pub fn content_html(&self) -> String {
        markdown::to_html(&self.render())
    }

    /// Site-relative path of the post reader page
    pub fn path(&self) -> String {
        format!("posts/{}/", self.id)
    }

    /// Get the previous (newer) post in a list
    pub fn prev<'a>(&self, posts: &'a [Post]) -> Option<&'a Post> {
        let pos = posts.iter().position(|p| p.id == self.id)?;
        if pos > 0 {
            Some(&posts[pos - 1])
        } else {
            None
        }
    }

    /// Get the next (older) post in a list
    pub fn next<'a>(&self, posts: &'a [Post]) -> Option<&'a Post> {
        let pos = posts.iter().position(|p| p.id == self.id)?;
        posts.get(pos + 1)
    }
}

/// Find a post by id
pub fn find_post<'a>(posts: &'a [Post], id: &str) -> Option<&'a Post> {
    posts.iter().find(|p| p.id == id)
}
