//! Content loader - loads the post collection from the source directory
//!
//! Two sources are merged: an optional bulk data file
//! (`_data/posts.{yml,yaml,json}`) holding complete post records, and
//! markdown files under `_posts/` with front-matter.

use anyhow::Result;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::{ContentError, FrontMatter, MarkdownRenderer, Post};
use crate::helpers::{format_date, parse_date, read_time, truncate};
use crate::Blog;

const DATA_FILES: &[&str] = &["posts.yml", "posts.yaml", "posts.json"];

/// Loads content from the source directory
pub struct ContentLoader<'a> {
    blog: &'a Blog,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(blog: &'a Blog) -> Self {
        Self { blog }
    }

    /// Load every published post, newest first
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        let mut posts = self.load_data_file()?;
        posts.extend(self.load_markdown_posts()?);

        validate_ids(&posts)?;
        sort_posts(&mut posts);

        tracing::debug!("Loaded {} posts", posts.len());
        Ok(posts)
    }

    /// Load complete post records from `_data/posts.*`
    fn load_data_file(&self) -> Result<Vec<Post>> {
        let data_dir = self.blog.source_dir.join("_data");

        let Some(path) = DATA_FILES
            .iter()
            .map(|name| data_dir.join(name))
            .find(|p| p.is_file())
        else {
            return Ok(Vec::new());
        };

        let raw = fs::read_to_string(&path)?;
        let source = relative_source(&self.blog.source_dir, &path);

        let records: Vec<Post> = if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&raw).map_err(|e| ContentError::InvalidDataFile {
                path: source.clone(),
                message: e.to_string(),
            })?
        } else {
            serde_yaml::from_str(&raw).map_err(|e| ContentError::InvalidDataFile {
                path: source.clone(),
                message: e.to_string(),
            })?
        };

        tracing::debug!("Loaded {} posts from {}", records.len(), source);

        Ok(records
            .into_iter()
            .map(|mut post| {
                post.source = source.clone();
                post.sort_date = parse_date(&post.date);
                post
            })
            .collect())
    }

    /// Load every markdown post under `_posts/`
    fn load_markdown_posts(&self) -> Result<Vec<Post>> {
        let posts_dir = self.blog.source_dir.join("_posts");
        if !posts_dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths: Vec<_> = WalkDir::new(&posts_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && is_markdown_file(p))
            .collect();
        paths.sort();

        let mut posts = Vec::new();
        for path in paths {
            match self.load_post(&path) {
                Ok(Some(post)) => posts.push(post),
                Ok(None) => tracing::debug!("Skipping draft {:?}", path),
                Err(e) => tracing::warn!("Failed to load post {:?}: {}", path, e),
            }
        }

        Ok(posts)
    }

    /// Load a single post; `None` for unpublished posts
    fn load_post(&self, path: &Path) -> Result<Option<Post>> {
        let raw = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&raw)?;

        if !fm.published && !self.blog.config.render_drafts {
            return Ok(None);
        }

        let config = &self.blog.config;
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled")
            .to_string();

        let (excerpt_md, content) = MarkdownRenderer::split_excerpt(body);
        let excerpt = fm
            .excerpt
            .clone()
            .or_else(|| excerpt_md.as_deref().and_then(MarkdownRenderer::first_paragraph))
            .or_else(|| MarkdownRenderer::first_paragraph(&content))
            .map(|e| truncate(&e, config.excerpt_length, None))
            .unwrap_or_default();

        let sort_date = fm.parse_date();
        let date = match (&sort_date, &fm.date) {
            (Some(d), _) => format_date(d, &config.date_format),
            (None, Some(raw_date)) => raw_date.clone(),
            (None, None) => String::new(),
        };

        let read_time = fm
            .read_time
            .clone()
            .unwrap_or_else(|| read_time(&content, config.words_per_minute));

        let mut post = Post::new(
            fm.id.as_deref().unwrap_or(&stem),
            fm.title.as_deref().unwrap_or(&stem),
            fm.category().unwrap_or(&config.default_category),
        );
        post.excerpt = excerpt;
        post.content = content;
        post.tags = fm.tags;
        post.date = date;
        post.read_time = read_time;
        post.source = relative_source(&self.blog.source_dir, path);
        post.sort_date = sort_date;

        Ok(Some(post))
    }
}

/// Ids must be unique and usable as a single URL path segment
fn validate_ids(posts: &[Post]) -> Result<(), ContentError> {
    let mut seen = HashSet::new();

    for post in posts {
        let id = post.id.as_str();
        if !is_valid_id(id) {
            return Err(ContentError::InvalidId {
                id: post.id.clone(),
                source_file: post.source.clone(),
            });
        }
        if !seen.insert(id) {
            return Err(ContentError::DuplicateId {
                id: post.id.clone(),
                source_file: post.source.clone(),
            });
        }
    }

    Ok(())
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.trim() == id
        && id != "."
        && id != ".."
        && !id.contains(&['/', '\\'][..])
}

/// Dated posts newest first; undated posts keep their load order after them
pub fn sort_posts(posts: &mut [Post]) {
    posts.sort_by(|a, b| match (&a.sort_date, &b.sort_date) {
        (Some(x), Some(y)) => y.cmp(x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

fn relative_source(source_dir: &Path, path: &Path) -> String {
    path.strip_prefix(source_dir)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}
