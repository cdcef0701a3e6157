//! Generator module - writes the static site using the built-in templates

use anyhow::Result;
use serde::Serialize;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::content::Post;
use crate::controller::{LinkStyle, PageController};
use crate::filter::FilterCriteria;
use crate::helpers::full_url_for;
use crate::templates::{TemplateRenderer, STYLESHEET};
use crate::Blog;

/// Static site generator
pub struct Generator {
    blog: Blog,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            renderer: TemplateRenderer::new()?,
        })
    }

    /// Generate the entire site
    pub fn generate(&self, posts: &[Post]) -> Result<()> {
        fs::create_dir_all(&self.blog.public_dir)?;

        self.copy_source_assets()?;
        self.write_file("assets/style.css", STYLESHEET)?;

        let links = LinkStyle::static_pages(&self.blog.config, posts);

        self.generate_index(posts, &links)?;
        let filter_pages = self.generate_filter_pages(posts, &links)?;
        self.generate_post_pages(posts, &links)?;
        self.generate_about_page()?;
        self.generate_not_found_page()?;
        self.generate_search_index(posts, &links)?;

        tracing::info!(
            "Generated {} post pages and {} filter pages",
            posts.len(),
            filter_pages
        );

        Ok(())
    }

    fn generate_index(&self, posts: &[Post], links: &LinkStyle) -> Result<()> {
        let listing = PageController::new().listing(posts, links);
        let html = self.renderer.render_listing(&self.blog.config, &listing)?;
        self.write_file("index.html", &html)
    }

    /// One page per category/tag combination, including "all" on either side
    fn generate_filter_pages(&self, posts: &[Post], links: &LinkStyle) -> Result<usize> {
        let LinkStyle::Static { slugs, .. } = links else {
            return Ok(0);
        };

        let categories: Vec<Option<&str>> = std::iter::once(None)
            .chain(slugs.categories().map(|(name, _)| Some(name)))
            .collect();
        let tags: Vec<Option<&str>> = std::iter::once(None)
            .chain(slugs.tags().map(|(name, _)| Some(name)))
            .collect();

        let mut count = 0;
        for category in &categories {
            for tag in &tags {
                let Some(path) = slugs.listing_path(*category, *tag) else {
                    continue;
                };

                let mut criteria = FilterCriteria::new();
                criteria.category = category.map(str::to_string);
                criteria.tag = tag.map(str::to_string);

                let listing = PageController::with_criteria(criteria).listing(posts, links);
                let html = self.renderer.render_listing(&self.blog.config, &listing)?;
                self.write_file(&format!("{}index.html", path), &html)?;
                count += 1;
            }
        }

        Ok(count)
    }

    fn generate_post_pages(&self, posts: &[Post], links: &LinkStyle) -> Result<()> {
        let mut controller = PageController::new();

        for post in posts {
            controller.select_post(&post.id);
            let Some(view) = controller.post_view(posts, links) else {
                continue;
            };
            let html = self.renderer.render_post(&self.blog.config, &view)?;
            self.write_file(&format!("{}index.html", post.path()), &html)?;
            tracing::debug!("Generated post: {}", post.path());
        }

        Ok(())
    }

    fn generate_about_page(&self) -> Result<()> {
        let html = self.renderer.render_about(&self.blog.config)?;
        self.write_file("about/index.html", &html)
    }

    fn generate_not_found_page(&self) -> Result<()> {
        let html = self.renderer.render_not_found(&self.blog.config, None)?;
        self.write_file("404.html", &html)
    }

    /// Write posts.json for client-side consumers
    fn generate_search_index(&self, posts: &[Post], links: &LinkStyle) -> Result<()> {
        let entries: Vec<SearchEntry> = posts
            .iter()
            .map(|p| SearchEntry {
                id: &p.id,
                title: &p.title,
                excerpt: &p.excerpt,
                category: &p.category,
                tags: &p.tags,
                date: &p.date,
                read_time: &p.read_time,
                url: links.post_href(p),
                permalink: full_url_for(&self.blog.config, &p.path()),
            })
            .collect();

        let json = serde_json::to_string_pretty(&entries)?;
        self.write_file("posts.json", &json)?;
        tracing::info!("Generated posts.json");

        Ok(())
    }

    /// Copy non-markdown files (images, etc.) from the source directory
    fn copy_source_assets(&self) -> Result<()> {
        let source_dir = &self.blog.source_dir;
        if !source_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(source_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || is_private(source_dir, path) {
                continue;
            }

            let relative = path.strip_prefix(source_dir)?;
            let dest = self.blog.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
        }

        Ok(())
    }

    /// Write a file relative to the public directory
    fn write_file(&self, relative: &str, content: &str) -> Result<()> {
        let dest = self.blog.public_dir.join(relative);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&dest, content)?;
        Ok(())
    }
}

/// `_posts`, `_data` and other underscore entries, plus markdown, are not published
pub(crate) fn is_private(source_dir: &Path, path: &Path) -> bool {
    let relative = path.strip_prefix(source_dir).unwrap_or(path);
    let underscored = relative
        .components()
        .any(|c| c.as_os_str().to_string_lossy().starts_with('_'));
    let markdown = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("md") | Some("markdown")
    );
    underscored || markdown
}

#[derive(Serialize)]
struct SearchEntry<'a> {
    id: &'a str,
    title: &'a str,
    excerpt: &'a str,
    category: &'a str,
    tags: &'a [String],
    date: &'a str,
    #[serde(rename = "readTime")]
    read_time: &'a str,
    url: String,
    permalink: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_private() {
        let src = Path::new("/site/source");
        assert!(is_private(src, Path::new("/site/source/_posts/a.md")));
        assert!(is_private(src, Path::new("/site/source/_data/posts.yml")));
        assert!(is_private(src, Path::new("/site/source/notes.md")));
        assert!(!is_private(src, Path::new("/site/source/images/logo.png")));
    }
}
