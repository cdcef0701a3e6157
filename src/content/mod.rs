//! Content module - posts, front-matter and markdown rendering

mod frontmatter;
pub mod loader;
pub mod markdown;
mod post;

use thiserror::Error;

pub use frontmatter::FrontMatter;
pub use markdown::{ListKind, MarkdownRenderer, RenderNode};
pub use post::{find_post, Post};

/// Errors raised while assembling the post collection
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("duplicate post id `{id}` in {source_file}")]
    DuplicateId { id: String, source_file: String },

    #[error("invalid post id `{id}` in {source_file}: ids must be a non-empty path segment")]
    InvalidId { id: String, source_file: String },

    #[error("invalid data file {path}: {message}")]
    InvalidDataFile { path: String, message: String },
}
