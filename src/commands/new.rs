//! Create a new post

use anyhow::{bail, Result};
use std::fs;
use std::path::PathBuf;

use crate::Blog;

/// Create a new post under `_posts/` and return its path
pub fn create_post(blog: &Blog, title: &str, path: Option<&str>) -> Result<PathBuf> {
    let now = chrono::Local::now();
    let slug = slug::slugify(title);

    let target_dir = blog.source_dir.join("_posts");
    fs::create_dir_all(&target_dir)?;

    let filename = match path {
        Some(p) => format!("{}.md", p.trim_end_matches(".md")),
        None => blog
            .config
            .new_post_name
            .replace(":title", &slug)
            .replace(":year", &now.format("%Y").to_string())
            .replace(":month", &now.format("%m").to_string())
            .replace(":day", &now.format("%d").to_string()),
    };

    let file_path = target_dir.join(&filename);
    if file_path.exists() {
        bail!("File already exists: {:?}", file_path);
    }

    let id = file_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(&slug)
        .to_string();

    let content = format!(
        "---\nid: {id}\ntitle: {title}\ndate: {date}\ncategory: {category}\ntags:\n---\n\n",
        id = id,
        title = yaml_string(title),
        date = now.format("%Y-%m-%d %H:%M:%S"),
        category = yaml_string(&blog.config.default_category),
    );

    fs::write(&file_path, content)?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

/// Quote a scalar so titles with `:` or `#` stay valid YAML
fn yaml_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
