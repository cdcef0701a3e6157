//! Initialize a new site

use anyhow::{bail, Result};
use std::fs;
use std::path::Path;

use crate::CONFIG_FILE;

const DEFAULT_CONFIG: &str = r#"# Site
title: Dev Blog
subtitle: ''
description: 'Notes on backend engineering'
author: John Doe
language: en

# Landing page
hero:
  heading: Backend Development Insights & Tutorials
  tagline: Deep dives into system design, API development, databases, and scalable architecture.
  topics:
    - System Design
    - API Development
    - Database Engineering

# URL
url: http://example.com
root: /

# Directory
source_dir: source
public_dir: public

# Writing
new_post_name: :title.md
render_drafts: false
default_category: Uncategorized
date_format: '%b %-d, %Y'
words_per_minute: 200
excerpt_length: 160

# About page
profile:
  name: John Doe
  headline: Backend engineer
  bio: I design and build services that scale.
  location: Seoul, South Korea
  experience: 5+ years
  links:
    - label: GitHub
      url: https://github.com
    - label: Email
      url: mailto:contact@example.com
  timeline:
    - title: Backend Engineer
      company: Tech Corp
      period: 2024 - now
      description: Backend architecture for a large e-commerce platform
      achievements:
        - Moved the monolith to services
  skills:
    - category: Languages
      skills:
        - name: Rust
          level: 80
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        bail!("{:?} already contains a site", target_dir);
    }

    fs::create_dir_all(target_dir.join("source/_posts"))?;
    fs::create_dir_all(target_dir.join("source/_data"))?;
    fs::write(&config_path, DEFAULT_CONFIG)?;

    let now = chrono::Local::now();
    let sample_post = format!(
        r#"---
id: hello-world
title: Hello World
date: {}
category: Meta
tags:
  - Welcome
---

Welcome to your new blog! This is your very first post.

<!-- more -->

## Quick Start

### Create a new post

```bash
$ blogfolio new "My New Post"
```

### Run server

```bash
$ blogfolio server
```

### Generate static files

```bash
$ blogfolio generate
```

Posts support **bold**, *italic*, `inline code` and [links](https://example.com).
"#,
        now.format("%Y-%m-%d %H:%M:%S")
    );

    fs::write(target_dir.join("source/_posts/hello-world.md"), sample_post)?;
    tracing::debug!("Wrote sample post and {}", CONFIG_FILE);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Blog;

    #[test]
    fn test_init_creates_loadable_site() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();

        let blog = Blog::new(dir.path()).unwrap();
        assert_eq!(blog.config.profile.name, "John Doe");
        assert_eq!(blog.config.hero.topics.len(), 3);

        let posts = blog.load_posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, "hello-world");
        assert_eq!(posts[0].excerpt, "Welcome to your new blog! This is your very first post.");
    }

    #[test]
    fn test_init_refuses_existing_site() {
        let dir = tempfile::tempdir().unwrap();
        init_site(dir.path()).unwrap();
        assert!(init_site(dir.path()).is_err());
    }
}
