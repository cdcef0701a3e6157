//! Generate static files

use anyhow::Result;
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::new_debouncer;
use std::path::Path;
use std::sync::mpsc::channel;
use std::time::{Duration, Instant};

use crate::generator::Generator;
use crate::{Blog, CONFIG_FILE};

const DEBOUNCE: Duration = Duration::from_millis(500);

/// Load the posts and write the static site
pub fn run(blog: &Blog) -> Result<()> {
    let start = Instant::now();

    let posts = blog.load_posts()?;
    tracing::info!("Loaded {} posts", posts.len());

    Generator::new(blog)?.generate(&posts)?;

    tracing::info!("Generated in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

/// Watch the source directory and config file, regenerating on change.
///
/// Blocks until the watcher channel closes.
pub fn watch(blog: &Blog) -> Result<()> {
    let (tx, rx) = channel();
    let mut debouncer = new_debouncer(DEBOUNCE, tx)?;

    if blog.source_dir.exists() {
        debouncer
            .watcher()
            .watch(&blog.source_dir, RecursiveMode::Recursive)?;
    }

    let config_path = blog.base_dir.join(CONFIG_FILE);
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    for result in rx {
        match result {
            Ok(events) => {
                if !events.iter().any(|e| is_relevant(&e.path, blog)) {
                    continue;
                }
                tracing::info!("File changed, regenerating...");
                // Reload the config as well as the posts
                if let Err(e) = Blog::new(&blog.base_dir).and_then(|fresh| run(&fresh)) {
                    tracing::error!("Generation failed: {}", e);
                }
            }
            Err(e) => tracing::error!("Watch error: {:?}", e),
        }
    }

    Ok(())
}

/// Changes under the output directory or editor/VCS files never trigger a build
fn is_relevant(path: &Path, blog: &Blog) -> bool {
    let path_str = path.to_string_lossy();
    !path.starts_with(&blog.public_dir)
        && !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.ends_with('~')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    #[test]
    fn test_is_relevant() {
        let blog = Blog::with_config("/site".into(), SiteConfig::default());
        assert!(is_relevant(Path::new("/site/source/_posts/a.md"), &blog));
        assert!(is_relevant(Path::new("/site/_config.yml"), &blog));
        assert!(!is_relevant(Path::new("/site/public/index.html"), &blog));
        assert!(!is_relevant(Path::new("/site/source/.git/HEAD"), &blog));
        assert!(!is_relevant(Path::new("/site/source/_posts/a.md~"), &blog));
    }
}
