//! List site content

use anyhow::Result;

use crate::filter::{self, FilterCriteria};
use crate::Blog;

/// List posts passing the criteria, or facet counts
pub fn run(blog: &Blog, content_type: &str, criteria: &FilterCriteria) -> Result<()> {
    let posts = blog.load_posts()?;
    let visible = filter::filter_owned(&posts, criteria);

    match content_type {
        "post" | "posts" => {
            println!("Posts ({} of {}):", visible.len(), posts.len());
            for post in &visible {
                println!(
                    "  {} - {} [{}] {} ({})",
                    post.date,
                    post.title,
                    post.category,
                    post.tags
                        .iter()
                        .map(|t| format!("#{}", t))
                        .collect::<Vec<_>>()
                        .join(" "),
                    post.id
                );
            }
        }
        "category" | "categories" => {
            let categories = filter::category_counts(&visible);
            println!("Categories ({}):", categories.len());
            for facet in categories {
                println!("  {} ({})", facet.name, facet.count);
            }
        }
        "tag" | "tags" => {
            let tags = filter::tag_counts(&visible);
            println!("Tags ({}):", tags.len());
            for facet in tags {
                println!("  {} ({})", facet.name, facet.count);
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, category, tag",
                content_type
            );
        }
    }

    Ok(())
}
