//! Built-in theme templates using the Tera template engine
//!
//! All templates are embedded in the binary; a site needs no theme directory.

use anyhow::Result;
use chrono::Datelike;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::{HeroConfig, SiteConfig};
use crate::controller::{ListingView, PostView};
use crate::helpers::{truncate, url_for};

/// Stylesheet served at `assets/style.css`
pub const STYLESHEET: &str = include_str!("theme/assets/style.css");

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all theme templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![".html"]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("post.html", include_str!("theme/post.html")),
            ("about.html", include_str!("theme/about.html")),
            ("404.html", include_str!("theme/404.html")),
            (
                "partials/header.html",
                include_str!("theme/partials/header.html"),
            ),
            (
                "partials/footer.html",
                include_str!("theme/partials/footer.html"),
            ),
            (
                "partials/listing.html",
                include_str!("theme/partials/listing.html"),
            ),
            (
                "partials/post_card.html",
                include_str!("theme/partials/post_card.html"),
            ),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }

    /// Landing page: hero plus the filtered post list
    pub fn render_listing(&self, config: &SiteConfig, listing: &ListingView) -> Result<String> {
        let mut context = base_context(config, NavData::new("home", false));
        context.insert("listing", listing);
        self.render("index.html", &context)
    }

    /// Single post reader
    pub fn render_post(&self, config: &SiteConfig, post: &PostView) -> Result<String> {
        let mut context = base_context(config, NavData::new("post", true));
        context.insert("post", post);
        self.render("post.html", &context)
    }

    /// About page from the configured profile
    pub fn render_about(&self, config: &SiteConfig) -> Result<String> {
        let mut context = base_context(config, NavData::new("about", true));
        context.insert("profile", &config.profile);
        self.render("about.html", &context)
    }

    /// Not-found page
    pub fn render_not_found(&self, config: &SiteConfig, message: Option<&str>) -> Result<String> {
        let mut context = base_context(config, NavData::new("", true));
        if let Some(message) = message {
            context.insert("message", message);
        }
        self.render("404.html", &context)
    }
}

fn base_context(config: &SiteConfig, nav: NavData) -> Context {
    let mut context = Context::new();
    context.insert("site", &SiteData::from(config));
    context.insert("nav", &nav);
    context.insert("year", &chrono::Local::now().year());
    context.insert("generator_version", env!("CARGO_PKG_VERSION"));
    context
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 150,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    Ok(tera::Value::String(truncate(&s, length, Some(&omission))))
}

/// Site-wide values available to every template as `site`
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub subtitle: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub root: String,
    pub hero: HeroConfig,
}

impl From<&SiteConfig> for SiteData {
    fn from(config: &SiteConfig) -> Self {
        Self {
            title: config.title.clone(),
            subtitle: config.subtitle.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            root: url_for(config, ""),
            hero: config.hero.clone(),
        }
    }
}

/// Header navigation state
#[derive(Debug, Clone, Serialize)]
pub struct NavData {
    pub current: String,
    pub show_back: bool,
}

impl NavData {
    fn new(current: &str, show_back: bool) -> Self {
        Self {
            current: current.to_string(),
            show_back,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Post;
    use crate::controller::{LinkStyle, PageController};
    use crate::filter::FilterCriteria;

    fn posts() -> Vec<Post> {
        vec![
            Post::new("1", "Tom & Jerry", "API")
                .with_tags(["x"])
                .with_content("# Heading\n\n**bold** text"),
            Post::new("2", "Other", "DB").with_tags(["y"]),
        ]
    }

    #[test]
    fn test_render_listing() {
        let config = SiteConfig::default();
        let renderer = TemplateRenderer::new().unwrap();
        let controller = PageController::with_criteria(FilterCriteria::new().with_category("API"));
        let listing = controller.listing(&posts(), &LinkStyle::query(&config));

        let html = renderer.render_listing(&config, &listing).unwrap();
        assert!(html.contains("Tom &amp; Jerry"));
        assert!(!html.contains("Other</h2>"));
        assert!(html.contains("1 article found"));
        assert!(html.contains("Clear all filters"));
        assert!(html.contains(r#"name="q""#));
    }

    #[test]
    fn test_render_empty_listing_offers_clear() {
        let config = SiteConfig::default();
        let renderer = TemplateRenderer::new().unwrap();
        let controller = PageController::with_criteria(FilterCriteria::new().with_query("nope"));
        let listing = controller.listing(&posts(), &LinkStyle::query(&config));

        let html = renderer.render_listing(&config, &listing).unwrap();
        assert!(html.contains("No articles found matching your criteria."));
        assert!(html.contains("Clear filters and show all articles"));
    }

    #[test]
    fn test_render_post_keeps_markup() {
        let config = SiteConfig::default();
        let renderer = TemplateRenderer::new().unwrap();
        let mut controller = PageController::new();
        controller.select_post("1");
        let view = controller
            .post_view(&posts(), &LinkStyle::query(&config))
            .unwrap();

        let html = renderer.render_post(&config, &view).unwrap();
        assert!(html.contains("<h1>Heading</h1>"));
        assert!(html.contains("<strong>bold</strong> text"));
        assert!(html.contains("&larr; Back"));
    }

    #[test]
    fn test_render_about_falls_back_to_author() {
        let config = SiteConfig::default();
        let renderer = TemplateRenderer::new().unwrap();
        let html = renderer.render_about(&config).unwrap();
        assert!(html.contains("<h1>John Doe</h1>"));
    }

    #[test]
    fn test_truncate_chars_filter() {
        let mut args = HashMap::new();
        args.insert("length".to_string(), tera::Value::from(8));
        let out = truncate_chars_filter(&tera::Value::from("Hello World"), &args).unwrap();
        assert_eq!(out, tera::Value::from("Hello..."));
    }
}
