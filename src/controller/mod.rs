//! Page controller - owns navigation and filter state
//!
//! The controller is the only place that mutates [`FilterCriteria`] or the
//! selected post. It turns that state into view models for the templates.
//! Toggling a facet off happens here; the filter itself stays stateless.

use indexmap::IndexMap;
use serde::Serialize;

use crate::config::SiteConfig;
use crate::content::{find_post, Post};
use crate::filter::{self, FilterCriteria};
use crate::helpers::{facet_slug, query_string, url_for};

/// Which page is on screen
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    Post(String),
}

/// Session-scoped UI state: current page plus filter criteria
#[derive(Debug, Clone, Default)]
pub struct PageController {
    page: Page,
    criteria: FilterCriteria,
}

impl PageController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start on the home page with the given criteria
    pub fn with_criteria(criteria: FilterCriteria) -> Self {
        Self {
            page: Page::Home,
            criteria: criteria.normalized(),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_query(&mut self, query: &str) {
        self.criteria.query = query.to_string();
    }

    /// Select a category, or clear it if it is already selected
    pub fn toggle_category(&mut self, category: &str) {
        self.criteria.category = toggled(self.criteria.category.take(), category);
    }

    /// Select a tag, or clear it if it is already selected
    pub fn toggle_tag(&mut self, tag: &str) {
        self.criteria.tag = toggled(self.criteria.tag.take(), tag);
    }

    /// Reset query, category and tag together
    pub fn clear_filters(&mut self) {
        self.criteria = FilterCriteria::default();
    }

    pub fn select_post(&mut self, id: &str) {
        self.page = Page::Post(id.to_string());
    }

    /// Logo/back action: home page, no selection, no filters
    pub fn back_to_home(&mut self) {
        self.page = Page::Home;
        self.clear_filters();
    }

    /// The selected post, if the post page is showing one that exists
    pub fn current_post<'a>(&self, posts: &'a [Post]) -> Option<&'a Post> {
        match &self.page {
            Page::Post(id) => find_post(posts, id),
            _ => None,
        }
    }

    /// Whether the header shows a back button
    pub fn show_back_button(&self) -> bool {
        !matches!(self.page, Page::Home)
    }

    /// Build the post list view for the current criteria
    pub fn listing(&self, posts: &[Post], links: &LinkStyle) -> ListingView {
        let results = filter::filter(posts, &self.criteria);

        let categories = filter::distinct_categories(posts)
            .into_iter()
            .map(|name| {
                let mut next = self.clone();
                next.toggle_category(&name);
                FacetButton {
                    selected: self.criteria.category.as_deref() == Some(name.as_str()),
                    href: links.listing_href(&next.criteria),
                    name,
                }
            })
            .collect();

        let tags = filter::distinct_tags(posts)
            .into_iter()
            .map(|name| {
                let mut next = self.clone();
                next.toggle_tag(&name);
                FacetButton {
                    selected: self.criteria.tag.as_deref() == Some(name.as_str()),
                    href: links.listing_href(&next.criteria),
                    name,
                }
            })
            .collect();

        let count = results.len();
        ListingView {
            query: self.criteria.query.clone(),
            search_enabled: links.supports_search(),
            search_action: links.root_href(),
            selected_category: self.criteria.category.clone(),
            selected_tag: self.criteria.tag.clone(),
            categories,
            tags,
            count_label: format!(
                "{} {} found",
                count,
                if count == 1 { "article" } else { "articles" }
            ),
            posts: results.into_iter().map(|p| PostCard::new(p, links)).collect(),
            has_active_filters: self.criteria.has_active_filters(),
            clear_href: links.root_href(),
            empty: count == 0,
        }
    }

    /// Build the reader view for the selected post
    pub fn post_view(&self, posts: &[Post], links: &LinkStyle) -> Option<PostView> {
        let post = self.current_post(posts)?;
        Some(PostView {
            id: post.id.clone(),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            category: post.category.clone(),
            category_href: links.listing_href(&FilterCriteria::new().with_category(&post.category)),
            date: post.date.clone(),
            read_time: post.read_time.clone(),
            tags: post
                .tags
                .iter()
                .map(|tag| TagLink {
                    name: tag.clone(),
                    href: links.listing_href(&FilterCriteria::new().with_tag(tag)),
                })
                .collect(),
            content_html: post.content_html(),
            newer: post.prev(posts).map(|p| NavPost::new(p, links)),
            older: post.next(posts).map(|p| NavPost::new(p, links)),
            back_href: links.root_href(),
        })
    }
}

fn toggled(current: Option<String>, value: &str) -> Option<String> {
    match current {
        Some(selected) if selected == value => None,
        _ => Some(value.to_string()),
    }
}

/// How listing links encode filter criteria
#[derive(Debug, Clone)]
pub enum LinkStyle {
    /// Dynamic server: `/?q=..&category=..&tag=..`
    Query { root: String },
    /// Pre-generated pages: `/filter/<category|all>/<tag|all>/`
    Static { root: String, slugs: FacetSlugs },
}

impl LinkStyle {
    pub fn query(config: &SiteConfig) -> Self {
        LinkStyle::Query {
            root: url_for(config, ""),
        }
    }

    pub fn static_pages(config: &SiteConfig, posts: &[Post]) -> Self {
        LinkStyle::Static {
            root: url_for(config, ""),
            slugs: FacetSlugs::new(posts),
        }
    }

    fn root(&self) -> &str {
        match self {
            LinkStyle::Query { root } | LinkStyle::Static { root, .. } => root,
        }
    }

    /// Free-text search needs a server to evaluate the query
    pub fn supports_search(&self) -> bool {
        matches!(self, LinkStyle::Query { .. })
    }

    /// Listing with no criteria
    pub fn root_href(&self) -> String {
        self.root().to_string()
    }

    /// Href of the listing for the given criteria
    pub fn listing_href(&self, criteria: &FilterCriteria) -> String {
        match self {
            LinkStyle::Query { root } => format!(
                "{}{}",
                root,
                query_string(&[
                    ("q", criteria.query.as_str()),
                    ("category", criteria.category.as_deref().unwrap_or("")),
                    ("tag", criteria.tag.as_deref().unwrap_or("")),
                ])
            ),
            LinkStyle::Static { root, slugs } => {
                match slugs.listing_path(criteria.category.as_deref(), criteria.tag.as_deref()) {
                    Some(path) => format!("{}{}", root, path),
                    None => root.clone(),
                }
            }
        }
    }

    /// Href of a post reader page
    pub fn post_href(&self, post: &Post) -> String {
        format!("{}{}", self.root(), post.path())
    }
}

/// Collision-free URL segments for every category and tag
#[derive(Debug, Clone, Default)]
pub struct FacetSlugs {
    categories: IndexMap<String, String>,
    tags: IndexMap<String, String>,
}

/// Segment used for "no selection" in static filter paths
pub const ALL_SEGMENT: &str = "all";

impl FacetSlugs {
    pub fn new(posts: &[Post]) -> Self {
        Self {
            categories: unique_slugs(filter::distinct_categories(posts)),
            tags: unique_slugs(filter::distinct_tags(posts)),
        }
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &str)> {
        self.categories.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn tags(&self) -> impl Iterator<Item = (&str, &str)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Site-relative path of a static listing; `None` for the unfiltered index
    pub fn listing_path(&self, category: Option<&str>, tag: Option<&str>) -> Option<String> {
        if category.is_none() && tag.is_none() {
            return None;
        }
        let category = category
            .and_then(|c| self.categories.get(c))
            .map_or(ALL_SEGMENT, String::as_str);
        let tag = tag
            .and_then(|t| self.tags.get(t))
            .map_or(ALL_SEGMENT, String::as_str);
        Some(format!("filter/{}/{}/", category, tag))
    }
}

fn unique_slugs(names: Vec<String>) -> IndexMap<String, String> {
    let mut taken: Vec<String> = vec![ALL_SEGMENT.to_string()];
    let mut slugs = IndexMap::new();

    for name in names {
        let base = facet_slug(&name);
        let mut slug = base.clone();
        let mut n = 2;
        while taken.contains(&slug) {
            slug = format!("{}-{}", base, n);
            n += 1;
        }
        taken.push(slug.clone());
        slugs.insert(name, slug);
    }

    slugs
}

/// A category or tag button in the filter bar
#[derive(Debug, Clone, Serialize)]
pub struct FacetButton {
    pub name: String,
    pub selected: bool,
    /// Link that applies the toggle for this value
    pub href: String,
}

/// Post summary shown in the listing grid
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub category: String,
    pub tags: Vec<String>,
    pub date: String,
    pub read_time: String,
    pub href: String,
}

impl PostCard {
    fn new(post: &Post, links: &LinkStyle) -> Self {
        Self {
            id: post.id.clone(),
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            category: post.category.clone(),
            tags: post.tags.clone(),
            date: post.date.clone(),
            read_time: post.read_time.clone(),
            href: links.post_href(post),
        }
    }
}

/// Search bar, facet buttons and the filtered post grid
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    pub query: String,
    pub search_enabled: bool,
    pub search_action: String,
    pub selected_category: Option<String>,
    pub selected_tag: Option<String>,
    pub categories: Vec<FacetButton>,
    pub tags: Vec<FacetButton>,
    pub posts: Vec<PostCard>,
    pub count_label: String,
    /// Show the "clear all filters" control
    pub has_active_filters: bool,
    pub clear_href: String,
    /// No post matched; show the "clear filters and show all" affordance
    pub empty: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagLink {
    pub name: String,
    pub href: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub href: String,
}

impl NavPost {
    fn new(post: &Post, links: &LinkStyle) -> Self {
        Self {
            title: post.title.clone(),
            href: links.post_href(post),
        }
    }
}

/// Single post reader
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub category: String,
    pub category_href: String,
    pub date: String,
    pub read_time: String,
    pub tags: Vec<TagLink>,
    pub content_html: String,
    pub newer: Option<NavPost>,
    pub older: Option<NavPost>,
    pub back_href: String,
}
